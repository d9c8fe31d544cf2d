//! Request types for the vim25 methods used by the search index client.
//!
//! Each struct borrows its arguments and implements [`VimMethod`], which ties
//! the request encoding to the type of its decoded `returnval`.

use crate::envelope::{DecodeError, VimMethod, read_reference, write_bool, write_reference, write_text};
use crate::types::{AboutInfo, ManagedObjectReference, ObjectContent, RetrieveResult, ServiceContent, UserSession};
use crate::xml::Element;

/// `RetrieveServiceContent` on the `ServiceInstance` singleton.
#[derive(Debug, Clone)]
pub struct RetrieveServiceContent {
	pub this: ManagedObjectReference,
}

impl Default for RetrieveServiceContent {
	fn default() -> Self {
		Self {
			this: ManagedObjectReference::service_instance(),
		}
	}
}

impl VimMethod for RetrieveServiceContent {
	type Output = ServiceContent;
	const NAME: &'static str = "RetrieveServiceContent";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", &self.this);
	}

	fn decode(returnval: Option<&Element>) -> Result<ServiceContent, DecodeError> {
		let content = returnval.ok_or(DecodeError::MissingField("returnval"))?;
		let reference = |name: &'static str| -> Result<ManagedObjectReference, DecodeError> {
			content.child(name).ok_or(DecodeError::MissingField(name)).and_then(read_reference)
		};
		Ok(ServiceContent {
			root_folder: reference("rootFolder")?,
			property_collector: reference("propertyCollector")?,
			view_manager: reference("viewManager")?,
			session_manager: reference("sessionManager")?,
			search_index: reference("searchIndex")?,
			about: content.child("about").map(|about| AboutInfo {
				full_name: about.child_text("fullName").unwrap_or_default().to_string(),
				api_version: about.child_text("apiVersion").unwrap_or_default().to_string(),
			}),
		})
	}
}

/// `SessionManager.Login`.
#[derive(Debug, Clone)]
pub struct Login<'a> {
	pub this: &'a ManagedObjectReference,
	pub user_name: &'a str,
	pub password: &'a str,
}

impl VimMethod for Login<'_> {
	type Output = UserSession;
	const NAME: &'static str = "Login";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		write_text(out, "userName", self.user_name);
		write_text(out, "password", self.password);
	}

	fn decode(returnval: Option<&Element>) -> Result<UserSession, DecodeError> {
		let session = returnval.ok_or(DecodeError::MissingField("returnval"))?;
		Ok(UserSession {
			key: session.child_text("key").unwrap_or_default().to_string(),
			user_name: session.child_text("userName").unwrap_or_default().to_string(),
			full_name: session.child_text("fullName").unwrap_or_default().to_string(),
		})
	}
}

/// `SessionManager.Logout`.
#[derive(Debug, Clone)]
pub struct Logout<'a> {
	pub this: &'a ManagedObjectReference,
}

impl VimMethod for Logout<'_> {
	type Output = ();
	const NAME: &'static str = "Logout";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
	}

	fn decode(_: Option<&Element>) -> Result<(), DecodeError> {
		Ok(())
	}
}

/// `ViewManager.CreateContainerView`.
#[derive(Debug, Clone)]
pub struct CreateContainerView<'a> {
	pub this: &'a ManagedObjectReference,
	pub container: &'a ManagedObjectReference,
	pub types: &'a [&'a str],
	pub recursive: bool,
}

impl VimMethod for CreateContainerView<'_> {
	type Output = ManagedObjectReference;
	const NAME: &'static str = "CreateContainerView";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		write_reference(out, "container", self.container);
		for kind in self.types {
			write_text(out, "type", kind);
		}
		write_bool(out, "recursive", self.recursive);
	}

	fn decode(returnval: Option<&Element>) -> Result<ManagedObjectReference, DecodeError> {
		returnval.ok_or(DecodeError::MissingField("returnval")).and_then(read_reference)
	}
}

/// `View.DestroyView`.
#[derive(Debug, Clone)]
pub struct DestroyView<'a> {
	pub this: &'a ManagedObjectReference,
}

impl VimMethod for DestroyView<'_> {
	type Output = ();
	const NAME: &'static str = "DestroyView";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
	}

	fn decode(_: Option<&Element>) -> Result<(), DecodeError> {
		Ok(())
	}
}

/// `PropertyCollector.RetrievePropertiesEx` over the contents of a container view.
///
/// Encodes a single filter spec: objects of `object_type` reached through
/// `ContainerView.view`, retrieving the properties in `path_set`.
#[derive(Debug, Clone)]
pub struct RetrievePropertiesEx<'a> {
	pub this: &'a ManagedObjectReference,
	pub view: &'a ManagedObjectReference,
	pub object_type: &'a str,
	pub path_set: &'a [&'a str],
}

impl VimMethod for RetrievePropertiesEx<'_> {
	type Output = RetrieveResult;
	const NAME: &'static str = "RetrievePropertiesEx";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		out.push_str("<specSet><propSet>");
		write_text(out, "type", self.object_type);
		write_bool(out, "all", false);
		for path in self.path_set {
			write_text(out, "pathSet", path);
		}
		out.push_str("</propSet><objectSet>");
		write_reference(out, "obj", self.view);
		write_bool(out, "skip", true);
		out.push_str(r#"<selectSet xsi:type="TraversalSpec">"#);
		write_text(out, "name", "view");
		write_text(out, "type", "ContainerView");
		write_text(out, "path", "view");
		write_bool(out, "skip", false);
		out.push_str("</selectSet></objectSet></specSet><options/>");
	}

	fn decode(returnval: Option<&Element>) -> Result<RetrieveResult, DecodeError> {
		decode_retrieve_result(returnval)
	}
}

/// `PropertyCollector.ContinueRetrievePropertiesEx`.
#[derive(Debug, Clone)]
pub struct ContinueRetrievePropertiesEx<'a> {
	pub this: &'a ManagedObjectReference,
	pub token: &'a str,
}

impl VimMethod for ContinueRetrievePropertiesEx<'_> {
	type Output = RetrieveResult;
	const NAME: &'static str = "ContinueRetrievePropertiesEx";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		write_text(out, "token", self.token);
	}

	fn decode(returnval: Option<&Element>) -> Result<RetrieveResult, DecodeError> {
		decode_retrieve_result(returnval)
	}
}

// An empty result set comes back without a returnval at all.
fn decode_retrieve_result(returnval: Option<&Element>) -> Result<RetrieveResult, DecodeError> {
	let Some(result) = returnval else {
		return Ok(RetrieveResult::default());
	};

	let mut objects = Vec::new();
	for object in result.children_named("objects") {
		let obj = object.child("obj").ok_or(DecodeError::MissingField("obj")).and_then(read_reference)?;
		let props = object
			.children_named("propSet")
			.filter_map(|prop| Some((prop.child_text("name")?.to_string(), prop.child_text("val").unwrap_or_default().to_string())))
			.collect();
		objects.push(ObjectContent { obj, props });
	}

	Ok(RetrieveResult {
		objects,
		token: result.child_text("token").filter(|t| !t.is_empty()).map(str::to_string),
	})
}

/// `SearchIndex.FindByDnsName`.
///
/// `datacenter` scopes the search; `None` searches the whole inventory.
#[derive(Debug, Clone)]
pub struct FindByDnsName<'a> {
	pub this: &'a ManagedObjectReference,
	pub datacenter: Option<&'a ManagedObjectReference>,
	pub dns_name: &'a str,
	pub vm_search: bool,
}

impl VimMethod for FindByDnsName<'_> {
	type Output = Option<ManagedObjectReference>;
	const NAME: &'static str = "FindByDnsName";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		if let Some(datacenter) = self.datacenter {
			write_reference(out, "datacenter", datacenter);
		}
		write_text(out, "dnsName", self.dns_name);
		write_bool(out, "vmSearch", self.vm_search);
	}

	fn decode(returnval: Option<&Element>) -> Result<Self::Output, DecodeError> {
		returnval.map(read_reference).transpose()
	}
}

/// `SearchIndex.FindByInventoryPath`.
#[derive(Debug, Clone)]
pub struct FindByInventoryPath<'a> {
	pub this: &'a ManagedObjectReference,
	pub inventory_path: &'a str,
}

impl VimMethod for FindByInventoryPath<'_> {
	type Output = Option<ManagedObjectReference>;
	const NAME: &'static str = "FindByInventoryPath";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		write_text(out, "inventoryPath", self.inventory_path);
	}

	fn decode(returnval: Option<&Element>) -> Result<Self::Output, DecodeError> {
		returnval.map(read_reference).transpose()
	}
}

/// `SearchIndex.FindByIp`.
#[derive(Debug, Clone)]
pub struct FindByIp<'a> {
	pub this: &'a ManagedObjectReference,
	pub datacenter: Option<&'a ManagedObjectReference>,
	pub ip: &'a str,
	pub vm_search: bool,
}

impl VimMethod for FindByIp<'_> {
	type Output = Option<ManagedObjectReference>;
	const NAME: &'static str = "FindByIp";

	fn write_params(&self, out: &mut String) {
		write_reference(out, "_this", self.this);
		if let Some(datacenter) = self.datacenter {
			write_reference(out, "datacenter", datacenter);
		}
		write_text(out, "ip", self.ip);
		write_bool(out, "vmSearch", self.vm_search);
	}

	fn decode(returnval: Option<&Element>) -> Result<Self::Output, DecodeError> {
		returnval.map(read_reference).transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::envelope::{decode_response, envelope};

	fn search_index() -> ManagedObjectReference {
		ManagedObjectReference::new("SearchIndex", "SearchIndex")
	}

	fn wrap(body: &str) -> String {
		format!(r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#)
	}

	#[test]
	fn find_by_dns_name_with_datacenter() {
		let this = search_index();
		let dc = ManagedObjectReference::new("Datacenter", "datacenter-2");
		let request = envelope(&FindByDnsName {
			this: &this,
			datacenter: Some(&dc),
			dns_name: "web01.example.com",
			vm_search: true,
		});
		assert!(request.contains(r#"<FindByDnsName xmlns="urn:vim25">"#));
		assert!(request.contains(
			r#"<_this type="SearchIndex">SearchIndex</_this><datacenter type="Datacenter">datacenter-2</datacenter><dnsName>web01.example.com</dnsName><vmSearch>true</vmSearch>"#
		));
	}

	#[test]
	fn find_by_dns_name_without_datacenter_omits_element() {
		let this = search_index();
		let request = envelope(&FindByDnsName {
			this: &this,
			datacenter: None,
			dns_name: "esx01.example.com",
			vm_search: false,
		});
		assert!(!request.contains("<datacenter"));
		assert!(request.contains("<vmSearch>false</vmSearch>"));
	}

	#[test]
	fn inventory_path_is_escaped() {
		let this = search_index();
		let request = envelope(&FindByInventoryPath {
			this: &this,
			inventory_path: "DC1/vm/R&D <test>",
		});
		assert!(request.contains("<inventoryPath>DC1/vm/R&amp;D &lt;test&gt;</inventoryPath>"));
	}

	#[test]
	fn find_returns_reference_when_present() {
		let response = wrap(r#"<FindByIpResponse xmlns="urn:vim25"><returnval type="VirtualMachine">vm-42</returnval></FindByIpResponse>"#);
		let found = decode_response::<FindByIp>(&response).unwrap();
		assert_eq!(found, Some(ManagedObjectReference::new("VirtualMachine", "vm-42")));
	}

	#[test]
	fn find_returns_none_for_empty_response() {
		let response = wrap(r#"<FindByInventoryPathResponse xmlns="urn:vim25"/>"#);
		assert_eq!(decode_response::<FindByInventoryPath>(&response).unwrap(), None);
	}

	#[test]
	fn find_surfaces_fault() {
		let response = wrap(
			r#"<soapenv:Fault><faultcode>ServerFaultCode</faultcode><faultstring>A specified parameter was not correct: ip</faultstring><detail><InvalidArgumentFault xmlns="urn:vim25" xsi:type="InvalidArgument"><invalidProperty>ip</invalidProperty></InvalidArgumentFault></detail></soapenv:Fault>"#,
		);
		match decode_response::<FindByIp>(&response) {
			Err(DecodeError::Fault(fault)) => {
				assert_eq!(fault.kind(), "InvalidArgumentFault");
				assert_eq!(fault.message, "A specified parameter was not correct: ip");
			}
			other => panic!("expected fault, got {other:?}"),
		}
	}

	#[test]
	fn service_content_decodes_references() {
		let response = wrap(
			r#"<RetrieveServiceContentResponse xmlns="urn:vim25"><returnval><rootFolder type="Folder">group-d1</rootFolder><propertyCollector type="PropertyCollector">propertyCollector</propertyCollector><viewManager type="ViewManager">ViewManager</viewManager><about><fullName>VMware vCenter Server 7.0.3</fullName><apiVersion>7.0.3.0</apiVersion></about><sessionManager type="SessionManager">SessionManager</sessionManager><searchIndex type="SearchIndex">SearchIndex</searchIndex></returnval></RetrieveServiceContentResponse>"#,
		);
		let content = decode_response::<RetrieveServiceContent>(&response).unwrap();
		assert_eq!(content.root_folder, ManagedObjectReference::new("Folder", "group-d1"));
		assert_eq!(content.search_index.value, "SearchIndex");
		assert_eq!(content.about.unwrap().api_version, "7.0.3.0");
	}

	#[test]
	fn service_content_requires_search_index() {
		let response = wrap(
			r#"<RetrieveServiceContentResponse xmlns="urn:vim25"><returnval><rootFolder type="Folder">group-d1</rootFolder><propertyCollector type="PropertyCollector">propertyCollector</propertyCollector><viewManager type="ViewManager">ViewManager</viewManager><sessionManager type="SessionManager">SessionManager</sessionManager></returnval></RetrieveServiceContentResponse>"#,
		);
		let err = decode_response::<RetrieveServiceContent>(&response).unwrap_err();
		assert!(matches!(err, DecodeError::MissingField("searchIndex")));
	}

	#[test]
	fn retrieve_properties_request_traverses_view() {
		let pc = ManagedObjectReference::new("PropertyCollector", "propertyCollector");
		let view = ManagedObjectReference::new("ContainerView", "session[52]view-1");
		let request = envelope(&RetrievePropertiesEx {
			this: &pc,
			view: &view,
			object_type: "Datacenter",
			path_set: &["name"],
		});
		assert!(request.contains("<propSet><type>Datacenter</type><all>false</all><pathSet>name</pathSet></propSet>"));
		assert!(request.contains(r#"<obj type="ContainerView">session[52]view-1</obj><skip>true</skip>"#));
		assert!(request.contains(r#"<selectSet xsi:type="TraversalSpec"><name>view</name><type>ContainerView</type><path>view</path>"#));
	}

	#[test]
	fn retrieve_properties_decodes_objects_and_token() {
		let response = wrap(
			r#"<RetrievePropertiesExResponse xmlns="urn:vim25"><returnval><token>1</token><objects><obj type="Datacenter">datacenter-2</obj><propSet><name>name</name><val xsi:type="xsd:string">DC1</val></propSet></objects><objects><obj type="Datacenter">datacenter-7</obj><propSet><name>name</name><val xsi:type="xsd:string">DC2</val></propSet></objects></returnval></RetrievePropertiesExResponse>"#,
		);
		let result = decode_response::<RetrievePropertiesEx>(&response).unwrap();
		assert_eq!(result.token.as_deref(), Some("1"));
		assert_eq!(result.objects.len(), 2);
		assert_eq!(result.objects[1].obj.value, "datacenter-7");
		assert_eq!(result.objects[1].prop("name"), Some("DC2"));
	}

	#[test]
	fn retrieve_properties_empty_result() {
		let response = wrap(r#"<ContinueRetrievePropertiesExResponse xmlns="urn:vim25"/>"#);
		let result = decode_response::<ContinueRetrievePropertiesEx>(&response).unwrap();
		assert!(result.objects.is_empty());
		assert_eq!(result.token, None);
	}

	#[test]
	fn create_container_view_lists_types() {
		let vm = ManagedObjectReference::new("ViewManager", "ViewManager");
		let root = ManagedObjectReference::new("Folder", "group-d1");
		let request = envelope(&CreateContainerView {
			this: &vm,
			container: &root,
			types: &["Datacenter"],
			recursive: true,
		});
		assert!(request.contains(r#"<container type="Folder">group-d1</container><type>Datacenter</type><recursive>true</recursive>"#));
	}

	#[test]
	fn login_decodes_user_session() {
		let response = wrap(
			r#"<LoginResponse xmlns="urn:vim25"><returnval><key>52a1</key><userName>VSPHERE.LOCAL\admin</userName><fullName>Administrator</fullName></returnval></LoginResponse>"#,
		);
		let session = decode_response::<Login>(&response).unwrap();
		assert_eq!(session.key, "52a1");
		assert_eq!(session.user_name, "VSPHERE.LOCAL\\admin");
	}
}

//! Core vim25 data types shared by requests and responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Managed object id of the service instance singleton.
pub const SERVICE_INSTANCE: &str = "ServiceInstance";

/// Default vim25 API version announced in the SOAPAction header.
pub const DEFAULT_API_VERSION: &str = "6.0";

/// Opaque handle the server uses to identify an inventory entity.
///
/// On the wire a reference is an element whose `type` attribute carries the
/// managed object type and whose text carries the id:
///
/// ```xml
/// <returnval type="VirtualMachine">vm-42</returnval>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectReference {
	#[serde(rename = "type")]
	pub kind: String,
	pub value: String,
}

impl ManagedObjectReference {
	pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			value: value.into(),
		}
	}

	/// Reference to the `ServiceInstance` root object.
	pub fn service_instance() -> Self {
		Self::new("ServiceInstance", SERVICE_INSTANCE)
	}
}

impl fmt::Display for ManagedObjectReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.value)
	}
}

/// Product information reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
	pub full_name: String,
	pub api_version: String,
}

/// The subset of `ServiceContent` needed to log in and resolve names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContent {
	pub root_folder: ManagedObjectReference,
	pub property_collector: ManagedObjectReference,
	pub view_manager: ManagedObjectReference,
	pub session_manager: ManagedObjectReference,
	pub search_index: ManagedObjectReference,
	pub about: Option<AboutInfo>,
}

/// Session returned by `Login`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
	pub key: String,
	pub user_name: String,
	pub full_name: String,
}

/// One object returned by a property retrieval, with its simple-valued properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContent {
	pub obj: ManagedObjectReference,
	pub props: Vec<(String, String)>,
}

impl ObjectContent {
	/// Returns the value of property `name`, if it was retrieved.
	pub fn prop(&self, name: &str) -> Option<&str> {
		self.props.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}

/// A page of `RetrievePropertiesEx` results.
///
/// When `token` is set more objects remain and must be fetched with
/// `ContinueRetrievePropertiesEx`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveResult {
	pub objects: Vec<ObjectContent>,
	pub token: Option<String>,
}

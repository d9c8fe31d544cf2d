//! Resolves the datacenter, then runs each requested search index lookup.
//!
//! Lookups run one after another in a fixed order: datacenter, VM by DNS
//! name, VM by inventory path, VM by IP, host by DNS name. Only the
//! datacenter step can stop the run; a failed lookup after it is recorded
//! and the next one still runs.

use std::future::Future;

use searchidx::{Error, ManagedObjectReference, SessionFacade};
use serde::Serialize;
use tracing::{info, warn};

/// Inventory type enumerated to resolve the datacenter name.
pub const DATACENTER_TYPE: &str = "Datacenter";

/// What the user asked to look up. Optional fields that are `None` are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
	pub dc_name: String,
	pub vm_dns_name: Option<String>,
	pub vm_path: Option<String>,
	pub vm_ip: Option<String>,
	pub host_dns_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupTarget {
	Datacenter,
	VmByDnsName,
	VmByInventoryPath,
	VmByIp,
	HostByDnsName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LookupOutcome {
	Found { reference: ManagedObjectReference },
	NotFound,
	/// The server returned a SOAP fault.
	Fault { kind: String, message: String },
	/// Transport, HTTP or decoding failure.
	Failed {
		message: String,
		#[serde(skip_serializing_if = "std::ops::Not::not")]
		timed_out: bool,
	},
}

impl From<Result<Option<ManagedObjectReference>, Error>> for LookupOutcome {
	fn from(result: Result<Option<ManagedObjectReference>, Error>) -> Self {
		match result {
			Ok(Some(reference)) => LookupOutcome::Found { reference },
			Ok(None) => LookupOutcome::NotFound,
			Err(Error::Fault { kind, message }) => LookupOutcome::Fault { kind, message },
			Err(err) => LookupOutcome::Failed {
				timed_out: matches!(&err, Error::Transport(e) if e.is_timeout()),
				message: err.to_string(),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
	pub target: LookupTarget,
	pub query: String,
	#[serde(flatten)]
	pub outcome: LookupOutcome,
}

impl LookupResult {
	/// Bare reference value (e.g. `vm-42`) when found.
	pub fn reference_value(&self) -> Option<&str> {
		match &self.outcome {
			LookupOutcome::Found { reference } => Some(&reference.value),
			_ => None,
		}
	}

	pub fn is_found(&self) -> bool {
		matches!(self.outcome, LookupOutcome::Found { .. })
	}

	/// Fault or failure text when the call itself went wrong, as opposed
	/// to completing without a match.
	pub fn error_message(&self) -> Option<String> {
		match &self.outcome {
			LookupOutcome::Fault { kind, message } => Some(format!("{kind}: {message}")),
			LookupOutcome::Failed { message, .. } => Some(message.clone()),
			_ => None,
		}
	}
}

/// Runs a [`LookupRequest`] against an authenticated session.
pub struct LookupRunner<'a, S: SessionFacade + ?Sized> {
	session: &'a S,
}

impl<'a, S: SessionFacade + ?Sized> LookupRunner<'a, S> {
	pub fn new(session: &'a S) -> Self {
		Self { session }
	}

	/// Returns one result per attempted lookup, in execution order.
	///
	/// When the datacenter does not resolve the list holds only its result;
	/// a fault or failure there is fatal to the whole run.
	pub async fn run(&self, request: &LookupRequest) -> Vec<LookupResult> {
		let session = self.session;
		let dc_result = self.resolve_datacenter(&request.dc_name).await;
		let datacenter = match &dc_result.outcome {
			LookupOutcome::Found { reference } => reference.clone(),
			_ => return vec![dc_result],
		};

		let mut results = vec![dc_result];

		if let Some(name) = &request.vm_dns_name {
			results.push(lookup(LookupTarget::VmByDnsName, name, session.find_by_dns_name(Some(&datacenter), name, true)).await);
		}
		if let Some(path) = &request.vm_path {
			results.push(lookup(LookupTarget::VmByInventoryPath, path, session.find_by_inventory_path(path)).await);
		}
		if let Some(ip) = &request.vm_ip {
			results.push(lookup(LookupTarget::VmByIp, ip, session.find_by_ip(Some(&datacenter), ip, true)).await);
		}
		if let Some(name) = &request.host_dns_name {
			results.push(lookup(LookupTarget::HostByDnsName, name, session.find_by_dns_name(None, name, false)).await);
		}

		results
	}

	async fn resolve_datacenter(&self, dc_name: &str) -> LookupResult {
		let root = self.session.root_folder();
		let found = self
			.session
			.enumerate_by_type(root, DATACENTER_TYPE)
			.await
			.map(|mut datacenters| datacenters.remove(dc_name));
		lookup_result(LookupTarget::Datacenter, dc_name, found.into())
	}
}

async fn lookup<F>(target: LookupTarget, query: &str, call: F) -> LookupResult
where
	F: Future<Output = Result<Option<ManagedObjectReference>, Error>>,
{
	lookup_result(target, query, call.await.into())
}

fn lookup_result(target: LookupTarget, query: &str, outcome: LookupOutcome) -> LookupResult {
	match &outcome {
		LookupOutcome::Found { reference } => info!(target: "searchidx", lookup = ?target, query, reference = %reference, "found"),
		LookupOutcome::NotFound => info!(target: "searchidx", lookup = ?target, query, "not found"),
		LookupOutcome::Fault { kind, message } => warn!(target: "searchidx", lookup = ?target, query, kind, message, "lookup fault"),
		LookupOutcome::Failed { message, .. } => warn!(target: "searchidx", lookup = ?target, query, message, "lookup failed"),
	}
	LookupResult {
		target,
		query: query.to_string(),
		outcome,
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::sync::Mutex;

	use async_trait::async_trait;

	use super::*;

	fn mor(kind: &str, value: &str) -> ManagedObjectReference {
		ManagedObjectReference::new(kind, value)
	}

	/// In-memory session recording every call it receives.
	struct FakeSession {
		root: ManagedObjectReference,
		index: ManagedObjectReference,
		datacenters: Result<HashMap<String, ManagedObjectReference>, Error>,
		by_dns: HashMap<(String, bool), ManagedObjectReference>,
		by_path: HashMap<String, ManagedObjectReference>,
		by_ip: HashMap<String, ManagedObjectReference>,
		faults: HashMap<&'static str, (String, String)>,
		calls: Mutex<Vec<String>>,
	}

	impl FakeSession {
		fn new() -> Self {
			Self {
				root: mor("Folder", "group-d1"),
				index: mor("SearchIndex", "SearchIndex"),
				datacenters: Ok(HashMap::new()),
				by_dns: HashMap::new(),
				by_path: HashMap::new(),
				by_ip: HashMap::new(),
				faults: HashMap::new(),
				calls: Mutex::new(Vec::new()),
			}
		}

		fn datacenter(mut self, name: &str, value: &str) -> Self {
			if let Ok(map) = &mut self.datacenters {
				map.insert(name.to_string(), mor("Datacenter", value));
			}
			self
		}

		fn vm_ip(mut self, ip: &str, value: &str) -> Self {
			self.by_ip.insert(ip.to_string(), mor("VirtualMachine", value));
			self
		}

		fn vm_path(mut self, path: &str, value: &str) -> Self {
			self.by_path.insert(path.to_string(), mor("VirtualMachine", value));
			self
		}

		fn host_dns(mut self, name: &str, value: &str) -> Self {
			self.by_dns.insert((name.to_string(), false), mor("HostSystem", value));
			self
		}

		fn fault(mut self, method: &'static str, kind: &str, message: &str) -> Self {
			self.faults.insert(method, (kind.to_string(), message.to_string()));
			self
		}

		fn record(&self, call: String) {
			self.calls.lock().unwrap().push(call);
		}

		fn calls(&self) -> Vec<String> {
			self.calls.lock().unwrap().clone()
		}

		fn check_fault(&self, method: &'static str) -> Result<(), Error> {
			match self.faults.get(method) {
				Some((kind, message)) => Err(Error::Fault {
					kind: kind.clone(),
					message: message.clone(),
				}),
				None => Ok(()),
			}
		}
	}

	#[async_trait]
	impl SessionFacade for FakeSession {
		fn root_folder(&self) -> &ManagedObjectReference {
			&self.root
		}

		fn search_index(&self) -> &ManagedObjectReference {
			&self.index
		}

		async fn enumerate_by_type(&self, container: &ManagedObjectReference, type_name: &str) -> Result<HashMap<String, ManagedObjectReference>, Error> {
			self.record(format!("enumerate {} {type_name}", container.value));
			match &self.datacenters {
				Ok(map) => Ok(map.clone()),
				Err(err) => Err(Error::Decode {
					method: "RetrievePropertiesEx",
					message: err.to_string(),
				}),
			}
		}

		async fn find_by_dns_name(&self, datacenter: Option<&ManagedObjectReference>, dns_name: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>, Error> {
			let scope = datacenter.map_or("-", |dc| dc.value.as_str());
			self.record(format!("dns {scope} {dns_name} {vm_search}"));
			self.check_fault("FindByDnsName")?;
			Ok(self.by_dns.get(&(dns_name.to_string(), vm_search)).cloned())
		}

		async fn find_by_inventory_path(&self, inventory_path: &str) -> Result<Option<ManagedObjectReference>, Error> {
			self.record(format!("path {inventory_path}"));
			self.check_fault("FindByInventoryPath")?;
			Ok(self.by_path.get(inventory_path).cloned())
		}

		async fn find_by_ip(&self, datacenter: Option<&ManagedObjectReference>, ip: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>, Error> {
			let scope = datacenter.map_or("-", |dc| dc.value.as_str());
			self.record(format!("ip {scope} {ip} {vm_search}"));
			self.check_fault("FindByIp")?;
			Ok(self.by_ip.get(ip).cloned())
		}
	}

	fn request(dc_name: &str) -> LookupRequest {
		LookupRequest {
			dc_name: dc_name.to_string(),
			..LookupRequest::default()
		}
	}

	#[tokio::test]
	async fn resolves_datacenter_then_vm_by_ip() {
		let session = FakeSession::new().datacenter("DC1", "datacenter-2").vm_ip("10.0.0.5", "vm-42");
		let request = LookupRequest {
			vm_ip: Some("10.0.0.5".to_string()),
			..request("DC1")
		};

		let results = LookupRunner::new(&session).run(&request).await;

		assert_eq!(results.len(), 2);
		assert_eq!(results[0].target, LookupTarget::Datacenter);
		assert_eq!(results[0].reference_value(), Some("datacenter-2"));
		assert_eq!(results[1].target, LookupTarget::VmByIp);
		assert_eq!(results[1].reference_value(), Some("vm-42"));
		assert_eq!(session.calls(), ["enumerate group-d1 Datacenter", "ip datacenter-2 10.0.0.5 true"]);
	}

	#[tokio::test]
	async fn unknown_datacenter_stops_before_any_find() {
		let session = FakeSession::new().datacenter("DC1", "datacenter-2");
		let request = LookupRequest {
			vm_dns_name: Some("web01".to_string()),
			vm_path: Some("DC1/vm/web01".to_string()),
			vm_ip: Some("10.0.0.5".to_string()),
			host_dns_name: Some("esx01".to_string()),
			..request("Missing")
		};

		let results = LookupRunner::new(&session).run(&request).await;

		assert_eq!(results.len(), 1);
		assert_eq!(results[0].outcome, LookupOutcome::NotFound);
		assert_eq!(results[0].query, "Missing");
		assert_eq!(session.calls(), ["enumerate group-d1 Datacenter"]);
	}

	#[tokio::test]
	async fn enumeration_failure_aborts_the_run() {
		let mut session = FakeSession::new();
		session.datacenters = Err(Error::InvalidConfig("boom".to_string()));
		let request = LookupRequest {
			vm_ip: Some("10.0.0.5".to_string()),
			..request("DC1")
		};

		let results = LookupRunner::new(&session).run(&request).await;

		assert_eq!(results.len(), 1);
		assert!(matches!(results[0].outcome, LookupOutcome::Failed { timed_out: false, .. }));
		assert!(results[0].error_message().is_some_and(|m| m.contains("boom")));
		assert_eq!(session.calls().len(), 1);
	}

	#[tokio::test]
	async fn lookups_run_in_fixed_order_with_expected_scopes() {
		let session = FakeSession::new().datacenter("DC1", "datacenter-2");
		let request = LookupRequest {
			dc_name: "DC1".to_string(),
			host_dns_name: Some("esx01".to_string()),
			vm_ip: Some("10.0.0.5".to_string()),
			vm_path: Some("DC1/vm/web01".to_string()),
			vm_dns_name: Some("web01".to_string()),
		};

		let results = LookupRunner::new(&session).run(&request).await;

		let targets: Vec<_> = results.iter().map(|r| r.target).collect();
		assert_eq!(
			targets,
			[
				LookupTarget::Datacenter,
				LookupTarget::VmByDnsName,
				LookupTarget::VmByInventoryPath,
				LookupTarget::VmByIp,
				LookupTarget::HostByDnsName
			]
		);
		assert_eq!(
			session.calls(),
			[
				"enumerate group-d1 Datacenter",
				"dns datacenter-2 web01 true",
				"path DC1/vm/web01",
				"ip datacenter-2 10.0.0.5 true",
				"dns - esx01 false",
			]
		);
		assert!(results[1..].iter().all(|r| r.outcome == LookupOutcome::NotFound));
	}

	#[tokio::test]
	async fn fault_does_not_stop_later_lookups() {
		let session = FakeSession::new()
			.datacenter("DC1", "datacenter-2")
			.fault("FindByInventoryPath", "InvalidArgumentFault", "A specified parameter was not correct: inventoryPath")
			.host_dns("esx01", "host-11");
		let request = LookupRequest {
			vm_path: Some("//bad".to_string()),
			host_dns_name: Some("esx01".to_string()),
			..request("DC1")
		};

		let results = LookupRunner::new(&session).run(&request).await;

		assert_eq!(results.len(), 3);
		assert_eq!(
			results[1].outcome,
			LookupOutcome::Fault {
				kind: "InvalidArgumentFault".to_string(),
				message: "A specified parameter was not correct: inventoryPath".to_string(),
			}
		);
		assert_eq!(results[1].reference_value(), None);
		assert_eq!(results[2].reference_value(), Some("host-11"));
	}

	#[tokio::test]
	async fn only_requested_lookups_run() {
		let session = FakeSession::new().datacenter("DC1", "datacenter-2").vm_path("DC1/vm/web01", "vm-17");
		let request = LookupRequest {
			vm_path: Some("DC1/vm/web01".to_string()),
			..request("DC1")
		};

		let results = LookupRunner::new(&session).run(&request).await;

		assert_eq!(results.len(), 2);
		assert!(results.iter().all(LookupResult::is_found));
		assert_eq!(session.calls(), ["enumerate group-d1 Datacenter", "path DC1/vm/web01"]);
	}

	#[test]
	fn result_serializes_with_status_tag() {
		let result = LookupResult {
			target: LookupTarget::VmByIp,
			query: "10.0.0.5".to_string(),
			outcome: LookupOutcome::Found {
				reference: mor("VirtualMachine", "vm-42"),
			},
		};
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"target": "vmByIp",
				"query": "10.0.0.5",
				"status": "found",
				"reference": { "type": "VirtualMachine", "value": "vm-42" },
			})
		);
	}
}

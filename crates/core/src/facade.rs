//! The operations a lookup needs from an authenticated session.

use std::collections::HashMap;

use async_trait::async_trait;
use searchidx_protocol::ManagedObjectReference;

use crate::error::Result;

/// An authenticated view of the inventory and its search index.
///
/// Implemented by [`VimSession`](crate::VimSession) for real endpoints;
/// tests substitute in-memory fakes. All `find_*` calls return `Ok(None)`
/// when the server reports no match.
#[async_trait]
pub trait SessionFacade: Send + Sync {
	/// The inventory root folder.
	fn root_folder(&self) -> &ManagedObjectReference;

	/// The search index the `find_*` calls are issued against.
	fn search_index(&self) -> &ManagedObjectReference;

	/// Lists every entity of `type_name` below `container`, keyed by name.
	async fn enumerate_by_type(&self, container: &ManagedObjectReference, type_name: &str) -> Result<HashMap<String, ManagedObjectReference>>;

	/// Finds a virtual machine (`vm_search`) or host by DNS name.
	async fn find_by_dns_name(&self, datacenter: Option<&ManagedObjectReference>, dns_name: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>>;

	/// Finds an entity by its slash-delimited inventory path.
	async fn find_by_inventory_path(&self, inventory_path: &str) -> Result<Option<ManagedObjectReference>>;

	/// Finds a virtual machine (`vm_search`) or host by IP address.
	async fn find_by_ip(&self, datacenter: Option<&ManagedObjectReference>, ip: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>>;
}

//! Authenticated vim25 session.

use std::collections::HashMap;

use async_trait::async_trait;
use searchidx_protocol::{
	ContinueRetrievePropertiesEx, CreateContainerView, DestroyView, FindByDnsName, FindByInventoryPath, FindByIp, Login, Logout, ManagedObjectReference,
	RetrievePropertiesEx, RetrieveServiceContent, ServiceContent, UserSession,
};
use tracing::{debug, info, warn};

use crate::client::SoapClient;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::facade::SessionFacade;

const NAME_PROPERTY: &str = "name";

/// A logged-in session against one vCenter or ESXi endpoint.
///
/// Created with [`VimSession::connect`]; release it with
/// [`VimSession::disconnect`] so the server-side session is not left to expire.
#[derive(Debug)]
pub struct VimSession {
	client: SoapClient,
	content: ServiceContent,
	user: UserSession,
}

impl VimSession {
	/// Retrieves the service content and logs in with the configured credentials.
	pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
		let client = SoapClient::new(config)?;
		debug!(target: "searchidx", url = %client.url(), "retrieving service content");
		let content = client.call(&RetrieveServiceContent::default()).await?;
		if let Some(about) = &content.about {
			info!(target: "searchidx", server = %about.full_name, api_version = %about.api_version, "connected");
		}

		let user = client
			.call(&Login {
				this: &content.session_manager,
				user_name: &config.username,
				password: &config.password,
			})
			.await?;
		info!(target: "searchidx", user = %user.user_name, "logged in");

		Ok(Self { client, content, user })
	}

	pub fn user(&self) -> &UserSession {
		&self.user
	}

	/// Logs out. Failures are logged, not returned.
	pub async fn disconnect(self) {
		match self.client.call(&Logout { this: &self.content.session_manager }).await {
			Ok(()) => info!(target: "searchidx", user = %self.user.user_name, "logged out"),
			Err(err) => warn!(target: "searchidx", error = %err, "logout failed"),
		}
	}

	async fn collect_names(&self, view: &ManagedObjectReference, type_name: &str) -> Result<HashMap<String, ManagedObjectReference>> {
		let collector = &self.content.property_collector;
		let mut page = self
			.client
			.call(&RetrievePropertiesEx {
				this: collector,
				view,
				object_type: type_name,
				path_set: &[NAME_PROPERTY],
			})
			.await?;

		let mut entities = HashMap::new();
		loop {
			for object in page.objects {
				if let Some(name) = object.prop(NAME_PROPERTY) {
					entities.insert(name.to_string(), object.obj);
				}
			}
			let Some(token) = page.token else {
				break;
			};
			page = self.client.call(&ContinueRetrievePropertiesEx { this: collector, token: &token }).await?;
		}

		Ok(entities)
	}
}

#[async_trait]
impl SessionFacade for VimSession {
	fn root_folder(&self) -> &ManagedObjectReference {
		&self.content.root_folder
	}

	fn search_index(&self) -> &ManagedObjectReference {
		&self.content.search_index
	}

	async fn enumerate_by_type(&self, container: &ManagedObjectReference, type_name: &str) -> Result<HashMap<String, ManagedObjectReference>> {
		let view = self
			.client
			.call(&CreateContainerView {
				this: &self.content.view_manager,
				container,
				types: &[type_name],
				recursive: true,
			})
			.await?;

		let entities = self.collect_names(&view, type_name).await;

		if let Err(err) = self.client.call(&DestroyView { this: &view }).await {
			warn!(target: "searchidx", view = %view, error = %err, "failed to destroy container view");
		}

		let entities = entities?;
		debug!(target: "searchidx", type_name, count = entities.len(), "enumerated entities");
		Ok(entities)
	}

	async fn find_by_dns_name(&self, datacenter: Option<&ManagedObjectReference>, dns_name: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>> {
		self.client
			.call(&FindByDnsName {
				this: &self.content.search_index,
				datacenter,
				dns_name,
				vm_search,
			})
			.await
	}

	async fn find_by_inventory_path(&self, inventory_path: &str) -> Result<Option<ManagedObjectReference>> {
		self.client
			.call(&FindByInventoryPath {
				this: &self.content.search_index,
				inventory_path,
			})
			.await
	}

	async fn find_by_ip(&self, datacenter: Option<&ManagedObjectReference>, ip: &str, vm_search: bool) -> Result<Option<ManagedObjectReference>> {
		self.client
			.call(&FindByIp {
				this: &self.content.search_index,
				datacenter,
				ip,
				vm_search,
			})
			.await
	}
}

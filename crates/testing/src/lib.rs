//! In-process fake vim25 endpoint for integration tests.
//!
//! Serves the handful of SOAP methods the search index client uses from an
//! in-memory [`Inventory`] and records every call it receives, so tests can
//! assert on call order and arguments without a real vCenter.
//!
//! # Example
//!
//! ```ignore
//! let server = FakeVimServer::start(Inventory::new().with_datacenter("DC1", "datacenter-2")).await?;
//! let config = ConnectionConfig::new(&server.url(), "admin", "secret")?;
//! let session = VimSession::connect(&config).await?;
//! assert_eq!(server.methods(), ["RetrieveServiceContent", "Login"]);
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use searchidx_protocol::xml::{self, Element, escape};
use tokio::task::JoinHandle;
use tracing::debug;

/// Credentials accepted unless overridden with [`Inventory::with_credentials`].
pub const DEFAULT_USER: &str = "administrator@vsphere.local";
pub const DEFAULT_PASSWORD: &str = "secret";

const SESSION_COOKIE: &str = "vmware_soap_session";

/// Entities and failure injections served by the fake endpoint.
#[derive(Debug, Clone)]
pub struct Inventory {
	datacenters: Vec<(String, String)>,
	vms_by_dns: HashMap<String, String>,
	vms_by_ip: HashMap<String, String>,
	vms_by_path: HashMap<String, String>,
	hosts_by_dns: HashMap<String, String>,
	faults: HashMap<String, (String, String)>,
	http_errors: HashMap<String, u16>,
	page_size: usize,
	credentials: (String, String),
}

impl Default for Inventory {
	fn default() -> Self {
		Self {
			datacenters: Vec::new(),
			vms_by_dns: HashMap::new(),
			vms_by_ip: HashMap::new(),
			vms_by_path: HashMap::new(),
			hosts_by_dns: HashMap::new(),
			faults: HashMap::new(),
			http_errors: HashMap::new(),
			page_size: 100,
			credentials: (DEFAULT_USER.to_string(), DEFAULT_PASSWORD.to_string()),
		}
	}
}

impl Inventory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_datacenter(mut self, name: &str, id: &str) -> Self {
		self.datacenters.push((name.to_string(), id.to_string()));
		self
	}

	pub fn with_vm_dns_name(mut self, dns_name: &str, id: &str) -> Self {
		self.vms_by_dns.insert(dns_name.to_string(), id.to_string());
		self
	}

	pub fn with_vm_ip(mut self, ip: &str, id: &str) -> Self {
		self.vms_by_ip.insert(ip.to_string(), id.to_string());
		self
	}

	pub fn with_vm_path(mut self, path: &str, id: &str) -> Self {
		self.vms_by_path.insert(path.to_string(), id.to_string());
		self
	}

	pub fn with_host_dns_name(mut self, dns_name: &str, id: &str) -> Self {
		self.hosts_by_dns.insert(dns_name.to_string(), id.to_string());
		self
	}

	/// Answers every call to `method` with a SOAP fault whose detail element is `kind`.
	pub fn with_fault(mut self, method: &str, kind: &str, message: &str) -> Self {
		self.faults.insert(method.to_string(), (kind.to_string(), message.to_string()));
		self
	}

	/// Answers every call to `method` with a bare HTTP error status.
	pub fn with_http_error(mut self, method: &str, status: u16) -> Self {
		self.http_errors.insert(method.to_string(), status);
		self
	}

	/// Number of objects per `RetrievePropertiesEx` page.
	pub fn with_page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size.max(1);
		self
	}

	pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
		self.credentials = (user.to_string(), password.to_string());
		self
	}
}

/// One request received by the fake endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
	pub method: String,
	/// Direct child elements of the method element as `(name, text)`.
	pub params: Vec<(String, String)>,
	pub soap_action: Option<String>,
	pub had_session_cookie: bool,
}

impl RecordedCall {
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
	}
}

#[derive(Debug)]
struct ServerState {
	inventory: Inventory,
	calls: Vec<RecordedCall>,
}

type Shared = Arc<Mutex<ServerState>>;

/// Running fake endpoint; stops when dropped.
pub struct FakeVimServer {
	addr: SocketAddr,
	state: Shared,
	task: JoinHandle<()>,
}

impl FakeVimServer {
	/// Binds an ephemeral localhost port and starts serving.
	pub async fn start(inventory: Inventory) -> std::io::Result<Self> {
		let state = Arc::new(Mutex::new(ServerState {
			inventory,
			calls: Vec::new(),
		}));
		let app = Router::new().route("/sdk", post(handle)).with_state(Arc::clone(&state));

		let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
		let addr = listener.local_addr()?;
		let task = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self { addr, state, task })
	}

	/// SDK endpoint url, e.g. `http://127.0.0.1:41234/sdk`.
	pub fn url(&self) -> String {
		format!("http://{}/sdk", self.addr)
	}

	/// Every call received so far, in order.
	pub fn calls(&self) -> Vec<RecordedCall> {
		lock(&self.state).calls.clone()
	}

	/// Method names received so far, in order.
	pub fn methods(&self) -> Vec<String> {
		lock(&self.state).calls.iter().map(|c| c.method.clone()).collect()
	}
}

impl Drop for FakeVimServer {
	fn drop(&mut self) {
		self.task.abort();
	}
}

fn lock(state: &Shared) -> MutexGuard<'_, ServerState> {
	state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn handle(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
	let request = match xml::parse(&body) {
		Ok(root) => root,
		Err(err) => return fault_response("InvalidRequestFault", &format!("malformed request: {err}")),
	};
	let Some(call) = request.child("Body").and_then(|b| b.children.first()) else {
		return fault_response("InvalidRequestFault", "request has no body");
	};

	let recorded = RecordedCall {
		method: call.name.clone(),
		params: call.children.iter().map(|c| (c.name.clone(), c.text.clone())).collect(),
		soap_action: headers.get("soapaction").and_then(|v| v.to_str().ok()).map(str::to_string),
		had_session_cookie: headers
			.get(header::COOKIE)
			.and_then(|v| v.to_str().ok())
			.is_some_and(|cookies| cookies.contains(SESSION_COOKIE)),
	};
	debug!(target: "searchidx::testing", method = %recorded.method, "fake vim25 call");

	let mut guard = lock(&state);
	guard.calls.push(recorded);
	let inventory = &guard.inventory;

	if let Some(status) = inventory.http_errors.get(&call.name) {
		let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		return (status, "service unavailable").into_response();
	}
	if let Some((kind, message)) = inventory.faults.get(&call.name) {
		return fault_response(kind, message);
	}

	match call.name.as_str() {
		"RetrieveServiceContent" => ok_response("RetrieveServiceContent", SERVICE_CONTENT),
		"Login" => login(inventory, call),
		"Logout" | "DestroyView" => ok_response(&call.name, ""),
		"CreateContainerView" => {
			let kind = call.child_text("type").unwrap_or_default();
			ok_response(
				"CreateContainerView",
				&format!(r#"<returnval type="ContainerView">session[fake]{}</returnval>"#, escape(kind)),
			)
		}
		"RetrievePropertiesEx" => {
			let kind = call.child("specSet").and_then(|s| s.child("propSet")).and_then(|p| p.child_text("type")).unwrap_or_default();
			retrieve_page("RetrievePropertiesEx", inventory, kind, 0)
		}
		"ContinueRetrievePropertiesEx" => {
			let token = call.child_text("token").unwrap_or_default();
			let (kind, offset) = token.split_once(':').unwrap_or(("", "0"));
			retrieve_page("ContinueRetrievePropertiesEx", inventory, kind, offset.parse().unwrap_or(0))
		}
		"FindByDnsName" => {
			let dns_name = call.child_text("dnsName").unwrap_or_default();
			if call.child_text("vmSearch") == Some("true") {
				found_response("FindByDnsName", "VirtualMachine", inventory.vms_by_dns.get(dns_name))
			} else {
				found_response("FindByDnsName", "HostSystem", inventory.hosts_by_dns.get(dns_name))
			}
		}
		"FindByInventoryPath" => {
			let path = call.child_text("inventoryPath").unwrap_or_default();
			found_response("FindByInventoryPath", "VirtualMachine", inventory.vms_by_path.get(path))
		}
		"FindByIp" => {
			let ip = call.child_text("ip").unwrap_or_default();
			found_response("FindByIp", "VirtualMachine", inventory.vms_by_ip.get(ip))
		}
		other => fault_response("MethodNotFoundFault", &format!("method {other} is not supported")),
	}
}

fn login(inventory: &Inventory, call: &Element) -> Response {
	let (user, password) = &inventory.credentials;
	if call.child_text("userName") != Some(user.as_str()) || call.child_text("password") != Some(password.as_str()) {
		return fault_response("InvalidLoginFault", "Cannot complete login due to an incorrect user name or password.");
	}

	let mut response = ok_response(
		"Login",
		&format!(
			"<returnval><key>52fake</key><userName>{user}</userName><fullName>Administrator</fullName></returnval>",
			user = escape(user)
		),
	);
	response.headers_mut().insert(
		header::SET_COOKIE,
		HeaderValue::from_static("vmware_soap_session=52fake; Path=/; HttpOnly"),
	);
	response
}

fn retrieve_page(method: &str, inventory: &Inventory, kind: &str, offset: usize) -> Response {
	let objects: &[(String, String)] = if kind == "Datacenter" { &inventory.datacenters } else { &[] };
	if offset >= objects.len() {
		return ok_response(method, "");
	}

	let end = (offset + inventory.page_size).min(objects.len());
	let mut body = String::from("<returnval>");
	if end < objects.len() {
		body.push_str(&format!("<token>{kind}:{end}</token>"));
	}
	for (name, id) in &objects[offset..end] {
		body.push_str(&format!(
			r#"<objects><obj type="{kind}">{id}</obj><propSet><name>name</name><val xsi:type="xsd:string">{name}</val></propSet></objects>"#,
			id = escape(id),
			name = escape(name),
		));
	}
	body.push_str("</returnval>");
	ok_response(method, &body)
}

fn found_response(method: &str, kind: &str, id: Option<&String>) -> Response {
	match id {
		Some(id) => ok_response(method, &format!(r#"<returnval type="{kind}">{}</returnval>"#, escape(id))),
		None => ok_response(method, ""),
	}
}

fn ok_response(method: &str, inner: &str) -> Response {
	xml_response(
		StatusCode::OK,
		&format!(r#"<{method}Response xmlns="urn:vim25">{inner}</{method}Response>"#),
	)
}

fn fault_response(kind: &str, message: &str) -> Response {
	xml_response(
		StatusCode::INTERNAL_SERVER_ERROR,
		&format!(
			r#"<soapenv:Fault><faultcode>ServerFaultCode</faultcode><faultstring>{message}</faultstring><detail><{kind} xmlns="urn:vim25" xsi:type="{base}"></{kind}></detail></soapenv:Fault>"#,
			message = escape(message),
			base = kind.trim_end_matches("Fault"),
		),
	)
}

fn xml_response(status: StatusCode, body: &str) -> Response {
	let document = format!(
		r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
	);
	(status, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], document).into_response()
}

const SERVICE_CONTENT: &str = r#"<returnval><rootFolder type="Folder">group-d1</rootFolder><propertyCollector type="PropertyCollector">propertyCollector</propertyCollector><viewManager type="ViewManager">ViewManager</viewManager><about><name>VMware vCenter Server</name><fullName>VMware vCenter Server 7.0.3 build-fake</fullName><apiVersion>7.0.3.0</apiVersion></about><sessionManager type="SessionManager">SessionManager</sessionManager><searchIndex type="SearchIndex">SearchIndex</searchIndex></returnval>"#;

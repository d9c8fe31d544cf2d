//! Connection settings for a vim25 endpoint.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use searchidx_protocol::DEFAULT_API_VERSION;

use crate::error::{Error, Result};

/// Timeout applied to every remote call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Validated connection settings.
#[derive(Clone)]
pub struct ConnectionConfig {
	pub url: Url,
	pub username: String,
	pub password: String,
	/// Skip TLS certificate verification.
	pub insecure: bool,
	/// Per-request timeout, applied uniformly to every call.
	pub timeout: Duration,
	/// vim25 version announced in `SOAPAction`.
	pub api_version: String,
}

impl ConnectionConfig {
	/// Parses `url` and builds a config with default settings.
	///
	/// The url must be absolute and use `http` or `https`, typically
	/// `https://vcenter.example.com/sdk`.
	pub fn new(url: &str, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		let url = Url::parse(url).map_err(|e| Error::InvalidConfig(format!("invalid url `{url}`: {e}")))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(Error::InvalidConfig(format!("unsupported url scheme `{}`", url.scheme())));
		}

		Ok(Self {
			url,
			username: username.into(),
			password: password.into(),
			insecure: false,
			timeout: DEFAULT_TIMEOUT,
			api_version: DEFAULT_API_VERSION.to_string(),
		})
	}

	pub fn with_insecure(mut self, insecure: bool) -> Self {
		self.insecure = insecure;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
		self.api_version = api_version.into();
		self
	}
}

impl fmt::Debug for ConnectionConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionConfig")
			.field("url", &self.url.as_str())
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("insecure", &self.insecure)
			.field("timeout", &self.timeout)
			.field("api_version", &self.api_version)
			.finish()
	}
}

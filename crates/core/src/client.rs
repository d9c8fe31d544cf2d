//! SOAP-over-HTTP client for a single vim25 endpoint.
//!
//! Posts one envelope per call and decodes the reply. The session cookie set
//! by `Login` is kept by the client's cookie store and replayed on every
//! subsequent call.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use searchidx_protocol::{DecodeError, VimMethod, decode_response, envelope, soap_action};
use tracing::{debug, trace};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};

const MAX_ERROR_BODY: usize = 500;

/// HTTP transport bound to one endpoint.
#[derive(Debug, Clone)]
pub struct SoapClient {
	http: Client,
	url: Url,
}

impl SoapClient {
	/// Builds the HTTP client. No request is sent.
	pub fn new(config: &ConnectionConfig) -> Result<Self> {
		let action = HeaderValue::from_str(&soap_action(&config.api_version))
			.map_err(|e| Error::InvalidConfig(format!("invalid api version `{}`: {e}", config.api_version)))?;

		let mut headers = HeaderMap::new();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml; charset=utf-8"));
		headers.insert("soapaction", action);

		let http = Client::builder()
			.default_headers(headers)
			.cookie_store(true)
			.danger_accept_invalid_certs(config.insecure)
			.timeout(config.timeout)
			.build()?;

		Ok(Self {
			http,
			url: config.url.clone(),
		})
	}

	/// Endpoint every call is posted to.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Invokes `method` and decodes its result.
	///
	/// A fault body becomes [`Error::Fault`] whatever the HTTP status; any
	/// other non-success status becomes [`Error::Http`].
	pub async fn call<M: VimMethod>(&self, method: &M) -> Result<M::Output> {
		let body = envelope(method);
		debug!(target: "searchidx", method = M::NAME, url = %self.url, "soap call");
		trace!(target: "searchidx", method = M::NAME, bytes = body.len(), "request body");

		let response = self.http.post(self.url.clone()).body(body).send().await?;
		let status = response.status();
		let text = response.text().await?;
		trace!(target: "searchidx", method = M::NAME, status = status.as_u16(), bytes = text.len(), "response body");

		match decode_response::<M>(&text) {
			Err(err @ DecodeError::Fault(_)) => Err(Error::decode(M::NAME, err)),
			_ if !status.is_success() => Err(Error::Http {
				status: status.as_u16(),
				body: truncate(&text),
			}),
			decoded => decoded.map_err(|err| Error::decode(M::NAME, err)),
		}
	}
}

fn truncate(text: &str) -> String {
	match text.char_indices().nth(MAX_ERROR_BODY) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.to_string(),
	}
}

//! Error types for session and search index calls.

use searchidx_protocol::{DecodeError, SoapFault};
use thiserror::Error;

/// Errors raised by the session facade.
#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid connection config: {0}")]
	InvalidConfig(String),

	/// The server answered with a structured SOAP fault.
	#[error("{kind}: {message}")]
	Fault { kind: String, message: String },

	/// Non-success HTTP status without a fault body.
	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },

	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("failed to decode {method} response: {message}")]
	Decode { method: &'static str, message: String },
}

impl Error {
	/// Whether this error is a server-side fault rather than a transport or decoding problem.
	pub fn is_fault(&self) -> bool {
		matches!(self, Error::Fault { .. })
	}

	pub(crate) fn decode(method: &'static str, err: DecodeError) -> Self {
		match err {
			DecodeError::Fault(fault) => fault.into(),
			other => Error::Decode {
				method,
				message: other.to_string(),
			},
		}
	}
}

impl From<SoapFault> for Error {
	fn from(fault: SoapFault) -> Self {
		Error::Fault {
			kind: fault.kind().to_string(),
			message: fault.message,
		}
	}
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fault_maps_detail_kind() {
		let err: Error = SoapFault {
			code: "ServerFaultCode".to_string(),
			message: "bad ip".to_string(),
			detail_kind: Some("InvalidArgumentFault".to_string()),
		}
		.into();
		assert!(err.is_fault());
		assert_eq!(err.to_string(), "InvalidArgumentFault: bad ip");
	}

	#[test]
	fn decode_error_keeps_method_name() {
		let err = Error::decode("FindByIp", DecodeError::MissingBody);
		assert!(!err.is_fault());
		assert_eq!(err.to_string(), "failed to decode FindByIp response: response has no SOAP body");
	}
}

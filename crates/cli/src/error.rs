use thiserror::Error;

use crate::output::ErrorCode;

/// Failures that end the command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("failed to connect: {0}")]
	Connect(#[source] searchidx::Error),

	/// Listing datacenters failed. Already part of the printed results.
	#[error("failed to resolve datacenter: {message}")]
	Datacenter { code: ErrorCode, message: String },
}

impl CliError {
	/// Process exit status for this failure.
	pub fn exit_code(&self) -> i32 {
		match self {
			CliError::InvalidInput(_) => 2,
			CliError::Connect(_) | CliError::Datacenter { .. } => 1,
		}
	}

	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::InvalidInput(_) => ErrorCode::InvalidInput,
			CliError::Connect(searchidx::Error::Fault { kind, .. }) if kind == "InvalidLogin" || kind == "InvalidLoginFault" => ErrorCode::AuthError,
			CliError::Connect(searchidx::Error::Transport(err)) if err.is_timeout() => ErrorCode::Timeout,
			CliError::Connect(_) => ErrorCode::ConnectionFailed,
			CliError::Datacenter { code, .. } => *code,
		}
	}

	/// Whether the failure was printed with the lookup results.
	pub fn is_reported(&self) -> bool {
		matches!(self, CliError::Datacenter { .. })
	}
}

pub type Result<T> = std::result::Result<T, CliError>;

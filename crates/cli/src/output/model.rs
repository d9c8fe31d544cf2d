use serde::Serialize;

use crate::runner::LookupResult;

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The envelope printed by the structured output formats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inputs: Option<LookupInputs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}

/// Echo of the lookup flags. The password is never included.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupInputs {
	pub url: String,
	pub username: String,
	pub datacenter: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vm_dns_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vm_path: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vm_ip: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub host_dns_name: Option<String>,
}

/// Payload of a completed run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexData {
	pub results: Vec<LookupResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidInput,
	ConnectionFailed,
	AuthError,
	Timeout,
	DatacenterNotFound,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::ConnectionFailed => write!(f, "CONNECTION_FAILED"),
			ErrorCode::AuthError => write!(f, "AUTH_ERROR"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::DatacenterNotFound => write!(f, "DATACENTER_NOT_FOUND"),
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}

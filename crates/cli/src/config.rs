//! Turns parsed flags into a validated connection config and lookup request.

use std::time::Duration;

use searchidx::ConnectionConfig;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::runner::LookupRequest;

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct Settings {
	pub connection: ConnectionConfig,
	pub request: LookupRequest,
}

impl Settings {
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let url = required("url", &cli.url)?;
		let username = required("username", &cli.username)?;
		let password = required("password", &cli.password)?;
		let dc_name = required("dcname", &cli.dc_name)?;
		let api_version = required("api-version", &cli.api_version)?;

		let connection = ConnectionConfig::new(url, username, password)
			.map_err(|err| CliError::InvalidInput(err.to_string()))?
			.with_insecure(cli.insecure)
			.with_timeout(Duration::from_secs(cli.timeout_secs))
			.with_api_version(api_version);

		let request = LookupRequest {
			dc_name: dc_name.to_string(),
			vm_dns_name: optional(&cli.vm_dns_name),
			vm_path: optional(&cli.vm_path),
			vm_ip: optional(&cli.vm_ip),
			host_dns_name: optional(&cli.host_dns_name),
		};

		Ok(Self { connection, request })
	}
}

// Blank values are rejected; the value itself is passed on untouched so
// names still compare exactly.
fn required<'a>(flag: &str, value: &'a str) -> Result<&'a str> {
	if value.trim().is_empty() {
		return Err(CliError::InvalidInput(format!("--{flag} must not be empty")));
	}
	Ok(value)
}

// Blank optional values count as not given.
fn optional(value: &Option<String>) -> Option<String> {
	value.as_deref().filter(|v| !v.trim().is_empty()).map(str::to_string)
}

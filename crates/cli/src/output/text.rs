//! Line-oriented rendering of lookup results.

use std::io::{self, Write};

use crate::runner::{LookupOutcome, LookupResult, LookupTarget};

/// Renders every result in order.
///
/// A fault prints its kind and message, a transport or decoding failure its
/// message. After a failed lookup the target's not-found line follows,
/// except for the datacenter, whose failure ends the run.
pub fn render(results: &[LookupResult]) -> Vec<String> {
	let mut lines = Vec::new();
	for result in results {
		match &result.outcome {
			LookupOutcome::Found { reference } => lines.push(found_line(result.target, &result.query, &reference.value)),
			LookupOutcome::NotFound => lines.push(not_found_line(result.target, &result.query)),
			LookupOutcome::Fault { kind, message } => {
				lines.push("SOAP Fault -".to_string());
				lines.push(kind.clone());
				lines.push(String::new());
				lines.push(format!(" Message: {message}"));
			}
			LookupOutcome::Failed { message, .. } => lines.push(format!("Error Encountered: {message}")),
		}
		if result.error_message().is_some() && result.target != LookupTarget::Datacenter {
			lines.push(not_found_line(result.target, &result.query));
		}
	}
	lines
}

/// Writes [`render`] output to stdout.
pub fn print(results: &[LookupResult]) {
	let mut stdout = io::stdout().lock();
	for line in render(results) {
		let _ = writeln!(stdout, "{line}");
	}
}

fn found_line(target: LookupTarget, query: &str, value: &str) -> String {
	match target {
		LookupTarget::Datacenter => format!("Found Datacenter with name: {query}, MoRef: {value}"),
		LookupTarget::VmByDnsName => format!("Found VirtualMachine with DNS name: {query}, MoRef: {value}"),
		LookupTarget::VmByInventoryPath => format!("Found VirtualMachine with Path: {query}, MoRef: {value}"),
		LookupTarget::VmByIp => format!("Found VirtualMachine with IP address {query}, MoRef: {value}"),
		LookupTarget::HostByDnsName => format!("Found HostSystem with DNS name {query}, MoRef: {value}"),
	}
}

fn not_found_line(target: LookupTarget, query: &str) -> String {
	match target {
		LookupTarget::Datacenter => format!("Datacenter not Found with name: {query}"),
		LookupTarget::VmByDnsName => format!("VirtualMachine not Found with DNS name: {query}"),
		LookupTarget::VmByInventoryPath => format!("VirtualMachine not found with vmPath address: {query}"),
		LookupTarget::VmByIp => format!("VirtualMachine not found with IP address: {query}"),
		LookupTarget::HostByDnsName => format!("HostSystem not Found with DNS name:{query}"),
	}
}

use crate::output::model::{CommandResult, DiagnosticLevel, ErrorCode, LookupInputs, SearchIndexData};
use crate::output::result_builder::ResultBuilder;
use crate::runner::{LookupOutcome, LookupResult, LookupTarget};

/// Builds the envelope for a run.
///
/// `ok` is false only when the datacenter did not resolve: a missing
/// datacenter is `DATACENTER_NOT_FOUND`, a fault or failure while listing
/// datacenters keeps its own message. Faults on later lookups become
/// warning diagnostics.
pub fn search_index_result(builder: ResultBuilder<SearchIndexData>, inputs: LookupInputs, results: Vec<LookupResult>) -> CommandResult<SearchIndexData> {
	let mut builder = builder.inputs(inputs);

	if let Some(datacenter) = results.first().filter(|r| r.target == LookupTarget::Datacenter) {
		match &datacenter.outcome {
			LookupOutcome::Found { .. } => {}
			LookupOutcome::NotFound => {
				builder = builder.error(ErrorCode::DatacenterNotFound, format!("Datacenter not Found with name: {}", datacenter.query));
			}
			LookupOutcome::Failed { message, timed_out: true } => builder = builder.error(ErrorCode::Timeout, message.clone()),
			LookupOutcome::Fault { .. } | LookupOutcome::Failed { .. } => {
				let message = datacenter.error_message().unwrap_or_default();
				builder = builder.error(ErrorCode::ConnectionFailed, message);
			}
		}
	}

	for result in results.iter().filter(|r| r.target != LookupTarget::Datacenter) {
		if let Some(message) = result.error_message() {
			builder = builder.diagnostic_with_source(DiagnosticLevel::Warning, message, source(result.target));
		}
	}

	builder.data(SearchIndexData { results }).build()
}

fn source(target: LookupTarget) -> &'static str {
	match target {
		LookupTarget::Datacenter => "datacenter",
		LookupTarget::VmByDnsName => "vmDnsName",
		LookupTarget::VmByInventoryPath => "vmPath",
		LookupTarget::VmByIp => "vmIp",
		LookupTarget::HostByDnsName => "hostDnsName",
	}
}

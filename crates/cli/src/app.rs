use searchidx::VimSession;
use tracing::info;

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::output::{self, ErrorCode, LookupInputs, OutputFormat, ResultBuilder, SearchIndexData};
use crate::runner::{LookupOutcome, LookupResult, LookupRunner};

pub const COMMAND: &str = "search-index";

/// Connects, runs every requested lookup, prints the results and logs out.
///
/// Lookup failures are part of the printed results. Invalid input, connect
/// or login failures and a failure to list datacenters are returned as
/// errors; the last is returned after the results are printed.
pub async fn run(cli: Cli) -> Result<()> {
	let builder = ResultBuilder::<SearchIndexData>::new(COMMAND);
	let settings = Settings::from_cli(&cli)?;
	let inputs = lookup_inputs(&settings);

	let session = VimSession::connect(&settings.connection).await.map_err(CliError::Connect)?;
	let results = LookupRunner::new(&session).run(&settings.request).await;
	session.disconnect().await;
	info!(target: "searchidx", lookups = results.len(), "search complete");

	let fatal = results.first().and_then(datacenter_failure);
	match cli.format {
		OutputFormat::Text => output::text::print(&results),
		format => output::print_result(&output::search_index_result(builder, inputs, results), format),
	}

	match fatal {
		Some(err) => Err(err),
		None => Ok(()),
	}
}

fn datacenter_failure(result: &LookupResult) -> Option<CliError> {
	let code = match &result.outcome {
		LookupOutcome::Failed { timed_out: true, .. } => ErrorCode::Timeout,
		LookupOutcome::Fault { .. } | LookupOutcome::Failed { .. } => ErrorCode::ConnectionFailed,
		_ => return None,
	};
	Some(CliError::Datacenter {
		code,
		message: result.error_message()?,
	})
}

fn lookup_inputs(settings: &Settings) -> LookupInputs {
	let request = &settings.request;
	LookupInputs {
		url: settings.connection.url.to_string(),
		username: settings.connection.username.clone(),
		datacenter: request.dc_name.clone(),
		vm_dns_name: request.vm_dns_name.clone(),
		vm_path: request.vm_path.clone(),
		vm_ip: request.vm_ip.clone(),
		host_dns_name: request.host_dns_name.clone(),
	}
}

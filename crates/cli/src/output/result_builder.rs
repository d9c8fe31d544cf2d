use std::time::Instant;

use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, Diagnostic, DiagnosticLevel, ErrorCode, LookupInputs, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	inputs: Option<LookupInputs>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			inputs: None,
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
		}
	}

	pub fn inputs(mut self, inputs: LookupInputs) -> Self {
		self.inputs = Some(inputs);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn diagnostic_with_source(mut self, level: DiagnosticLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: Some(source.into()),
		});
		self
	}

	/// `ok` holds only when data is present and no error was recorded.
	pub fn build(self) -> CommandResult<T> {
		CommandResult {
			schema_version: SCHEMA_VERSION,
			ok: self.error.is_none() && self.data.is_some(),
			command: self.command,
			inputs: self.inputs,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
		}
	}
}

/// Serializes `result` to a string in a structured format.
///
/// Returns `None` for [`OutputFormat::Text`], which is rendered from the
/// lookup results directly.
pub fn encode_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) -> Option<String> {
	match format {
		OutputFormat::Toon => serde_json::to_value(result).ok().map(|value| toon::encode(&value, None).to_string()),
		OutputFormat::Json => serde_json::to_string_pretty(result).ok(),
		OutputFormat::Ndjson => serde_json::to_string(result).ok(),
		OutputFormat::Text => None,
	}
}

/// Prints a structured result to stdout. Text format prints nothing.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	if let Some(encoded) = encode_result(result, format) {
		println!("{encoded}");
	}
}

/// Prints a failed command: an envelope on stdout for structured formats,
/// one line on stderr for text.
pub fn print_failure(command: &str, code: ErrorCode, message: &str, format: OutputFormat) {
	if format.is_structured() {
		let result: CommandResult<()> = ResultBuilder::new(command).error(code, message).build();
		print_result(&result, format);
	} else {
		eprintln!("Error [{code}]: {message}");
	}
}

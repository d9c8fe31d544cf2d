use clap::ValueEnum;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text, one line per lookup (default)
	#[default]
	Text,
	/// JSON output
	Json,
	/// Newline-delimited JSON
	Ndjson,
	/// TOON output (token-efficient for LLMs)
	Toon,
}

impl OutputFormat {
	pub const ALL: [OutputFormat; 4] = [OutputFormat::Text, OutputFormat::Json, OutputFormat::Ndjson, OutputFormat::Toon];

	pub fn as_str(self) -> &'static str {
		match self {
			OutputFormat::Text => "text",
			OutputFormat::Json => "json",
			OutputFormat::Ndjson => "ndjson",
			OutputFormat::Toon => "toon",
		}
	}

	/// Whether results are printed as a serialized envelope.
	pub fn is_structured(self) -> bool {
		!matches!(self, OutputFormat::Text)
	}
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|format| format.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown format: {s}"))
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

use clap::Parser;
use searchidx_cli::{app, cli::Cli, logging, output};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);
	let format = cli.format;

	if let Err(err) = app::run(cli).await {
		error!(target: "searchidx", error = %err, "command failed");
		if !err.is_reported() {
			output::print_failure(app::COMMAND, err.code(), &err.to_string(), format);
		}
		std::process::exit(err.exit_code());
	}
}

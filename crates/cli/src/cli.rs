use clap::Parser;
use searchidx::protocol::DEFAULT_API_VERSION;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "search-index")]
#[command(about = "Resolve datacenter, virtual machine and host references through the vSphere search index")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "SEARCHIDX_FORMAT")]
	pub format: OutputFormat,

	/// Web service URL, e.g. https://vcenter.example.com/sdk
	#[arg(long, env = "SEARCHIDX_URL")]
	pub url: String,

	/// Login user name
	#[arg(long, env = "SEARCHIDX_USERNAME")]
	pub username: String,

	/// Login password
	#[arg(long, env = "SEARCHIDX_PASSWORD", hide_env_values = true)]
	pub password: String,

	/// Datacenter name
	#[arg(long = "dcname", alias = "dcName", value_name = "NAME", env = "SEARCHIDX_DCNAME")]
	pub dc_name: String,

	/// Virtual machine DNS name
	#[arg(long = "vmdnsname", alias = "vmDnsName", value_name = "NAME", env = "SEARCHIDX_VMDNSNAME")]
	pub vm_dns_name: Option<String>,

	/// Host DNS name
	#[arg(long = "hostdnsname", alias = "hostDns", value_name = "NAME", env = "SEARCHIDX_HOSTDNSNAME")]
	pub host_dns_name: Option<String>,

	/// Virtual machine inventory path, e.g. DC1/vm/web01
	#[arg(long = "vmpath", alias = "vmPath", value_name = "PATH", env = "SEARCHIDX_VMPATH")]
	pub vm_path: Option<String>,

	/// Virtual machine IP address
	#[arg(long = "vmip", alias = "vmIP", value_name = "IP", env = "SEARCHIDX_VMIP")]
	pub vm_ip: Option<String>,

	/// Accept invalid TLS certificates
	#[arg(long, env = "SEARCHIDX_INSECURE")]
	pub insecure: bool,

	/// Timeout for each remote call, in seconds
	#[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..), env = "SEARCHIDX_TIMEOUT_SECS")]
	pub timeout_secs: u64,

	/// vim25 version sent in the SOAPAction header
	#[arg(long, default_value = DEFAULT_API_VERSION, env = "SEARCHIDX_API_VERSION")]
	pub api_version: String,
}

/// Parses `args` with every `SEARCHIDX_*` fallback removed, so results do
/// not depend on the calling shell.
#[cfg(test)]
pub(crate) fn parse_without_env<I, T>(args: I) -> Result<Cli, clap::Error>
where
	I: IntoIterator<Item = T>,
	T: Into<std::ffi::OsString> + Clone,
{
	use clap::{CommandFactory, FromArgMatches};

	let mut command = Cli::command();
	let ids: Vec<_> = command.get_arguments().map(|arg| arg.get_id().clone()).collect();
	for id in ids {
		command = command.mut_arg(id, |arg| arg.env(None::<&'static str>));
	}
	Cli::from_arg_matches(&command.try_get_matches_from(args)?)
}

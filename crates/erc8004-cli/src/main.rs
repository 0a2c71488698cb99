//! Command-line entry point for issuing and checking feedback authorizations.
//!
//! Chain id, identity registry, domain and signing key all come from the
//! configuration file; flags only carry the per-authorization values.

use clap::{Parser, Subcommand};
use erc8004_config::Config;
use std::path::PathBuf;

mod commands;

use commands::{AuthArgs, Context, SignedAuthArgs};

/// Command-line arguments for the authorization tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the address of the configured signing key
	Address,
	/// Print the typed-data document and digest for an authorization
	Digest(AuthArgs),
	/// Sign an authorization and print the signature and payload
	Build(AuthArgs),
	/// Recover the signer of an authorization signature
	Recover {
		/// 65-byte signature as hex
		#[arg(long)]
		signature: String,
		#[command(flatten)]
		auth: SignedAuthArgs,
	},
	/// Decode a feedbackAuth payload and check its embedded signer
	Decode {
		/// Payload bytes as hex
		#[arg(long)]
		payload: String,
	},
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// Logs go to stderr so stdout stays machine-readable
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config)?;
	tracing::debug!("Loaded configuration from {}", args.config.display());

	let context = Context::from_config(config)?;
	let now = commands::unix_now();

	let output = match args.command {
		Command::Address => commands::address(&context)?,
		Command::Digest(auth) => commands::digest(&context, &auth, now)?,
		Command::Build(auth) => commands::build(&context, &auth, now)?,
		Command::Recover { signature, auth } => commands::recover(&context, &auth, &signature)?,
		Command::Decode { payload } => commands::decode(&context, &payload)?,
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}

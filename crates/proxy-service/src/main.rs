//! Main entry point for the gasless transfer proxy service.
//!
//! This binary wires the engine together: it loads configuration, seeds
//! the registries, instantiates a token collaborator per configured token
//! address, and exposes the relayer submission API over HTTP.

use clap::Parser;
use proxy_config::Config;
use proxy_core::{DomainDescriptor, TransferExecutor};
use proxy_token::implementations::testnet::TestnetToken;
use proxy_token::TokenInterface;
use proxy_types::Address;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the proxy service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the proxy service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the transfer executor and admin controller
/// 5. Serves the relayer submission API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started proxy service");

	let config = Config::from_file(&args.config)?;
	let resolved = config.resolve()?;
	tracing::info!(
		domain = %resolved.domain_name,
		chain_id = resolved.chain_id,
		"Loaded configuration"
	);

	let domain = DomainDescriptor {
		name: resolved.domain_name.clone(),
		version: resolved.domain_version.clone(),
		chain_id: resolved.chain_id,
		verifying_contract: resolved.proxy_address,
	};

	// One in-process testnet token per configured address. A deployment
	// against live tokens swaps these handles for RPC-backed ones.
	let mut tokens: HashMap<Address, Arc<dyn TokenInterface>> = HashMap::new();
	for token_address in &resolved.tokens {
		let token = TestnetToken::new(
			"Test USD Coin",
			"tUSDC",
			6,
			resolved.chain_id,
			*token_address,
			resolved.owner,
		);
		tokens.insert(*token_address, Arc::new(token));
	}

	let (executor, admin, mut events) = TransferExecutor::init(
		&domain,
		resolved.owner,
		&resolved.relayers,
		&resolved.tokens,
		tokens,
	);
	let executor = Arc::new(executor);
	let admin = Arc::new(admin);

	// Surface emitted records in the service log.
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			tracing::info!(?event, "Record emitted");
		}
	});

	if let Some(api_config) = resolved.api.clone().filter(|api| api.enabled) {
		server::start_server(api_config, executor, admin).await?;
	} else {
		tracing::info!("API disabled; running until interrupted");
		tokio::signal::ctrl_c().await?;
	}

	tracing::info!("Stopped proxy service");
	Ok(())
}

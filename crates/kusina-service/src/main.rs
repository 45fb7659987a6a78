//! Main entry point for the kusina admin service.
//!
//! This binary serves the order administration API for a small
//! food-delivery kitchen: listing orders, validated status transitions,
//! COD approval review, and customer notifications on terminal
//! transitions. It uses a modular architecture with pluggable
//! implementations for storage, auth, and messaging.

use clap::Parser;
use kusina_config::Config;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod factory_registry;
mod server;

/// Command-line arguments for the admin service.
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

/// Main entry point for the admin service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the admin engine with all implementations
/// 5. Serves the API until interrupted
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

	tracing::info!("Started kusina admin service");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.store.name);

	// Build the admin engine with registered implementations
	let api_config = config.api.clone();
	let engine = factory_registry::build_engine_from_config(config)?;
	let engine = Arc::new(engine);

	let Some(api_config) = api_config.filter(|api| api.enabled) else {
		tracing::warn!("API server disabled in configuration, nothing to serve");
		return Ok(());
	};

	tokio::select! {
		result = server::start_server(api_config, engine) => {
			tracing::info!("API server finished");
			result?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Shutdown signal received");
		}
	}

	tracing::info!("Stopped kusina admin service");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[tokio::test]
	async fn test_build_engine_with_file_config() {
		let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
		let config_path = temp_dir.path().join("test_config.toml");

		let config_content = r#"
[store]
name = "Ate Ai's Kitchen"
latitude = 14.5547
longitude = 121.0223
max_delivery_km = 10.0

[storage]
primary = "memory"
[storage.implementations.memory]

[auth]
primary = "static_tokens"
[auth.implementations.static_tokens]
[[auth.implementations.static_tokens.admins]]
name = "ate-ai"
token = "kusina-dev-token"

[messaging]
primary = "memory"
[messaging.implementations.memory]

[api]
enabled = true
host = "127.0.0.1"
port = 3000
"#;

		std::fs::write(&config_path, config_content).expect("Failed to write config");

		let config = Config::from_file(config_path.to_str().unwrap())
			.await
			.expect("Failed to load config");
		assert_eq!(config.store.name, "Ate Ai's Kitchen");
		assert!(config.api.as_ref().is_some_and(|api| api.enabled));

		let engine = factory_registry::build_engine_from_config(config)
			.expect("Failed to build engine");
		assert!(engine.authorize("kusina-dev-token").await.is_ok());
	}
}

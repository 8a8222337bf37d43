//! Main entry point for the orderdesk service.
//!
//! This binary wires the storage backend, mailer, and the three core
//! services together from configuration, then hosts the HTTP API until
//! interrupted.

use clap::Parser;
use orderdesk_auth::TokenSigner;
use orderdesk_config::Config;
use orderdesk_core::{AccountService, NotificationService, OrderWorkflow};
use orderdesk_storage::{StorageFactory, StorageService};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

use orderdesk_auth::mailer;
use orderdesk_storage::implementations::file::create_storage as create_file_storage;
use orderdesk_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the orderdesk service.
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

	let config_path = args.config.to_str().ok_or("config path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(
		"Loaded configuration [storage={}, mailer={}]",
		config.storage.primary,
		config.mailer.primary
	);

	let state = build_state(&config)?;

	server::start_server(config.server.clone(), state).await?;

	tracing::info!("Stopped orderdesk");
	Ok(())
}

/// Builds the shared application state from configuration.
///
/// Backends are selected by name from factory maps, so a new
/// implementation only needs a factory registration here.
fn build_state(config: &Config) -> Result<server::AppState, Box<dyn std::error::Error>> {
	let mut storage_factories: HashMap<&str, StorageFactory> = HashMap::new();
	storage_factories.insert("memory", create_memory_storage);
	storage_factories.insert("file", create_file_storage);

	let storage_factory = storage_factories
		.get(config.storage.primary.as_str())
		.ok_or_else(|| format!("Unknown storage backend: {}", config.storage.primary))?;
	let storage_config = config
		.storage
		.implementations
		.get(&config.storage.primary)
		.ok_or_else(|| format!("Missing storage config: {}", config.storage.primary))?;
	let storage = Arc::new(StorageService::new(storage_factory(storage_config)?));

	let mailer_factories: HashMap<&str, mailer::MailerFactory> =
		mailer::get_all_implementations().into_iter().collect();
	let mailer_factory = mailer_factories
		.get(config.mailer.primary.as_str())
		.ok_or_else(|| format!("Unknown mailer backend: {}", config.mailer.primary))?;
	let mailer_config = config
		.mailer
		.implementations
		.get(&config.mailer.primary)
		.ok_or_else(|| format!("Missing mailer config: {}", config.mailer.primary))?;
	let mailer = mailer_factory(mailer_config)?;

	let tokens = Arc::new(TokenSigner::new(
		&config.auth.jwt_secret,
		config.auth.token_ttl_hours,
	));
	let accounts = AccountService::new(
		Arc::clone(&storage),
		TokenSigner::new(&config.auth.jwt_secret, config.auth.token_ttl_hours),
		mailer,
		config.auth.otp_ttl_minutes,
	);

	Ok(server::AppState {
		workflow: Arc::new(OrderWorkflow::new(Arc::clone(&storage))),
		notifications: Arc::new(NotificationService::new(Arc::clone(&storage))),
		accounts: Arc::new(accounts),
		tokens,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_config() -> Config {
		Config::from_toml_str(
			r#"
			[server]
			host = "127.0.0.1"
			port = 5000

			[storage]
			primary = "memory"
			[storage.implementations.memory]

			[auth]
			jwt_secret = "test-secret"

			[mailer]
			primary = "log"
			[mailer.implementations.log]
			from = "orderdesk@example.com"
			"#,
		)
		.unwrap()
	}

	#[test]
	fn args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};
		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn state_builds_from_minimal_config() {
		let state = build_state(&test_config());
		assert!(state.is_ok(), "Failed to build state: {:?}", state.err());
	}

	#[test]
	fn unknown_storage_backend_is_rejected() {
		let mut config = test_config();
		config.storage.primary = "redis".to_string();
		assert!(build_state(&config).is_err());
	}
}

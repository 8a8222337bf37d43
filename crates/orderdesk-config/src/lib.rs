//! Configuration module for the orderdesk service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` environment-variable resolution and validates that all
//! required configuration values are properly set.

use orderdesk_types::SecretString;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the orderdesk service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Configuration for the HTTP server.
	pub server: ServerConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for authentication.
	pub auth: AuthConfig,
	/// Configuration for outgoing mail.
	pub mailer: MailerConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_port")]
	pub port: u16,
}

/// Returns the default server host.
fn default_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default server port.
fn default_port() -> u16 {
	5000
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
	/// Secret used to sign bearer tokens. Load it from the environment
	/// with `${JWT_SECRET}` rather than committing it to the file.
	pub jwt_secret: SecretString,
	/// Lifetime of issued tokens in hours.
	#[serde(default = "default_token_ttl_hours")]
	pub token_ttl_hours: u64,
	/// Lifetime of one-time verification codes in minutes.
	#[serde(default = "default_otp_ttl_minutes")]
	pub otp_ttl_minutes: u64,
}

/// Returns the default token lifetime in hours.
fn default_token_ttl_hours() -> u64 {
	24
}

/// Returns the default OTP lifetime in minutes.
fn default_otp_ttl_minutes() -> u64 {
	10
}

/// Configuration for outgoing mail.
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of mailer implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables referenced in the file are resolved before
	/// parsing, and the configuration is validated after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		Self::from_toml_str(&raw)
	}

	/// Parses configuration from a TOML string.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let resolved = resolve_env_vars(raw)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.server.host.is_empty() {
			return Err(ConfigError::Validation("Server host cannot be empty".into()));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if self.auth.jwt_secret.is_empty() {
			return Err(ConfigError::Validation(
				"Auth jwt_secret cannot be empty".into(),
			));
		}
		if self.auth.token_ttl_hours == 0 {
			return Err(ConfigError::Validation(
				"Auth token_ttl_hours must be greater than 0".into(),
			));
		}
		if self.auth.otp_ttl_minutes == 0 {
			return Err(ConfigError::Validation(
				"Auth otp_ttl_minutes must be greater than 0".into(),
			));
		}

		if self.mailer.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Mailer primary implementation cannot be empty".into(),
			));
		}
		if !self
			.mailer
			.implementations
			.contains_key(&self.mailer.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary mailer '{}' not found in implementations",
				self.mailer.primary
			)));
		}

		Ok(())
	}
}

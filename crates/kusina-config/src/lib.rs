//! Configuration module for the kusina admin service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` / `${VAR:-default}` environment variable interpolation and
//! validates that all required configuration values are properly set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
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
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the kusina admin service.
///
/// This structure contains all configuration sections required for the
/// service to operate: the physical store, the storage backend, admin
/// authentication, customer messaging, and the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the physical store.
	pub store: StoreConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for admin session verification.
	pub auth: AuthConfig,
	/// Configuration for customer messaging.
	pub messaging: MessagingConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration for the physical store the service administers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
	/// Store name used in customer-facing message templates.
	pub name: String,
	/// Store latitude in decimal degrees.
	#[serde(default = "default_store_latitude")]
	pub latitude: f64,
	/// Store longitude in decimal degrees.
	#[serde(default = "default_store_longitude")]
	pub longitude: f64,
	/// Advisory delivery radius in kilometers. COD orders farther out get
	/// a feasibility warning during review; approval is never blocked.
	#[serde(default = "default_max_delivery_km")]
	pub max_delivery_km: f64,
}

/// Returns the default store latitude (the kitchen's Makati location).
fn default_store_latitude() -> f64 {
	14.5547
}

/// Returns the default store longitude (the kitchen's Makati location).
fn default_store_longitude() -> f64 {
	121.0223
}

/// Returns the default advisory delivery radius in kilometers.
fn default_max_delivery_km() -> f64 {
	10.0
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for admin session verification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of auth implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for customer messaging.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessagingConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of messaging implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
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
	/// Loads configuration from a file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated after parsing.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	///
	/// This method checks that:
	/// - the store name is not empty and its coordinates are plausible
	/// - the advisory delivery radius is positive
	/// - each section names a primary implementation that exists among
	///   its configured implementations
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate store config
		if self.store.name.trim().is_empty() {
			return Err(ConfigError::Validation("Store name cannot be empty".into()));
		}
		if !(-90.0..=90.0).contains(&self.store.latitude) {
			return Err(ConfigError::Validation(format!(
				"Store latitude {} out of range [-90, 90]",
				self.store.latitude
			)));
		}
		if !(-180.0..=180.0).contains(&self.store.longitude) {
			return Err(ConfigError::Validation(format!(
				"Store longitude {} out of range [-180, 180]",
				self.store.longitude
			)));
		}
		if !self.store.max_delivery_km.is_finite() || self.store.max_delivery_km <= 0.0 {
			return Err(ConfigError::Validation(
				"max_delivery_km must be a positive number".into(),
			));
		}

		Self::validate_section("storage", &self.storage.primary, &self.storage.implementations)?;
		Self::validate_section("auth", &self.auth.primary, &self.auth.implementations)?;
		Self::validate_section(
			"messaging",
			&self.messaging.primary,
			&self.messaging.implementations,
		)?;

		Ok(())
	}

	/// Checks one pluggable section: a non-empty primary that is present
	/// among the configured implementations.
	fn validate_section(
		section: &str,
		primary: &str,
		implementations: &HashMap<String, toml::Value>,
	) -> Result<(), ConfigError> {
		if implementations.is_empty() {
			return Err(ConfigError::Validation(format!(
				"At least one {} implementation must be configured",
				section
			)));
		}
		if primary.is_empty() {
			return Err(ConfigError::Validation(format!(
				"{} primary implementation cannot be empty",
				section
			)));
		}
		if !implementations.contains_key(primary) {
			return Err(ConfigError::Validation(format!(
				"Primary {} '{}' not found in implementations",
				section, primary
			)));
		}
		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is
/// automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL_CONFIG: &str = r#"
[store]
name = "Ate Ai's Kitchen"

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
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_HOST", "localhost");
		std::env::set_var("TEST_PORT", "5432");

		let input = "host = \"${TEST_HOST}:${TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("TEST_HOST");
		std::env::remove_var("TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_parses_with_defaults() {
		let config: Config = MINIMAL_CONFIG.parse().unwrap();
		assert_eq!(config.store.name, "Ate Ai's Kitchen");
		assert_eq!(config.store.latitude, 14.5547);
		assert_eq!(config.store.longitude, 121.0223);
		assert_eq!(config.store.max_delivery_km, 10.0);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_STORE_NAME", "Test Kitchen");

		let config_str = MINIMAL_CONFIG.replace("Ate Ai's Kitchen", "${TEST_STORE_NAME}");
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.store.name, "Test Kitchen");

		std::env::remove_var("TEST_STORE_NAME");
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config_str = MINIMAL_CONFIG.replace("primary = \"memory\"\n[storage.implementations.memory]", "primary = \"redis\"\n[storage.implementations.memory]");
		let result: Result<Config, _> = config_str.parse();
		let err = result.unwrap_err();
		assert!(err.to_string().contains("Primary storage 'redis' not found"));
	}

	#[test]
	fn test_out_of_range_latitude_rejected() {
		let config_str = MINIMAL_CONFIG.replace(
			"name = \"Ate Ai's Kitchen\"",
			"name = \"Ate Ai's Kitchen\"\nlatitude = 97.3",
		);
		let result: Result<Config, _> = config_str.parse();
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("latitude 97.3 out of range"));
	}

	#[test]
	fn test_empty_store_name_rejected() {
		let config_str = MINIMAL_CONFIG.replace("Ate Ai's Kitchen", "  ");
		let result: Result<Config, _> = config_str.parse();
		assert!(result.unwrap_err().to_string().contains("Store name"));
	}

	#[tokio::test]
	async fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, MINIMAL_CONFIG).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(config.auth.primary, "static_tokens");
	}
}

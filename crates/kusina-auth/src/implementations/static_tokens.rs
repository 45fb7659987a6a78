//! Static token list auth implementation.
//!
//! This module verifies callers against a fixed set of admin tokens taken
//! from configuration. It suits single-store deployments where the admin
//! team is small and tokens are provisioned out of band (typically through
//! environment variables interpolated into the config file).

use crate::{AdminSession, AuthError, AuthFactory, AuthRegistry, SessionInterface};
use async_trait::async_trait;
use kusina_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;

/// Auth implementation backed by a static token table.
pub struct StaticTokens {
	/// Token to admin-name lookup.
	tokens: HashMap<String, String>,
}

impl StaticTokens {
	/// Creates a new StaticTokens instance from a token table.
	pub fn new(tokens: HashMap<String, String>) -> Self {
		Self { tokens }
	}
}

#[async_trait]
impl SessionInterface for StaticTokens {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StaticTokensSchema)
	}

	async fn verify(&self, token: &str) -> Result<AdminSession, AuthError> {
		self.tokens
			.get(token)
			.map(|name| AdminSession {
				admin_name: name.clone(),
			})
			.ok_or(AuthError::InvalidSession)
	}
}

/// Configuration schema for StaticTokens.
pub struct StaticTokensSchema;

impl ConfigSchema for StaticTokensSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let admin_schema = Schema::new(
			vec![
				Field::new("name", FieldType::String),
				Field::new("token", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if !s.trim().is_empty() => Ok(()),
						_ => Err("token must not be blank".to_string()),
					}
				}),
			],
			vec![],
		);
		let schema = Schema::new(
			vec![Field::new(
				"admins",
				FieldType::Array(Box::new(FieldType::Table(admin_schema))),
			)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry for the static token auth implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static_tokens";
	type Factory = AuthFactory;

	fn factory() -> Self::Factory {
		create_auth
	}
}

impl AuthRegistry for Registry {}

/// Factory function to create a static token auth backend from configuration.
///
/// Configuration parameters:
/// - `admins`: array of `{ name, token }` tables; at least one entry
pub fn create_auth(config: &toml::Value) -> Result<Box<dyn SessionInterface>, AuthError> {
	let admins = config
		.get("admins")
		.and_then(|v| v.as_array())
		.ok_or_else(|| AuthError::Implementation("admins list missing".to_string()))?;

	let mut tokens = HashMap::new();
	for admin in admins {
		let name = admin
			.get("name")
			.and_then(|v| v.as_str())
			.ok_or_else(|| AuthError::Implementation("admin name missing".to_string()))?;
		let token = admin
			.get("token")
			.and_then(|v| v.as_str())
			.filter(|t| !t.trim().is_empty())
			.ok_or_else(|| AuthError::Implementation("admin token missing".to_string()))?;
		tokens.insert(token.to_string(), name.to_string());
	}

	if tokens.is_empty() {
		return Err(AuthError::Implementation(
			"at least one admin token required".to_string(),
		));
	}

	Ok(Box::new(StaticTokens::new(tokens)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> toml::Value {
		r#"
[[admins]]
name = "ate-ai"
token = "kusina-dev-token"
"#
		.parse()
		.unwrap()
	}

	#[tokio::test]
	async fn test_verify_known_token() {
		let auth = create_auth(&config()).unwrap();
		let session = auth.verify("kusina-dev-token").await.unwrap();
		assert_eq!(session.admin_name, "ate-ai");
	}

	#[tokio::test]
	async fn test_verify_unknown_token_fails() {
		let auth = create_auth(&config()).unwrap();
		assert!(matches!(
			auth.verify("wrong").await,
			Err(AuthError::InvalidSession)
		));
	}

	#[test]
	fn test_factory_rejects_empty_admin_list() {
		let config: toml::Value = "admins = []".parse().unwrap();
		assert!(create_auth(&config).is_err());
	}

	#[test]
	fn test_schema_rejects_blank_token() {
		let config: toml::Value = r#"
[[admins]]
name = "ate-ai"
token = "  "
"#
		.parse()
		.unwrap();
		assert!(StaticTokensSchema.validate(&config).is_err());
	}
}

//! Webhook messaging store implementation.
//!
//! This module delivers each message as a JSON POST to a configured
//! endpoint, for deployments where the customer-facing messaging store
//! lives behind a separate service (e.g. the storefront's database API).

use crate::{MessagingFactory, MessagingInterface, MessagingRegistry, NotifyError};
use async_trait::async_trait;
use kusina_types::{ConfigSchema, CustomerMessage, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::time::Duration;

/// Messaging implementation that POSTs messages to an HTTP endpoint.
pub struct WebhookMessaging {
	/// Endpoint receiving message records.
	url: String,
	/// Reused HTTP client with connection pooling.
	client: reqwest::Client,
}

impl WebhookMessaging {
	/// Creates a new WebhookMessaging instance for the given endpoint.
	pub fn new(url: String) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| NotifyError::Network(e.to_string()))?;
		Ok(Self { url, client })
	}
}

#[async_trait]
impl MessagingInterface for WebhookMessaging {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WebhookMessagingSchema)
	}

	async fn append(&self, message: &CustomerMessage) -> Result<(), NotifyError> {
		let response = self
			.client
			.post(&self.url)
			.json(message)
			.send()
			.await
			.map_err(|e| NotifyError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(NotifyError::Backend(format!(
				"endpoint returned {}",
				response.status()
			)));
		}
		Ok(())
	}
}

/// Configuration schema for WebhookMessaging.
pub struct WebhookMessagingSchema;

impl ConfigSchema for WebhookMessagingSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
					_ => Err("url must start with http:// or https://".to_string()),
				}
			})],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry for the webhook messaging implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = MessagingFactory;

	fn factory() -> Self::Factory {
		create_messaging
	}
}

impl MessagingRegistry for Registry {}

/// Factory function to create a webhook messaging backend from configuration.
///
/// Configuration parameters:
/// - `url`: endpoint that accepts message records as JSON POST bodies
pub fn create_messaging(config: &toml::Value) -> Result<Box<dyn MessagingInterface>, NotifyError> {
	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Backend("url missing".to_string()))?
		.to_string();

	Ok(Box::new(WebhookMessaging::new(url)?))
}

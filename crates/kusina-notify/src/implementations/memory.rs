//! In-memory messaging store implementation.
//!
//! This module keeps queued messages in a shared vector. It backs tests
//! and single-process deployments where the storefront reads messages from
//! the same process; nothing is persisted across restarts.

use crate::{MessagingFactory, MessagingInterface, MessagingRegistry, NotifyError};
use async_trait::async_trait;
use kusina_types::{ConfigSchema, CustomerMessage, ImplementationRegistry, Schema, ValidationError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory, append-only message outbox.
///
/// Clones share the same underlying vector, so a test can hold one handle
/// while the dispatcher owns another.
#[derive(Clone)]
pub struct MemoryOutbox {
	messages: Arc<RwLock<Vec<CustomerMessage>>>,
}

impl MemoryOutbox {
	/// Creates a new, empty MemoryOutbox.
	pub fn new() -> Self {
		Self {
			messages: Arc::new(RwLock::new(Vec::new())),
		}
	}

	/// Returns a copy of every message queued so far, in append order.
	pub async fn snapshot(&self) -> Vec<CustomerMessage> {
		self.messages.read().await.clone()
	}
}

impl Default for MemoryOutbox {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl MessagingInterface for MemoryOutbox {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryOutboxSchema)
	}

	async fn append(&self, message: &CustomerMessage) -> Result<(), NotifyError> {
		self.messages.write().await.push(message.clone());
		Ok(())
	}
}

/// Configuration schema for MemoryOutbox.
pub struct MemoryOutboxSchema;

impl ConfigSchema for MemoryOutboxSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory messaging has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the memory messaging implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = MessagingFactory;

	fn factory() -> Self::Factory {
		create_messaging
	}
}

impl MessagingRegistry for Registry {}

/// Factory function to create a memory messaging backend from configuration.
///
/// Configuration parameters:
/// - None required for memory messaging
pub fn create_messaging(_config: &toml::Value) -> Result<Box<dyn MessagingInterface>, NotifyError> {
	Ok(Box::new(MemoryOutbox::new()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use kusina_types::MessageType;

	#[tokio::test]
	async fn test_append_preserves_order() {
		let outbox = MemoryOutbox::new();
		for i in 0..3 {
			let message = CustomerMessage {
				id: format!("m{}", i),
				order_id: "ord-1".to_string(),
				customer_id: "cust-1".to_string(),
				sender: "admin".to_string(),
				message_type: MessageType::General,
				body: format!("body {}", i),
				created_at: 1_700_000_000 + i,
			};
			outbox.append(&message).await.unwrap();
		}

		let messages = outbox.snapshot().await;
		assert_eq!(messages.len(), 3);
		assert_eq!(messages[0].id, "m0");
		assert_eq!(messages[2].id, "m2");
	}
}

//! Customer notification dispatch for the kusina admin service.
//!
//! This module emits customer-facing messages when an order reaches a
//! terminal status: a delivery receipt plus a rating prompt on Delivered,
//! and a cancellation notice on Cancelled. Dispatch is best-effort and
//! strictly after the fact: the status write has already committed, so a
//! messaging failure is logged and reported as an event, never bubbled up
//! as the transition's failure.

use async_trait::async_trait;
use kusina_order::DEFAULT_REJECTION_REASON;
use kusina_types::{
	ConfigSchema, CustomerMessage, ImplementationRegistry, MessageType, NotificationEvent, Order,
	OrderStatus,
};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod webhook;
}

pub mod templates;

/// Errors that can occur while appending to the messaging store.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs in the messaging backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for messaging store implementations.
///
/// The messaging store is append-only; implementations only need to accept
/// a message record. Reading conversations back is the storefront's
/// concern, not this service's.
#[async_trait]
pub trait MessagingInterface: Send + Sync {
	/// Returns the configuration schema for this messaging implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Appends a message record to the store.
	async fn append(&self, message: &CustomerMessage) -> Result<(), NotifyError>;
}

/// Type alias for messaging factory functions.
pub type MessagingFactory = fn(&toml::Value) -> Result<Box<dyn MessagingInterface>, NotifyError>;

/// Registry trait for messaging implementations.
pub trait MessagingRegistry: ImplementationRegistry<Factory = MessagingFactory> {}

/// Get all registered messaging implementations.
///
/// Returns a vector of (name, factory) tuples for all available messaging
/// implementations. This is used by the engine builder to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, MessagingFactory)> {
	use implementations::{memory, webhook};

	vec![
		(memory::Registry::NAME, memory::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service that dispatches customer notifications on terminal transitions.
pub struct NotificationService {
	/// The underlying messaging store implementation.
	implementation: Box<dyn MessagingInterface>,
	/// Store name used in message templates.
	store_name: String,
}

impl NotificationService {
	/// Creates a new NotificationService with the specified implementation.
	pub fn new(implementation: Box<dyn MessagingInterface>, store_name: String) -> Self {
		Self {
			implementation,
			store_name,
		}
	}

	/// Emits the messages owed for an order's current status.
	///
	/// Keyed on the new status: Delivered yields a receipt and a rating
	/// prompt, Cancelled yields a cancellation notice, everything else
	/// yields nothing. Guest orders (no customer account) are skipped.
	/// Each message is appended independently; one failed insert does not
	/// stop the others. The returned events describe what happened so the
	/// caller can publish them, but no error ever escapes this method.
	pub async fn dispatch_status_change(&self, order: &Order) -> Vec<NotificationEvent> {
		let customer_id = match &order.customer_id {
			Some(id) => id.clone(),
			None => {
				tracing::debug!(order_id = %order.id, "Guest order, skipping notification");
				return Vec::new();
			},
		};

		let bodies: Vec<(MessageType, String)> = match order.status {
			OrderStatus::Delivered => vec![
				(
					MessageType::Receipt,
					templates::receipt(
						&self.store_name,
						&order.customer_name,
						&order.order_number,
						order.delivery_time_minutes,
					),
				),
				(
					MessageType::RatingPrompt,
					templates::rating_prompt(&order.order_number),
				),
			],
			OrderStatus::Cancelled => {
				let reason = order
					.rejection_reason
					.as_deref()
					.unwrap_or(DEFAULT_REJECTION_REASON);
				vec![(
					MessageType::General,
					templates::cancellation(&self.store_name, &order.order_number, reason),
				)]
			},
			_ => return Vec::new(),
		};

		let mut events = Vec::with_capacity(bodies.len());
		for (message_type, body) in bodies {
			let message = CustomerMessage {
				id: Uuid::new_v4().to_string(),
				order_id: order.id.clone(),
				customer_id: customer_id.clone(),
				sender: "admin".to_string(),
				message_type,
				body,
				created_at: unix_now(),
			};

			match self.implementation.append(&message).await {
				Ok(()) => {
					tracing::info!(
						order_id = %order.id,
						message_type = %message_type,
						"Queued customer message"
					);
					events.push(NotificationEvent::Queued {
						order_id: order.id.clone(),
						message_type,
					});
				},
				Err(e) => {
					tracing::warn!(
						order_id = %order.id,
						message_type = %message_type,
						error = %e,
						"Failed to queue customer message"
					);
					events.push(NotificationEvent::Failed {
						order_id: order.id.clone(),
						reason: e.to_string(),
					});
				},
			}
		}
		events
	}
}

/// Current time as Unix seconds.
fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

#[cfg(test)]
mod tests {
	use super::implementations::memory::MemoryOutbox;
	use super::*;
	use kusina_types::{DeliveryMode, PaymentMethod};
	use rust_decimal::Decimal;

	fn order(status: OrderStatus, customer_id: Option<&str>) -> Order {
		Order {
			id: "ord-5".to_string(),
			order_number: "A-2001".to_string(),
			customer_id: customer_id.map(str::to_string),
			customer_name: "Len Cruz".to_string(),
			customer_phone: "09170001111".to_string(),
			payment_method: PaymentMethod::Gcash,
			payment_status: "paid".to_string(),
			delivery_mode: DeliveryMode::Delivery,
			delivery_address: Some("Unit 2B, Pasig".to_string()),
			delivery_coordinates: None,
			items: vec![],
			subtotal: Decimal::from(250),
			delivery_fee: Decimal::from(49),
			total: Decimal::from(299),
			status,
			created_at: 1_700_000_000,
			updated_at: 1_700_000_000,
			admin_note: None,
			rejection_reason: None,
			delivery_time_minutes: Some(35),
			rating: None,
			rating_note: None,
		}
	}

	fn service(outbox: &MemoryOutbox) -> NotificationService {
		NotificationService::new(Box::new(outbox.clone()), "Ate Ai's Kitchen".to_string())
	}

	#[tokio::test]
	async fn test_delivered_order_gets_receipt_and_rating_prompt() {
		let outbox = MemoryOutbox::new();
		let events = service(&outbox)
			.dispatch_status_change(&order(OrderStatus::Delivered, Some("cust-1")))
			.await;

		assert_eq!(events.len(), 2);
		let messages = outbox.snapshot().await;
		assert_eq!(messages.len(), 2);
		assert_eq!(messages[0].message_type, MessageType::Receipt);
		assert!(messages[0].body.contains("order #A-2001 has been delivered"));
		assert!(messages[0].body.contains("Delivery time: 35 minutes"));
		assert_eq!(messages[1].message_type, MessageType::RatingPrompt);
		assert!(messages[1].body.contains("#A-2001"));
	}

	#[tokio::test]
	async fn test_receipt_omits_unknown_delivery_time() {
		let outbox = MemoryOutbox::new();
		let mut delivered = order(OrderStatus::Delivered, Some("cust-1"));
		delivered.delivery_time_minutes = None;
		service(&outbox).dispatch_status_change(&delivered).await;

		let messages = outbox.snapshot().await;
		assert!(!messages[0].body.contains("Delivery time"));
	}

	#[tokio::test]
	async fn test_guest_order_emits_nothing() {
		let outbox = MemoryOutbox::new();
		let events = service(&outbox)
			.dispatch_status_change(&order(OrderStatus::Delivered, None))
			.await;

		assert!(events.is_empty());
		assert!(outbox.snapshot().await.is_empty());
	}

	#[tokio::test]
	async fn test_cancelled_order_gets_reason_with_default_fallback() {
		let outbox = MemoryOutbox::new();
		service(&outbox)
			.dispatch_status_change(&order(OrderStatus::Cancelled, Some("cust-1")))
			.await;

		let messages = outbox.snapshot().await;
		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].message_type, MessageType::General);
		assert!(messages[0]
			.body
			.contains("Reason: Order rejected by admin"));
	}

	#[tokio::test]
	async fn test_non_terminal_status_emits_nothing() {
		let outbox = MemoryOutbox::new();
		let events = service(&outbox)
			.dispatch_status_change(&order(OrderStatus::Preparing, Some("cust-1")))
			.await;

		assert!(events.is_empty());
	}
}

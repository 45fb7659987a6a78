//! Event types for inter-service communication.
//!
//! This module defines the events published on the engine's broadcast bus
//! after a storage write commits. Consumers (the HTTP layer, background
//! listeners, tests) subscribe to observe order changes without polling the
//! store; the events carry ids rather than full records so that subscribers
//! always re-read authoritative state.

use crate::{MessageType, OrderStatus};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all service events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdminEvent {
	/// Events from the order lifecycle.
	Order(OrderEvent),
	/// Events from the notification dispatcher.
	Notification(NotificationEvent),
}

/// Events related to order mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// An order moved to a new status.
	StatusChanged {
		order_id: String,
		order_number: String,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// An order's fields changed without a status transition.
	Updated { order_id: String },
}

/// Events related to customer notification dispatch.
///
/// Dispatch is best-effort; a Failed event is informational and never
/// implies the triggering transition was rolled back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEvent {
	/// A message was appended to the messaging store.
	Queued {
		order_id: String,
		message_type: MessageType,
	},
	/// A message could not be appended.
	Failed { order_id: String, reason: String },
}

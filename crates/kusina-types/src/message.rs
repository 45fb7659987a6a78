//! Customer-facing message types.
//!
//! Messages are appended to the messaging store when an order reaches a
//! terminal status. The store is append-only; this service never edits or
//! deletes a message once queued.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of message emitted to a customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
	/// Delivery receipt referencing the order number.
	Receipt,
	/// Prompt asking the customer to rate the delivered order.
	RatingPrompt,
	/// Free-form message, used for cancellation notices.
	General,
}

impl MessageType {
	/// Returns the string representation used on the wire and in storage.
	pub fn as_str(&self) -> &'static str {
		match self {
			MessageType::Receipt => "receipt",
			MessageType::RatingPrompt => "rating_prompt",
			MessageType::General => "general",
		}
	}
}

impl fmt::Display for MessageType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A message queued for a customer about one of their orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerMessage {
	/// Unique identifier for this message.
	pub id: String,
	/// Order this message refers to.
	pub order_id: String,
	/// Customer account the message is addressed to.
	pub customer_id: String,
	/// Who authored the message; always "admin" for dispatcher output.
	pub sender: String,
	/// Kind of message.
	pub message_type: MessageType,
	/// Templated plain-text body.
	pub body: String,
	/// Timestamp when the message was queued (Unix seconds).
	pub created_at: u64,
}

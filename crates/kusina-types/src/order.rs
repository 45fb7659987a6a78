//! Order domain types for the kusina admin service.
//!
//! This module defines the order record and its satellite types as they are
//! persisted and moved between components. Orders are created by the
//! storefront checkout (outside this service) and mutated here only through
//! validated status transitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// The happy path is linear: Pending → Preparing → Out for Delivery →
/// Delivered. Cancelled is reachable from any non-terminal status and is,
/// together with Delivered, terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
	/// Order received, awaiting kitchen acceptance (and COD review).
	Pending,
	/// Order accepted, kitchen is working on it.
	Preparing,
	/// Order handed to the rider.
	#[serde(rename = "Out for Delivery")]
	OutForDelivery,
	/// Order received by the customer. Terminal.
	Delivered,
	/// Order rejected or cancelled by the admin. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Integer ordering used to forbid backward progression.
	///
	/// Cancelled carries the highest rank but is exempt from the rank
	/// comparison: cancellation is a distinct path, not a forward step.
	pub fn rank(&self) -> u8 {
		match self {
			OrderStatus::Pending => 0,
			OrderStatus::Preparing => 1,
			OrderStatus::OutForDelivery => 2,
			OrderStatus::Delivered => 3,
			OrderStatus::Cancelled => 4,
		}
	}

	/// Returns true for statuses that accept no further forward transition.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}

	/// Returns the string representation used on the wire and in storage.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Preparing => "Preparing",
			OrderStatus::OutForDelivery => "Out for Delivery",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::Cancelled => "Cancelled",
		}
	}

	/// Returns an iterator over all OrderStatus variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Preparing,
			Self::OutForDelivery,
			Self::Delivered,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Pending" => Ok(Self::Pending),
			"Preparing" => Ok(Self::Preparing),
			"Out for Delivery" => Ok(Self::OutForDelivery),
			"Delivered" => Ok(Self::Delivered),
			"Cancelled" => Ok(Self::Cancelled),
			_ => Err(()),
		}
	}
}

/// Payment rail chosen at checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
	/// Cash on delivery. Requires manual location review before acceptance.
	#[serde(rename = "COD")]
	Cod,
	#[serde(rename = "GCash")]
	Gcash,
	#[serde(rename = "Maya")]
	Maya,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Cod => write!(f, "COD"),
			PaymentMethod::Gcash => write!(f, "GCash"),
			PaymentMethod::Maya => write!(f, "Maya"),
		}
	}
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryMode {
	Delivery,
	#[serde(rename = "Pick-up")]
	Pickup,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
	pub latitude: f64,
	pub longitude: f64,
}

/// A single line on an order.
///
/// Product details are snapshotted at checkout time; the product reference
/// may dangle once the catalog entry is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
	/// Unique identifier for this line item.
	pub id: String,
	/// Catalog reference, if the product still exists.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub product_id: Option<String>,
	/// Product name as it read at checkout time.
	pub name: String,
	/// Quantity ordered, at least 1.
	pub quantity: u32,
	/// Unit price at checkout time.
	pub price: Decimal,
	/// Line subtotal, quantity x price.
	pub subtotal: Decimal,
}

/// A customer order as persisted by the order store.
///
/// Customer name and phone are denormalized at creation time; `customer_id`
/// links back to an account when the order was not placed as a guest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Opaque unique identifier.
	pub id: String,
	/// Human-readable order number, unique per store.
	pub order_number: String,
	/// Customer account reference; None for guest orders.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_id: Option<String>,
	/// Customer name snapshot.
	pub customer_name: String,
	/// Customer phone snapshot.
	pub customer_phone: String,
	/// Payment rail chosen at checkout.
	pub payment_method: PaymentMethod,
	/// Free-text mirror of the payment rail's own state.
	pub payment_status: String,
	/// Delivery or pick-up.
	pub delivery_mode: DeliveryMode,
	/// Delivery address, when the mode is Delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_address: Option<String>,
	/// Pinned delivery location; absent when the customer did not pin one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_coordinates: Option<Coordinates>,
	/// Line items owned exclusively by this order.
	pub items: Vec<OrderItem>,
	/// Sum of line subtotals.
	pub subtotal: Decimal,
	/// Delivery fee charged on top of the subtotal.
	pub delivery_fee: Decimal,
	/// subtotal + delivery_fee. Never decreases after creation.
	pub total: Decimal,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Timestamp when this order was created (Unix seconds).
	pub created_at: u64,
	/// Timestamp when this order was last updated (Unix seconds).
	pub updated_at: u64,
	/// Free-text note left by the admin.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub admin_note: Option<String>,
	/// Reason recorded when the order was cancelled via rejection.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rejection_reason: Option<String>,
	/// Minutes from dispatch to hand-off, recorded on delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_time_minutes: Option<u32>,
	/// Customer-supplied rating, 1-5.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rating: Option<u8>,
	/// Customer-supplied rating note.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rating_note: Option<String>,
}

/// Partial update applied to an order through the state machine.
///
/// All fields are optional; an update carrying no fields is a caller error
/// (NoChange), not a silent no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
	/// Target status, when the caller requests a transition.
	pub status: Option<OrderStatus>,
	/// New admin note.
	pub admin_note: Option<String>,
	/// Reason for rejection; only meaningful with a Cancelled target.
	pub rejection_reason: Option<String>,
	/// Delivery duration in minutes. Fractions are floored, negatives
	/// clamp to zero, non-finite values are rejected.
	pub delivery_time_minutes: Option<f64>,
}

impl OrderUpdate {
	/// Returns true when the update carries no fields at all.
	pub fn is_empty(&self) -> bool {
		self.status.is_none()
			&& self.admin_note.is_none()
			&& self.rejection_reason.is_none()
			&& self.delivery_time_minutes.is_none()
	}
}

/// Server-side filter for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
	/// Only return orders in this status.
	pub status: Option<OrderStatus>,
	/// Case-insensitive match against order number or customer name.
	pub query: Option<String>,
}

impl OrderFilter {
	/// Returns true when the order passes this filter.
	pub fn matches(&self, order: &Order) -> bool {
		if let Some(status) = self.status {
			if order.status != status {
				return false;
			}
		}
		if let Some(query) = &self.query {
			let needle = query.to_lowercase();
			if !order.order_number.to_lowercase().contains(&needle)
				&& !order.customer_name.to_lowercase().contains(&needle)
			{
				return false;
			}
		}
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_rank_ordering() {
		assert!(OrderStatus::Pending.rank() < OrderStatus::Preparing.rank());
		assert!(OrderStatus::Preparing.rank() < OrderStatus::OutForDelivery.rank());
		assert!(OrderStatus::OutForDelivery.rank() < OrderStatus::Delivered.rank());
	}

	#[test]
	fn test_status_round_trip() {
		for status in OrderStatus::all() {
			assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
		}
		assert!("Refunded".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_terminal_statuses() {
		assert!(OrderStatus::Delivered.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(!OrderStatus::Pending.is_terminal());
		assert!(!OrderStatus::OutForDelivery.is_terminal());
	}

	#[test]
	fn test_status_serde_uses_wire_names() {
		let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
		assert_eq!(json, "\"Out for Delivery\"");
		let back: OrderStatus = serde_json::from_str(&json).unwrap();
		assert_eq!(back, OrderStatus::OutForDelivery);
	}

	#[test]
	fn test_empty_update() {
		assert!(OrderUpdate::default().is_empty());
		let update = OrderUpdate {
			admin_note: Some("call on arrival".into()),
			..Default::default()
		};
		assert!(!update.is_empty());
	}
}

//! Cash-on-delivery approval workflow.
//!
//! Pending COD orders get a human look at the delivery location before the
//! kitchen commits to them. The distance figure shown to the reviewer is
//! advisory only: a customer past the configured limit produces a warning,
//! never an automatic rejection. Orders without pinned coordinates are
//! reviewed without a distance figure.

use crate::distance::haversine_km;
use crate::transitions::DEFAULT_REJECTION_REASON;
use kusina_types::{Coordinates, Order, OrderStatus, OrderUpdate, PaymentMethod};

/// Default advisory delivery radius in kilometers.
pub const DEFAULT_MAX_DELIVERY_KM: f64 = 10.0;

/// Context assembled for the human reviewing a COD order.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalContext {
	/// Fixed business location.
	pub store: Coordinates,
	/// Store-to-customer distance; None when the customer did not pin a
	/// location.
	pub distance_km: Option<f64>,
	/// Advisory radius the distance is compared against.
	pub max_delivery_km: f64,
	/// True when the customer is farther out than the advisory radius.
	pub exceeds_limit: bool,
}

/// Returns true when the order needs manual review before acceptance.
///
/// Only Pending cash-on-delivery orders qualify; everything else may be
/// advanced to Preparing directly.
pub fn review_required(order: &Order) -> bool {
	order.status == OrderStatus::Pending && order.payment_method == PaymentMethod::Cod
}

/// Store-to-customer distance in kilometers, when coordinates are pinned.
pub fn distance_to(store: Coordinates, order: &Order) -> Option<f64> {
	order.delivery_coordinates.map(|point| {
		haversine_km(
			store.latitude,
			store.longitude,
			point.latitude,
			point.longitude,
		)
	})
}

/// Builds the review context for an order.
pub fn approval_context(store: Coordinates, max_delivery_km: f64, order: &Order) -> ApprovalContext {
	let distance_km = distance_to(store, order);
	ApprovalContext {
		store,
		distance_km,
		max_delivery_km,
		exceeds_limit: distance_km.is_some_and(|d| d > max_delivery_km),
	}
}

/// Update that accepts a reviewed order into the kitchen queue.
pub fn approve() -> OrderUpdate {
	OrderUpdate {
		status: Some(OrderStatus::Preparing),
		..Default::default()
	}
}

/// Update that rejects an order with the given reason.
///
/// A blank reason falls back to the default text rather than failing; the
/// review form already refuses to submit an empty input.
pub fn reject(reason: &str) -> OrderUpdate {
	let trimmed = reason.trim();
	let reason = if trimmed.is_empty() {
		DEFAULT_REJECTION_REASON
	} else {
		trimmed
	};
	OrderUpdate {
		status: Some(OrderStatus::Cancelled),
		rejection_reason: Some(reason.to_string()),
		..Default::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transitions::plan;
	use kusina_types::{DeliveryMode, Order};
	use rust_decimal::Decimal;

	const STORE: Coordinates = Coordinates {
		latitude: 14.5547,
		longitude: 121.0223,
	};

	fn cod_order(coordinates: Option<Coordinates>) -> Order {
		Order {
			id: "ord-9".to_string(),
			order_number: "A-1077".to_string(),
			customer_id: Some("cust-3".to_string()),
			customer_name: "Jo Reyes".to_string(),
			customer_phone: "09998887777".to_string(),
			payment_method: PaymentMethod::Cod,
			payment_status: "unpaid".to_string(),
			delivery_mode: DeliveryMode::Delivery,
			delivery_address: Some("Blk 4 Lot 9, Taguig".to_string()),
			delivery_coordinates: coordinates,
			items: vec![],
			subtotal: Decimal::from(300),
			delivery_fee: Decimal::from(60),
			total: Decimal::from(360),
			status: OrderStatus::Pending,
			created_at: 1_700_000_000,
			updated_at: 1_700_000_000,
			admin_note: None,
			rejection_reason: None,
			delivery_time_minutes: None,
			rating: None,
			rating_note: None,
		}
	}

	#[test]
	fn test_review_required_for_pending_cod_only() {
		let mut order = cod_order(None);
		assert!(review_required(&order));

		order.payment_method = PaymentMethod::Gcash;
		assert!(!review_required(&order));

		order.payment_method = PaymentMethod::Cod;
		order.status = OrderStatus::Preparing;
		assert!(!review_required(&order));
	}

	#[test]
	fn test_context_without_coordinates_has_no_distance() {
		let order = cod_order(None);
		let context = approval_context(STORE, DEFAULT_MAX_DELIVERY_KM, &order);
		assert_eq!(context.distance_km, None);
		assert!(!context.exceeds_limit);
	}

	#[test]
	fn test_same_point_is_zero_and_within_limit() {
		let order = cod_order(Some(STORE));
		let context = approval_context(STORE, DEFAULT_MAX_DELIVERY_KM, &order);
		assert_eq!(context.distance_km, Some(0.0));
		assert!(!context.exceeds_limit);
	}

	#[test]
	fn test_far_customer_sets_warning_but_approval_still_succeeds() {
		// Quezon City Memorial Circle, well past 10 km from the store.
		let order = cod_order(Some(Coordinates {
			latitude: 14.6760,
			longitude: 121.0437,
		}));
		let context = approval_context(STORE, DEFAULT_MAX_DELIVERY_KM, &order);
		assert!(context.distance_km.unwrap() > DEFAULT_MAX_DELIVERY_KM);
		assert!(context.exceeds_limit);
		assert!(review_required(&order));

		let transition = plan(&order, &approve(), 1_700_000_100).unwrap();
		assert_eq!(transition.order.status, OrderStatus::Preparing);
	}

	#[test]
	fn test_reject_with_blank_reason_uses_default() {
		let order = cod_order(None);
		let transition = plan(&order, &reject(""), 1_700_000_100).unwrap();
		assert_eq!(transition.order.status, OrderStatus::Cancelled);
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some(DEFAULT_REJECTION_REASON)
		);
	}

	#[test]
	fn test_reject_keeps_trimmed_reason() {
		let order = cod_order(None);
		let transition = plan(&order, &reject(" out of range "), 1_700_000_100).unwrap();
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some("out of range")
		);
	}
}

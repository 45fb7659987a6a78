//! Order status transition planning.
//!
//! `plan` is the single entry point: given the authoritative order record
//! and a requested update, it either returns the fully-updated copy of the
//! order (plus the status change, if any) or an error. The caller persists
//! the returned record as one write, so an update is applied completely or
//! not at all.

use crate::OrderError;
use kusina_types::{Order, OrderStatus, OrderUpdate};

/// Reason recorded when an order is cancelled without an explicit one.
pub const DEFAULT_REJECTION_REASON: &str = "Order rejected by admin";

/// A status movement produced by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
	pub from: OrderStatus,
	pub to: OrderStatus,
}

/// The outcome of planning an update against an order.
#[derive(Debug, Clone)]
pub struct Transition {
	/// The order with the update applied.
	pub order: Order,
	/// Present when the update moved the order to a new status.
	pub status_change: Option<StatusChange>,
}

/// Validates `update` against `order` and produces the updated record.
///
/// Rules, applied in order:
/// - an update carrying no fields is rejected as `NoChange`;
/// - a non-finite delivery time is rejected as `Validation`; fractional
///   minutes are floored and negatives clamp to zero;
/// - a non-Cancelled target ranking below the current status is rejected
///   as `InvalidTransition`. Cancelled is exempt from the rank comparison;
/// - moving to Cancelled always records a reason: the explicit rejection
///   reason, else the update's admin note, else the order's stored admin
///   note, else the default text;
/// - if, after all of the above, no field differs from the stored record,
///   the update is rejected as `NoChange`.
pub fn plan(order: &Order, update: &OrderUpdate, now: u64) -> Result<Transition, OrderError> {
	if update.is_empty() {
		return Err(OrderError::NoChange);
	}

	let delivery_time_minutes = match update.delivery_time_minutes {
		Some(minutes) if !minutes.is_finite() => {
			return Err(OrderError::Validation(
				"delivery time must be a finite number of minutes".to_string(),
			));
		},
		Some(minutes) => Some(minutes.max(0.0).floor() as u32),
		None => None,
	};

	if let Some(target) = update.status {
		if target != OrderStatus::Cancelled && target.rank() < order.status.rank() {
			return Err(OrderError::InvalidTransition {
				from: order.status,
				to: target,
			});
		}
	}

	let mut next = order.clone();
	let mut changed = false;

	if let Some(target) = update.status {
		if next.status != target {
			next.status = target;
			changed = true;
		}
	}
	if let Some(note) = &update.admin_note {
		if next.admin_note.as_deref() != Some(note.as_str()) {
			next.admin_note = Some(note.clone());
			changed = true;
		}
	}
	if let Some(reason) = &update.rejection_reason {
		let trimmed = reason.trim();
		if !trimmed.is_empty() && next.rejection_reason.as_deref() != Some(trimmed) {
			next.rejection_reason = Some(trimmed.to_string());
			changed = true;
		}
	}
	if let Some(minutes) = delivery_time_minutes {
		if next.delivery_time_minutes != Some(minutes) {
			next.delivery_time_minutes = Some(minutes);
			changed = true;
		}
	}

	// A newly cancelled order always carries a reason.
	if update.status == Some(OrderStatus::Cancelled)
		&& order.status != OrderStatus::Cancelled
		&& next.rejection_reason.is_none()
	{
		let fallback = [update.admin_note.as_deref(), order.admin_note.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.find(|note| !note.is_empty())
			.unwrap_or(DEFAULT_REJECTION_REASON);
		next.rejection_reason = Some(fallback.to_string());
		changed = true;
	}

	if !changed {
		return Err(OrderError::NoChange);
	}

	next.updated_at = now;

	let status_change = (order.status != next.status).then_some(StatusChange {
		from: order.status,
		to: next.status,
	});

	Ok(Transition {
		order: next,
		status_change,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use kusina_types::{DeliveryMode, PaymentMethod};
	use rust_decimal::Decimal;

	fn order_with_status(status: OrderStatus) -> Order {
		Order {
			id: "ord-1".to_string(),
			order_number: "A-1042".to_string(),
			customer_id: Some("cust-7".to_string()),
			customer_name: "Maria Santos".to_string(),
			customer_phone: "09171234567".to_string(),
			payment_method: PaymentMethod::Cod,
			payment_status: "unpaid".to_string(),
			delivery_mode: DeliveryMode::Delivery,
			delivery_address: Some("12 Kalayaan Ave".to_string()),
			delivery_coordinates: None,
			items: vec![],
			subtotal: Decimal::from(450),
			delivery_fee: Decimal::from(50),
			total: Decimal::from(500),
			status,
			created_at: 1_700_000_000,
			updated_at: 1_700_000_000,
			admin_note: None,
			rejection_reason: None,
			delivery_time_minutes: None,
			rating: None,
			rating_note: None,
		}
	}

	fn status_update(target: OrderStatus) -> OrderUpdate {
		OrderUpdate {
			status: Some(target),
			..Default::default()
		}
	}

	const NOW: u64 = 1_700_000_100;

	#[test]
	fn test_forward_transition_succeeds() {
		let order = order_with_status(OrderStatus::Pending);
		let transition = plan(&order, &status_update(OrderStatus::Preparing), NOW).unwrap();
		assert_eq!(transition.order.status, OrderStatus::Preparing);
		assert_eq!(
			transition.status_change,
			Some(StatusChange {
				from: OrderStatus::Pending,
				to: OrderStatus::Preparing,
			})
		);
		assert_eq!(transition.order.updated_at, NOW);
	}

	#[test]
	fn test_backward_transition_fails_and_leaves_order_untouched() {
		let order = order_with_status(OrderStatus::Preparing);
		let result = plan(&order, &status_update(OrderStatus::Pending), NOW);
		assert_eq!(
			result.unwrap_err(),
			OrderError::InvalidTransition {
				from: OrderStatus::Preparing,
				to: OrderStatus::Pending,
			}
		);
		assert_eq!(order.status, OrderStatus::Preparing);
	}

	#[test]
	fn test_skipping_forward_is_allowed() {
		// Pending straight to Delivered is a forward move; the rank rule
		// only forbids going backwards.
		let order = order_with_status(OrderStatus::Pending);
		let transition = plan(&order, &status_update(OrderStatus::Delivered), NOW).unwrap();
		assert_eq!(transition.order.status, OrderStatus::Delivered);
	}

	#[test]
	fn test_cancelled_is_reachable_from_every_status() {
		for status in OrderStatus::all() {
			if status == OrderStatus::Cancelled {
				continue;
			}
			let order = order_with_status(status);
			let transition = plan(&order, &status_update(OrderStatus::Cancelled), NOW)
				.unwrap_or_else(|e| panic!("cancel from {} failed: {}", status, e));
			assert_eq!(transition.order.status, OrderStatus::Cancelled);
			assert!(transition.order.rejection_reason.is_some());
		}
	}

	#[test]
	fn test_cancel_records_default_reason() {
		let order = order_with_status(OrderStatus::Pending);
		let transition = plan(&order, &status_update(OrderStatus::Cancelled), NOW).unwrap();
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some(DEFAULT_REJECTION_REASON)
		);
	}

	#[test]
	fn test_cancel_falls_back_to_admin_note() {
		let mut order = order_with_status(OrderStatus::Pending);
		order.admin_note = Some("rider unavailable today".to_string());
		let transition = plan(&order, &status_update(OrderStatus::Cancelled), NOW).unwrap();
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some("rider unavailable today")
		);
	}

	#[test]
	fn test_cancel_prefers_explicit_reason() {
		let mut order = order_with_status(OrderStatus::Pending);
		order.admin_note = Some("note".to_string());
		let update = OrderUpdate {
			status: Some(OrderStatus::Cancelled),
			rejection_reason: Some("  out of delivery range  ".to_string()),
			..Default::default()
		};
		let transition = plan(&order, &update, NOW).unwrap();
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some("out of delivery range")
		);
	}

	#[test]
	fn test_blank_rejection_reason_falls_back_to_default() {
		let order = order_with_status(OrderStatus::Pending);
		let update = OrderUpdate {
			status: Some(OrderStatus::Cancelled),
			rejection_reason: Some("   ".to_string()),
			..Default::default()
		};
		let transition = plan(&order, &update, NOW).unwrap();
		assert_eq!(
			transition.order.rejection_reason.as_deref(),
			Some(DEFAULT_REJECTION_REASON)
		);
	}

	#[test]
	fn test_terminal_statuses_reject_repeat_as_no_change() {
		for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
			let mut order = order_with_status(status);
			if status == OrderStatus::Cancelled {
				order.rejection_reason = Some(DEFAULT_REJECTION_REASON.to_string());
			}
			assert_eq!(
				plan(&order, &status_update(status), NOW).unwrap_err(),
				OrderError::NoChange
			);
		}
	}

	#[test]
	fn test_cancelled_accepts_no_forward_target() {
		let order = order_with_status(OrderStatus::Cancelled);
		for target in [
			OrderStatus::Pending,
			OrderStatus::Preparing,
			OrderStatus::OutForDelivery,
			OrderStatus::Delivered,
		] {
			assert!(matches!(
				plan(&order, &status_update(target), NOW),
				Err(OrderError::InvalidTransition { .. })
			));
		}
	}

	#[test]
	fn test_empty_update_is_rejected() {
		let order = order_with_status(OrderStatus::Pending);
		assert_eq!(
			plan(&order, &OrderUpdate::default(), NOW).unwrap_err(),
			OrderError::NoChange
		);
	}

	#[test]
	fn test_identical_fields_are_rejected_as_no_change() {
		let mut order = order_with_status(OrderStatus::Preparing);
		order.admin_note = Some("pack utensils".to_string());
		let update = OrderUpdate {
			status: Some(OrderStatus::Preparing),
			admin_note: Some("pack utensils".to_string()),
			..Default::default()
		};
		assert_eq!(plan(&order, &update, NOW).unwrap_err(), OrderError::NoChange);
	}

	#[test]
	fn test_note_only_update_keeps_status() {
		let order = order_with_status(OrderStatus::OutForDelivery);
		let update = OrderUpdate {
			admin_note: Some("gate code 4417".to_string()),
			..Default::default()
		};
		let transition = plan(&order, &update, NOW).unwrap();
		assert_eq!(transition.order.status, OrderStatus::OutForDelivery);
		assert!(transition.status_change.is_none());
		assert_eq!(
			transition.order.admin_note.as_deref(),
			Some("gate code 4417")
		);
	}

	#[test]
	fn test_delivery_time_is_floored() {
		let order = order_with_status(OrderStatus::OutForDelivery);
		let update = OrderUpdate {
			status: Some(OrderStatus::Delivered),
			delivery_time_minutes: Some(42.9),
			..Default::default()
		};
		let transition = plan(&order, &update, NOW).unwrap();
		assert_eq!(transition.order.delivery_time_minutes, Some(42));
	}

	#[test]
	fn test_negative_delivery_time_clamps_to_zero() {
		let order = order_with_status(OrderStatus::OutForDelivery);
		let update = OrderUpdate {
			status: Some(OrderStatus::Delivered),
			delivery_time_minutes: Some(-5.0),
			..Default::default()
		};
		let transition = plan(&order, &update, NOW).unwrap();
		assert_eq!(transition.order.delivery_time_minutes, Some(0));
	}

	#[test]
	fn test_non_finite_delivery_time_is_rejected() {
		let order = order_with_status(OrderStatus::OutForDelivery);
		for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
			let update = OrderUpdate {
				status: Some(OrderStatus::Delivered),
				delivery_time_minutes: Some(bad),
				..Default::default()
			};
			assert!(matches!(
				plan(&order, &update, NOW),
				Err(OrderError::Validation(_))
			));
		}
	}
}

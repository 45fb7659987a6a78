//! Plain-text message templates.
//!
//! Wording here is presentation, not contract; the load-bearing part is
//! which transitions produce which message types (see the dispatcher).

/// Delivery receipt referencing the order number and, when known, the
/// delivery time.
pub fn receipt(
	store_name: &str,
	customer_name: &str,
	order_number: &str,
	delivery_time_minutes: Option<u32>,
) -> String {
	let mut lines = vec![
		format!("Hi {},", customer_name),
		format!("Your order #{} has been delivered.", order_number),
	];
	if let Some(minutes) = delivery_time_minutes {
		lines.push(format!("Delivery time: {} minutes", minutes));
	}
	lines.push(format!("Thank you for supporting {}.", store_name));
	lines.join("\n")
}

/// Prompt asking the customer to rate a delivered order.
pub fn rating_prompt(order_number: &str) -> String {
	format!(
		"How was your order #{}? We'd love your feedback.",
		order_number
	)
}

/// Cancellation notice carrying the recorded rejection reason.
pub fn cancellation(store_name: &str, order_number: &str, reason: &str) -> String {
	[
		format!(
			"We're sorry, your order #{} could not be accepted.",
			order_number
		),
		String::new(),
		format!("Reason: {}", reason),
		String::new(),
		format!("Please contact us if you have questions. - {}", store_name),
	]
	.join("\n")
}

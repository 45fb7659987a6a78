//! API types for the kusina admin HTTP API.
//!
//! This module defines the request and response types for the admin
//! endpoints. Field names mirror the storefront dashboard's camelCase
//! payloads so the record shape stays stable regardless of transport.

use crate::{Coordinates, DeliveryMode, Order, OrderItem, OrderStatus, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine-readable error code, e.g. "INVALID_TRANSITION".
	pub error: String,
	/// Human-readable failure message, displayed verbatim by the UI.
	pub message: String,
}

/// Body of a PATCH /orders/{id} request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
	/// Target status as its wire string, e.g. "Out for Delivery".
	pub status: Option<String>,
	pub admin_note: Option<String>,
	pub rejection_reason: Option<String>,
	pub delivery_time_minutes: Option<f64>,
}

/// Body of a POST /orders/{id}/reject request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RejectOrderRequest {
	/// Reason shown to the customer; blank falls back to the default text.
	#[serde(default)]
	pub reason: String,
}

/// One line item in an order response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
	pub id: String,
	pub product_id: Option<String>,
	pub name: String,
	pub qty: u32,
	pub price: Decimal,
	pub subtotal: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
	fn from(item: OrderItem) -> Self {
		Self {
			id: item.id,
			product_id: item.product_id,
			name: item.name,
			qty: item.quantity,
			price: item.price,
			subtotal: item.subtotal,
		}
	}
}

/// Order record as returned by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
	pub id: String,
	pub order_number: String,
	pub user_id: Option<String>,
	pub customer_name: String,
	pub customer_phone: String,
	pub payment_method: PaymentMethod,
	pub payment_status: String,
	pub delivery_mode: DeliveryMode,
	pub delivery_address: Option<String>,
	pub delivery_lat: Option<f64>,
	pub delivery_lng: Option<f64>,
	pub subtotal: Decimal,
	pub delivery_fee: Decimal,
	pub total: Decimal,
	pub status: OrderStatus,
	pub created_at: u64,
	pub updated_at: u64,
	pub admin_note: Option<String>,
	pub rejection_reason: Option<String>,
	pub delivery_time_minutes: Option<u32>,
	pub rating: Option<u8>,
	pub rating_note: Option<String>,
	pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
	fn from(order: Order) -> Self {
		Self {
			id: order.id,
			order_number: order.order_number,
			user_id: order.customer_id,
			customer_name: order.customer_name,
			customer_phone: order.customer_phone,
			payment_method: order.payment_method,
			payment_status: order.payment_status,
			delivery_mode: order.delivery_mode,
			delivery_address: order.delivery_address,
			delivery_lat: order.delivery_coordinates.map(|c| c.latitude),
			delivery_lng: order.delivery_coordinates.map(|c| c.longitude),
			subtotal: order.subtotal,
			delivery_fee: order.delivery_fee,
			total: order.total,
			status: order.status,
			created_at: order.created_at,
			updated_at: order.updated_at,
			admin_note: order.admin_note,
			rejection_reason: order.rejection_reason,
			delivery_time_minutes: order.delivery_time_minutes,
			rating: order.rating,
			rating_note: order.rating_note,
			items: order.items.into_iter().map(Into::into).collect(),
		}
	}
}

/// Response body for GET /orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOrdersResponse {
	pub orders: Vec<OrderResponse>,
}

/// Response body for GET /orders/{id}/review.
///
/// Carries the COD review context shown to the admin before approval. The
/// distance figure is advisory: `exceeds_max_distance` surfaces a warning
/// but never blocks the approve action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
	pub order_id: String,
	pub order_number: String,
	pub review_required: bool,
	pub store: Coordinates,
	pub distance_km: Option<f64>,
	pub max_delivery_km: f64,
	pub exceeds_max_distance: bool,
}

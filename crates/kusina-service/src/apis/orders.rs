//! Order administration endpoints.
//!
//! This module implements the order endpoints of the admin API: listing,
//! fetching, status updates, and the COD review shortcuts. Every handler
//! verifies the caller's admin session before touching the engine; the
//! failure message of a rejected operation is returned verbatim for the
//! dashboard to display.

use axum::{
	extract::{Path, Query, State},
	http::{header, HeaderMap, StatusCode},
	response::Json,
};
use kusina_auth::AdminSession;
use kusina_core::EngineError;
use kusina_order::OrderError;
use kusina_types::{
	ErrorResponse, ListOrdersResponse, OrderFilter, OrderResponse, OrderStatus, OrderUpdate,
	RejectOrderRequest, ReviewResponse, UpdateOrderRequest,
};
use serde::Deserialize;

use crate::server::AppState;

/// Error shape returned by every handler in this module.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps an engine failure onto an HTTP status and error code.
fn into_api_error(e: EngineError) -> ApiError {
	let (status_code, error_code) = match &e {
		EngineError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
		EngineError::NotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
		EngineError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "INVALID_STATUS"),
		EngineError::Order(OrderError::InvalidTransition { .. }) => {
			(StatusCode::BAD_REQUEST, "INVALID_TRANSITION")
		},
		EngineError::Order(OrderError::Validation(_)) => {
			(StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
		},
		EngineError::Order(OrderError::NoChange) => (StatusCode::BAD_REQUEST, "NO_CHANGES"),
		EngineError::Config(_) | EngineError::Storage(_) => {
			(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
		},
	};

	(
		status_code,
		Json(ErrorResponse {
			error: error_code.to_string(),
			message: e.to_string(),
		}),
	)
}

/// Pulls the admin token from the Authorization header or session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
	if let Some(value) = headers
		.get(header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
	{
		if let Some(token) = value.strip_prefix("Bearer ") {
			return Some(token.trim().to_string());
		}
	}

	headers
		.get(header::COOKIE)
		.and_then(|v| v.to_str().ok())
		.and_then(|cookies| {
			cookies
				.split(';')
				.map(str::trim)
				.find_map(|cookie| cookie.strip_prefix("admin_session="))
				.map(str::to_string)
		})
}

/// Verifies the caller before any engine operation runs.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<AdminSession, ApiError> {
	let token = session_token(headers).ok_or_else(|| into_api_error(EngineError::Unauthorized))?;
	state.engine.authorize(&token).await.map_err(into_api_error)
}

/// Query parameters for GET /orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
	/// Only return orders in this status.
	pub status: Option<String>,
	/// Free-text match against order number or customer name.
	pub q: Option<String>,
}

/// Handles GET /api/orders requests.
///
/// Returns orders newest first, optionally filtered by status and a
/// free-text query.
pub async fn list_orders(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let status = parse_status(query.status.as_deref())?;
	let filter = OrderFilter {
		status,
		query: query.q,
	};

	let orders = state
		.engine
		.list_orders(&session, Some(&filter))
		.await
		.map_err(into_api_error)?;

	Ok(Json(ListOrdersResponse {
		orders: orders.into_iter().map(OrderResponse::from).collect(),
	}))
}

/// Handles GET /api/orders/{id} requests.
pub async fn get_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let order = state
		.engine
		.get_order(&session, &id)
		.await
		.map_err(into_api_error)?;
	Ok(Json(order.into()))
}

/// Handles PATCH /api/orders/{id} requests.
///
/// Applies a status transition and/or field updates through the order
/// state machine. On success, the response reflects the committed record.
pub async fn update_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
	Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let update = OrderUpdate {
		status: parse_status(request.status.as_deref())?,
		admin_note: request.admin_note,
		rejection_reason: request.rejection_reason,
		delivery_time_minutes: request.delivery_time_minutes,
	};

	let order = state
		.engine
		.transition_order(&session, &id, update)
		.await
		.map_err(into_api_error)?;
	Ok(Json(order.into()))
}

/// Handles GET /api/orders/{id}/review requests.
///
/// Returns the COD review context: whether review is needed, the store
/// location, and the advisory distance figure.
pub async fn review_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<ReviewResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let review = state
		.engine
		.review_order(&session, &id)
		.await
		.map_err(into_api_error)?;

	Ok(Json(ReviewResponse {
		order_id: review.order.id,
		order_number: review.order.order_number,
		review_required: review.review_required,
		store: review.context.store,
		distance_km: review.context.distance_km,
		max_delivery_km: review.context.max_delivery_km,
		exceeds_max_distance: review.context.exceeds_limit,
	}))
}

/// Handles POST /api/orders/{id}/approve requests.
pub async fn approve_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let order = state
		.engine
		.approve_order(&session, &id)
		.await
		.map_err(into_api_error)?;
	Ok(Json(order.into()))
}

/// Handles POST /api/orders/{id}/reject requests.
pub async fn reject_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
	Json(request): Json<RejectOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
	let session = authorize(&state, &headers).await?;

	let order = state
		.engine
		.reject_order(&session, &id, &request.reason)
		.await
		.map_err(into_api_error)?;
	Ok(Json(order.into()))
}

/// Parses an optional status string, rejecting unknown values.
fn parse_status(status: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
	match status {
		Some(s) => s
			.parse::<OrderStatus>()
			.map(Some)
			.map_err(|_| into_api_error(EngineError::InvalidStatus(s.to_string()))),
		None => Ok(None),
	}
}

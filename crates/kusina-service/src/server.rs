//! HTTP server for the kusina admin API.
//!
//! This module provides a minimal HTTP server infrastructure for the admin
//! API: routing, shared state, and CORS. Handlers live in the `apis`
//! modules.

use axum::{
	routing::{get, post},
	Router,
};
use kusina_config::ApiConfig;
use kusina_core::AdminEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::orders;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the admin engine for processing requests.
	pub engine: Arc<AdminEngine>,
}

/// Builds the API router with all order administration routes.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", get(orders::list_orders))
				.route(
					"/orders/{id}",
					get(orders::get_order).patch(orders::update_order),
				)
				.route("/orders/{id}/review", get(orders::review_order))
				.route("/orders/{id}/approve", post(orders::approve_order))
				.route("/orders/{id}/reject", post(orders::reject_order)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the admin API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling, then serves until the process stops.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<AdminEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Admin API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

//! Core engine for the kusina admin service.
//!
//! This module provides the main orchestration logic for order
//! administration, coordinating the storage, auth, order-rule, and
//! notification services to execute the complete order lifecycle: a caller
//! requests a transition, the state machine validates it against the
//! freshly-read order, the store is updated as one write, and only then do
//! events and customer notifications go out. It also includes the factory
//! pattern for building engine instances from configuration.

use crate::event_bus::EventBus;
use dashmap::DashMap;
use kusina_auth::{AdminSession, AuthFactory, AuthService};
use kusina_config::Config;
use kusina_notify::{MessagingFactory, NotificationService};
use kusina_order::{approval, transitions, ApprovalContext, OrderError};
use kusina_storage::{StorageError, StorageFactory, StorageService};
use kusina_types::{
	AdminEvent, Coordinates, Order, OrderEvent, OrderFilter, OrderUpdate, StorageKey,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::Mutex;

pub mod event_bus;

/// Utility function to truncate an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Current time as Unix seconds.
fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

/// Errors surfaced by engine operations.
///
/// Every variant except `Config` maps onto one failure the admin UI can
/// display verbatim; none of them leaves an order partially mutated.
/// Notification failures never appear here: once the status write has
/// committed, messaging problems are logged and published as events only.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The caller does not hold a valid admin session.
	#[error("Unauthorized")]
	Unauthorized,
	/// No order exists under the given id.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The requested target status is not one of the supported statuses.
	#[error("Invalid status: {0}")]
	InvalidStatus(String),
	/// The update was rejected by the order state machine.
	#[error(transparent)]
	Order(#[from] OrderError),
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error from the storage backend.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// COD review context for one order, as assembled by `review_order`.
#[derive(Debug, Clone)]
pub struct OrderReview {
	/// The order under review.
	pub order: Order,
	/// True when the order is a Pending COD order awaiting manual review.
	pub review_required: bool,
	/// Store location, distance figure and advisory warning flag.
	pub context: ApprovalContext,
}

/// Main engine that orchestrates order administration.
///
/// The AdminEngine coordinates between multiple services:
/// - Auth: verifies the caller is an authenticated admin
/// - Storage: persists order state, the single source of truth
/// - Order rules: validates and plans status transitions
/// - Notifications: emits customer messages on terminal transitions
pub struct AdminEngine {
	/// Service configuration.
	config: Config,
	/// Storage service for persisting orders.
	storage: Arc<StorageService>,
	/// Auth service for admin session checks.
	auth: Arc<AuthService>,
	/// Notification service for customer messages.
	notifier: Arc<NotificationService>,
	/// Event bus for order-changed subscriptions.
	event_bus: EventBus,
	/// Per-order write locks serializing read-modify-write cycles.
	order_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AdminEngine {
	/// Creates a new AdminEngine from already-constructed services.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		auth: Arc<AuthService>,
		notifier: Arc<NotificationService>,
	) -> Self {
		Self {
			config,
			storage,
			auth,
			notifier,
			event_bus: EventBus::new(1000),
			order_locks: DashMap::new(),
		}
	}

	/// Verifies a bearer token and returns the admin session.
	///
	/// Every mutating operation requires the session this returns; a
	/// failed check refuses the operation without touching the store.
	pub async fn authorize(&self, token: &str) -> Result<AdminSession, EngineError> {
		self.auth.verify(token).await.map_err(|e| {
			tracing::debug!(error = %e, "Session verification failed");
			EngineError::Unauthorized
		})
	}

	/// Lists orders, newest first, optionally filtered by status and a
	/// free-text query over order number and customer name.
	pub async fn list_orders(
		&self,
		_session: &AdminSession,
		filter: Option<&OrderFilter>,
	) -> Result<Vec<Order>, EngineError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;

		if let Some(filter) = filter {
			orders.retain(|order| filter.matches(order));
		}

		orders.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.order_number.cmp(&a.order_number))
		});
		Ok(orders)
	}

	/// Fetches a single order by id.
	pub async fn get_order(
		&self,
		_session: &AdminSession,
		order_id: &str,
	) -> Result<Order, EngineError> {
		self.fetch_order(order_id).await
	}

	/// Applies a validated update to an order.
	///
	/// The read-validate-write cycle runs under a per-order lock so
	/// concurrent requests against the same order are evaluated against
	/// committed state, never against stale reads; requests for different
	/// orders do not contend. Events and customer notifications go out
	/// only after the write commits, outside the critical section.
	pub async fn transition_order(
		&self,
		session: &AdminSession,
		order_id: &str,
		update: OrderUpdate,
	) -> Result<Order, EngineError> {
		let transition = {
			let lock = self.order_lock(order_id);
			let _guard = lock.lock().await;

			let order = self.fetch_order(order_id).await?;
			let transition = transitions::plan(&order, &update, unix_now())?;
			self.storage
				.update(StorageKey::Orders, order_id, &transition.order)
				.await
				.map_err(|e| EngineError::Storage(e.to_string()))?;
			transition
		};

		match transition.status_change {
			Some(change) => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					admin = %session.admin_name,
					from = %change.from,
					to = %change.to,
					"Order status updated"
				);
				self.event_bus
					.publish(AdminEvent::Order(OrderEvent::StatusChanged {
						order_id: transition.order.id.clone(),
						order_number: transition.order.order_number.clone(),
						from: change.from,
						to: change.to,
					}))
					.ok();

				// Terminal statuses owe the customer a message.
				if transition.order.status.is_terminal() {
					for event in self.notifier.dispatch_status_change(&transition.order).await {
						self.event_bus.publish(AdminEvent::Notification(event)).ok();
					}
				}
			},
			None => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					admin = %session.admin_name,
					"Order fields updated"
				);
				self.event_bus
					.publish(AdminEvent::Order(OrderEvent::Updated {
						order_id: transition.order.id.clone(),
					}))
					.ok();
			},
		}

		Ok(transition.order)
	}

	/// Accepts a reviewed order into the kitchen queue.
	///
	/// Shorthand for a transition to Preparing; no extra side effects.
	pub async fn approve_order(
		&self,
		session: &AdminSession,
		order_id: &str,
	) -> Result<Order, EngineError> {
		self.transition_order(session, order_id, approval::approve())
			.await
	}

	/// Rejects an order with the given reason.
	///
	/// Shorthand for a transition to Cancelled; a blank reason falls back
	/// to the default rejection text.
	pub async fn reject_order(
		&self,
		session: &AdminSession,
		order_id: &str,
		reason: &str,
	) -> Result<Order, EngineError> {
		self.transition_order(session, order_id, approval::reject(reason))
			.await
	}

	/// Assembles the COD review context for an order.
	pub async fn review_order(
		&self,
		_session: &AdminSession,
		order_id: &str,
	) -> Result<OrderReview, EngineError> {
		let order = self.fetch_order(order_id).await?;
		let context = approval::approval_context(
			self.store_coordinates(),
			self.config.store.max_delivery_km,
			&order,
		);
		Ok(OrderReview {
			review_required: approval::review_required(&order),
			order,
			context,
		})
	}

	/// Store-to-customer distance in kilometers, when the order has
	/// pinned coordinates.
	pub fn estimate_distance(&self, order: &Order) -> Option<f64> {
		approval::distance_to(self.store_coordinates(), order)
	}

	/// Returns the configured store location.
	pub fn store_coordinates(&self) -> Coordinates {
		Coordinates {
			latitude: self.config.store.latitude,
			longitude: self.config.store.longitude,
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Reads an order, mapping a missing record to NotFound.
	async fn fetch_order(&self, order_id: &str) -> Result<Order, EngineError> {
		match self.storage.retrieve(StorageKey::Orders, order_id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => Err(EngineError::NotFound(order_id.to_string())),
			Err(e) => Err(EngineError::Storage(e.to_string())),
		}
	}

	/// Returns the write lock for one order, creating it on first use.
	fn order_lock(&self, order_id: &str) -> Arc<Mutex<()>> {
		self.order_locks
			.entry(order_id.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}
}

/// Factories for the pluggable implementations the engine is built from.
///
/// Each map goes from the implementation name used in configuration to the
/// factory that constructs it. The service binary wires these up with the
/// implementations it compiles in.
pub struct EngineFactories {
	pub storage_factories: HashMap<String, StorageFactory>,
	pub auth_factories: HashMap<String, AuthFactory>,
	pub messaging_factories: HashMap<String, MessagingFactory>,
}

/// Builder for constructing an AdminEngine with pluggable implementations.
///
/// The builder resolves each section's primary implementation through the
/// provided factories, validates its sub-configuration against the
/// implementation's schema, and wires up the services.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new EngineBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the AdminEngine using the configured factories.
	pub fn build(self, factories: EngineFactories) -> Result<AdminEngine, EngineError> {
		// Create storage backend
		let storage_name = self.config.storage.primary.clone();
		let storage_config = implementation_config(&self.config.storage.implementations, &storage_name);
		let storage_factory = factories.storage_factories.get(&storage_name).ok_or_else(|| {
			EngineError::Config(format!("Unknown storage implementation '{}'", storage_name))
		})?;
		let storage_backend = storage_factory(&storage_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create storage backend '{}': {}",
				storage_name, e
			))
		})?;
		storage_backend
			.config_schema()
			.validate(&storage_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for storage backend '{}': {}",
					storage_name, e
				))
			})?;
		let storage = Arc::new(StorageService::new(storage_backend));
		tracing::info!(component = "storage", implementation = %storage_name, "Loaded");

		// Create auth backend
		let auth_name = self.config.auth.primary.clone();
		let auth_config = implementation_config(&self.config.auth.implementations, &auth_name);
		let auth_factory = factories.auth_factories.get(&auth_name).ok_or_else(|| {
			EngineError::Config(format!("Unknown auth implementation '{}'", auth_name))
		})?;
		let auth_backend = auth_factory(&auth_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create auth backend '{}': {}",
				auth_name, e
			))
		})?;
		auth_backend
			.config_schema()
			.validate(&auth_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for auth backend '{}': {}",
					auth_name, e
				))
			})?;
		let auth = Arc::new(AuthService::new(auth_backend));
		tracing::info!(component = "auth", implementation = %auth_name, "Loaded");

		// Create messaging backend
		let messaging_name = self.config.messaging.primary.clone();
		let messaging_config =
			implementation_config(&self.config.messaging.implementations, &messaging_name);
		let messaging_factory = factories
			.messaging_factories
			.get(&messaging_name)
			.ok_or_else(|| {
				EngineError::Config(format!(
					"Unknown messaging implementation '{}'",
					messaging_name
				))
			})?;
		let messaging_backend = messaging_factory(&messaging_config).map_err(|e| {
			EngineError::Config(format!(
				"Failed to create messaging backend '{}': {}",
				messaging_name, e
			))
		})?;
		messaging_backend
			.config_schema()
			.validate(&messaging_config)
			.map_err(|e| {
				EngineError::Config(format!(
					"Invalid configuration for messaging backend '{}': {}",
					messaging_name, e
				))
			})?;
		let notifier = Arc::new(NotificationService::new(
			messaging_backend,
			self.config.store.name.clone(),
		));
		tracing::info!(component = "messaging", implementation = %messaging_name, "Loaded");

		Ok(AdminEngine::new(self.config, storage, auth, notifier))
	}
}

/// Looks up an implementation's sub-config, defaulting to an empty table.
fn implementation_config(
	implementations: &HashMap<String, toml::Value>,
	name: &str,
) -> toml::Value {
	implementations
		.get(name)
		.cloned()
		.unwrap_or(toml::Value::Table(toml::map::Map::new()))
}

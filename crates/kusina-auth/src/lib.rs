//! Admin session verification for the kusina admin service.
//!
//! This module provides abstractions for checking that a caller is an
//! authenticated admin before any order mutation is attempted. It defines
//! the session interface and a service wrapper; the engine refuses
//! operations with an unauthorized error when verification fails, without
//! touching the store.

use async_trait::async_trait;
use kusina_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod static_tokens;
}

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Error that occurs when a session token is unknown or expired.
	#[error("Invalid or expired session")]
	InvalidSession,
	/// Error that occurs when interacting with the auth implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// An authenticated admin identity.
///
/// Possession of this value is the proof of authentication the engine
/// requires before mutating orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
	/// Display name of the authenticated admin.
	pub admin_name: String,
}

/// Trait defining the interface for session verification implementations.
///
/// This trait must be implemented by any auth backend that wants to
/// integrate with the admin service, whether it checks a static token list
/// or a session table in an external store.
#[async_trait]
pub trait SessionInterface: Send + Sync {
	/// Returns the configuration schema for this auth implementation.
	///
	/// The schema is used to validate TOML configuration before
	/// initializing the implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Verifies a bearer token and returns the admin it belongs to.
	async fn verify(&self, token: &str) -> Result<AdminSession, AuthError>;
}

/// Type alias for auth factory functions.
///
/// This is the function signature that all auth implementations must
/// provide to create instances of their session interface.
pub type AuthFactory = fn(&toml::Value) -> Result<Box<dyn SessionInterface>, AuthError>;

/// Registry trait for auth implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// auth implementations must provide an AuthFactory.
pub trait AuthRegistry: ImplementationRegistry<Factory = AuthFactory> {}

/// Get all registered auth implementations.
///
/// Returns a vector of (name, factory) tuples for all available auth
/// implementations. This is used by the engine builder to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AuthFactory)> {
	use implementations::static_tokens;

	vec![(static_tokens::Registry::NAME, static_tokens::Registry::factory())]
}

/// Service that manages admin session verification.
///
/// This struct provides a high-level interface for session checks,
/// wrapping an underlying auth implementation.
pub struct AuthService {
	/// The underlying auth implementation.
	implementation: Box<dyn SessionInterface>,
}

impl AuthService {
	/// Creates a new AuthService with the specified implementation.
	pub fn new(implementation: Box<dyn SessionInterface>) -> Self {
		Self { implementation }
	}

	/// Verifies a bearer token and returns the admin session.
	///
	/// This method delegates to the underlying implementation's verify
	/// method.
	pub async fn verify(&self, token: &str) -> Result<AdminSession, AuthError> {
		self.implementation.verify(token).await
	}
}

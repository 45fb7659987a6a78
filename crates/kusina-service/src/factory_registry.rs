//! Dynamic factory registry for service implementations.
//!
//! This module provides a centralized registry for all factory functions,
//! allowing dynamic instantiation of implementations based on
//! configuration.

use kusina_auth::AuthFactory;
use kusina_config::Config;
use kusina_core::{AdminEngine, EngineBuilder, EngineFactories};
use kusina_notify::MessagingFactory;
use kusina_storage::StorageFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
	pub auth: HashMap<String, AuthFactory>,
	pub messaging: HashMap<String, MessagingFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			storage: HashMap::new(),
			auth: HashMap::new(),
			messaging: HashMap::new(),
		}
	}

	/// Register a storage implementation
	pub fn register_storage(&mut self, name: impl Into<String>, factory: StorageFactory) {
		self.storage.insert(name.into(), factory);
	}

	/// Register an auth implementation
	pub fn register_auth(&mut self, name: impl Into<String>, factory: AuthFactory) {
		self.auth.insert(name.into(), factory);
	}

	/// Register a messaging implementation
	pub fn register_messaging(&mut self, name: impl Into<String>, factory: MessagingFactory) {
		self.messaging.insert(name.into(), factory);
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

// Global registry instance
static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Initialize the global registry with all available implementations
pub fn initialize_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		// Auto-register all storage implementations
		for (name, factory) in kusina_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.register_storage(name, factory);
		}

		// Auto-register all auth implementations
		for (name, factory) in kusina_auth::get_all_implementations() {
			tracing::debug!("Registering auth implementation: {}", name);
			registry.register_auth(name, factory);
		}

		// Auto-register all messaging implementations
		for (name, factory) in kusina_notify::get_all_implementations() {
			tracing::debug!("Registering messaging implementation: {}", name);
			registry.register_messaging(name, factory);
		}

		registry
	})
}

/// Get the global factory registry
pub fn get_registry() -> &'static FactoryRegistry {
	initialize_registry()
}

/// Macro to build factories from config implementations
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				let available_str = available.join(", ");
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name, name, available_str
				)
				.into());
			}
		}
		factories
	}};
}

/// Build the admin engine using the registry and config
pub fn build_engine_from_config(config: Config) -> Result<AdminEngine, Box<dyn std::error::Error>> {
	let registry = get_registry();
	let builder = EngineBuilder::new(config.clone());

	// Build factories for each component type using the macro
	let storage_factories =
		build_factories!(registry, config.storage.implementations, storage, "storage");
	let auth_factories = build_factories!(registry, config.auth.implementations, auth, "auth");
	let messaging_factories = build_factories!(
		registry,
		config.messaging.implementations,
		messaging,
		"messaging"
	);

	let factories = EngineFactories {
		storage_factories,
		auth_factories,
		messaging_factories,
	};

	Ok(builder.build(factories)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_contains_compiled_in_implementations() {
		let registry = get_registry();
		assert!(registry.storage.contains_key("memory"));
		assert!(registry.storage.contains_key("file"));
		assert!(registry.auth.contains_key("static_tokens"));
		assert!(registry.messaging.contains_key("memory"));
		assert!(registry.messaging.contains_key("webhook"));
	}

	#[test]
	fn test_build_engine_rejects_unregistered_implementation() {
		let config: Config = r#"
[store]
name = "Ate Ai's Kitchen"

[storage]
primary = "redis"
[storage.implementations.redis]

[auth]
primary = "static_tokens"
[auth.implementations.static_tokens]
[[auth.implementations.static_tokens.admins]]
name = "ate-ai"
token = "tok"

[messaging]
primary = "memory"
[messaging.implementations.memory]
"#
		.parse()
		.unwrap();

		let result = build_engine_from_config(config);
		assert!(result.is_err());
		assert!(result
			.err()
			.unwrap()
			.to_string()
			.contains("Unknown storage implementation 'redis'"));
	}
}

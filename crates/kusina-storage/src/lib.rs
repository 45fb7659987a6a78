//! Storage module for the kusina admin service.
//!
//! This module provides abstractions for persistent storage of order and
//! message data, supporting different backend implementations such as
//! in-memory or file-based storage. The order store is the single source of
//! truth for order records; all mutations flow through it.

use async_trait::async_trait;
use kusina_types::{ConfigSchema, ImplementationRegistry, StorageKey};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the admin service. It provides basic key-value operations
/// over keys of the form `namespace:id`, plus enumeration of a namespace.
/// Writes to a single key are assumed atomic at the backend level.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists the ids present in the given namespace.
	async fn list_ids(&self, namespace: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// storage implementations must provide a StorageFactory.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. This is used by the engine builder to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with automatic
/// serialization/deserialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: StorageKey, id: &str) -> String {
		format!("{}:{}", namespace.as_str(), id)
	}

	/// Stores a serializable value, creating or overwriting it.
	///
	/// The namespace and id are combined to form a unique key.
	/// The data is serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Updates an existing value in storage.
	///
	/// This method first checks if the key exists, then updates the value.
	/// Returns an error if the key doesn't exist, making it semantically
	/// different from store() which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);

		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: StorageKey, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: StorageKey, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}

	/// Retrieves and deserializes every value in a namespace.
	///
	/// Ids that vanish between the listing and the read are skipped rather
	/// than failing the whole scan.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
	) -> Result<Vec<T>, StorageError> {
		let ids = self.backend.list_ids(namespace.as_str()).await?;
		let mut values = Vec::with_capacity(ids.len());
		for id in ids {
			match self.backend.get_bytes(&Self::key(namespace, &id)).await {
				Ok(bytes) => {
					let value = serde_json::from_slice(&bytes)
						.map_err(|e| StorageError::Serialization(e.to_string()))?;
					values.push(value);
				},
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(values)
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::memory::MemoryStorage;
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Record {
		id: String,
		value: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn test_typed_round_trip() {
		let storage = service();
		let record = Record {
			id: "r1".into(),
			value: 7,
		};

		storage
			.store(StorageKey::Orders, &record.id, &record)
			.await
			.unwrap();
		let loaded: Record = storage.retrieve(StorageKey::Orders, "r1").await.unwrap();
		assert_eq!(loaded, record);
	}

	#[tokio::test]
	async fn test_update_requires_existing_key() {
		let storage = service();
		let record = Record {
			id: "r2".into(),
			value: 1,
		};

		let result = storage.update(StorageKey::Orders, "r2", &record).await;
		assert!(matches!(result, Err(StorageError::NotFound)));

		storage
			.store(StorageKey::Orders, "r2", &record)
			.await
			.unwrap();
		storage
			.update(
				StorageKey::Orders,
				"r2",
				&Record {
					id: "r2".into(),
					value: 2,
				},
			)
			.await
			.unwrap();
		let loaded: Record = storage.retrieve(StorageKey::Orders, "r2").await.unwrap();
		assert_eq!(loaded.value, 2);
	}

	#[tokio::test]
	async fn test_retrieve_all_scans_one_namespace() {
		let storage = service();
		for i in 0..3u32 {
			let record = Record {
				id: format!("r{}", i),
				value: i,
			};
			storage
				.store(StorageKey::Orders, &record.id, &record)
				.await
				.unwrap();
		}
		storage
			.store(
				StorageKey::Messages,
				"m1",
				&Record {
					id: "m1".into(),
					value: 99,
				},
			)
			.await
			.unwrap();

		let mut orders: Vec<Record> = storage.retrieve_all(StorageKey::Orders).await.unwrap();
		orders.sort_by(|a, b| a.id.cmp(&b.id));
		assert_eq!(orders.len(), 3);
		assert!(orders.iter().all(|r| r.id.starts_with('r')));
	}
}

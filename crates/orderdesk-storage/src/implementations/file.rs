//! File-based storage backend implementation for the orderdesk service.
//!
//! This module stores each value as one JSON blob on the filesystem,
//! providing simple persistence without requiring an external database.
//! Keys of the form `namespace:id` map to `base/namespace/id.json`.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
///
/// Writes are atomic: data goes to a temp file first and is then renamed
/// over the target, so a crash never leaves a half-written record.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem path.
	///
	/// The namespace becomes a subdirectory; the id is sanitized to be
	/// filesystem-safe.
	fn file_path(&self, key: &str) -> PathBuf {
		let (namespace, id) = key.split_once(':').unwrap_or(("", key));
		let safe_id = id.replace(['/', ':'], "_");
		self.base_path.join(namespace).join(format!("{}.json", safe_id))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to a temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.file_path(key).exists())
	}

	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.base_path.join(namespace);

		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			// A namespace that was never written to has no directory.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() == Some(std::ffi::OsStr::new("json")) {
				if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
					keys.push(format!("{}:{}", namespace, stem));
				}
			}
		}
		Ok(keys)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[tokio::test]
	async fn round_trip_and_delete() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage
			.set_bytes("orders:o1", b"payload".to_vec())
			.await
			.unwrap();
		assert_eq!(storage.get_bytes("orders:o1").await.unwrap(), b"payload");

		storage.delete("orders:o1").await.unwrap();
		assert!(matches!(
			storage.get_bytes("orders:o1").await,
			Err(StorageError::NotFound)
		));
		// Deleting a missing key is not an error.
		storage.delete("orders:o1").await.unwrap();
	}

	#[tokio::test]
	async fn list_keys_only_sees_own_namespace() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage.set_bytes("orders:o1", vec![1]).await.unwrap();
		storage.set_bytes("orders:o2", vec![2]).await.unwrap();
		storage.set_bytes("notifications:n1", vec![3]).await.unwrap();

		let mut keys = storage.list_keys("orders").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:o1", "orders:o2"]);

		assert!(storage.list_keys("users").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn email_ids_are_filesystem_safe() {
		let dir = tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		storage
			.set_bytes("user_email_idx:buyer@example.com", b"u-1".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage
				.get_bytes("user_email_idx:buyer@example.com")
				.await
				.unwrap(),
			b"u-1"
		);
	}
}

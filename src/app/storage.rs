//! String key/value storage for state the browser keeps between visits.

use parking_lot::Mutex;
use std::collections::HashMap;

/// A storage backend refused a read or write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Client storage failed: {0}")]
pub struct StorageError(pub String);

/// Shaped after the browser's `localStorage`.
pub trait ClientStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
	fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ClientStorage for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.lock().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.items.lock().insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.items.lock().remove(key);
		Ok(())
	}
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage(web_sys::Storage);

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
	pub fn from_window() -> Result<Self, StorageError> {
		web_sys::window()
			.ok_or_else(|| StorageError("no window".to_string()))?
			.local_storage()
			.map_err(|e| StorageError(format!("{:?}", e)))?
			.map(Self)
			.ok_or_else(|| StorageError("localStorage is disabled".to_string()))
	}
}

#[cfg(target_arch = "wasm32")]
impl ClientStorage for LocalStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.0
			.get_item(key)
			.map_err(|e| StorageError(format!("{:?}", e)))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.0
			.set_item(key, value)
			.map_err(|e| StorageError(format!("{:?}", e)))
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.0
			.remove_item(key)
			.map_err(|e| StorageError(format!("{:?}", e)))
	}
}

/// Memory storage that can be told to refuse writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FlakyStorage {
	inner: MemoryStorage,
	refuse_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl FlakyStorage {
	pub(crate) fn refuse_writes(&self, refuse: bool) {
		self.refuse_writes
			.store(refuse, std::sync::atomic::Ordering::SeqCst);
	}

	fn check(&self) -> Result<(), StorageError> {
		if self.refuse_writes.load(std::sync::atomic::Ordering::SeqCst) {
			return Err(StorageError("quota exceeded".to_string()));
		}
		Ok(())
	}
}

#[cfg(test)]
impl ClientStorage for FlakyStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.inner.get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.check()?;
		self.inner.set_item(key, value)
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.check()?;
		self.inner.remove_item(key)
	}
}

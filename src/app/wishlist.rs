//! Persisted personal wishlist.
//!
//! The store lives in the browser; server rendering never reads it. Items are
//! kept newest first and written through a [`ClientStorage`] before every
//! change takes effect, in the `{"state": {"items": [...]}, "version": 0}` shape.

use serde::{Deserialize, Serialize};

use super::catalog::Movie;
use super::storage::{ClientStorage, StorageError};

/// Storage key of the persisted wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "theresa-wishlist-storage";

/// Schema version written next to the persisted items.
pub const STORAGE_VERSION: u32 = 0;

/// Wishlist errors.
#[derive(Debug, thiserror::Error)]
pub enum WishlistError {
	#[error(transparent)]
	Storage(#[from] StorageError),
	#[error("Wishlist data is invalid: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// A wishlisted movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
	pub id: u64,
	pub movie: Movie,
	/// Milliseconds since the Unix epoch.
	#[serde(rename = "addedAt")]
	pub added_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
	items: Vec<WishlistItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Persisted {
	state: PersistedState,
	version: u32,
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
	js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or(0)
}

/// The wishlist and the storage it is persisted in.
#[derive(Debug)]
pub struct WishlistStore<S: ClientStorage> {
	storage: S,
	items: Vec<WishlistItem>,
}

impl<S: ClientStorage> WishlistStore<S> {
	/// Restores the wishlist from `storage`. Unreadable data starts an empty
	/// wishlist.
	pub fn load(storage: S) -> Self {
		let items = match Self::read(&storage) {
			Ok(items) => items,
			Err(err) => {
				tracing::warn!(error = %err, "discarding stored wishlist");
				Vec::new()
			}
		};
		Self { storage, items }
	}

	fn read(storage: &S) -> Result<Vec<WishlistItem>, WishlistError> {
		match storage.get_item(WISHLIST_STORAGE_KEY)? {
			Some(json) => Ok(serde_json::from_str::<Persisted>(&json)?.state.items),
			None => Ok(Vec::new()),
		}
	}

	fn persist(&self, items: &[WishlistItem]) -> Result<(), WishlistError> {
		let json = serde_json::to_string(&Persisted {
			state: PersistedState {
				items: items.to_vec(),
			},
			version: STORAGE_VERSION,
		})?;
		Ok(self.storage.set_item(WISHLIST_STORAGE_KEY, &json)?)
	}

	/// Items, newest first.
	pub fn items(&self) -> &[WishlistItem] {
		&self.items
	}

	pub fn count(&self) -> usize {
		self.items.len()
	}

	pub fn contains(&self, movie_id: u64) -> bool {
		self.items.iter().any(|item| item.id == movie_id)
	}

	/// Adds `movie` in front. Returns `false` if it was already listed.
	///
	/// Nothing changes unless the new list was stored.
	pub fn add(&mut self, movie: Movie) -> Result<bool, WishlistError> {
		if self.contains(movie.id) {
			tracing::debug!(movie = movie.id, "movie already in wishlist");
			return Ok(false);
		}
		let mut items = Vec::with_capacity(self.items.len() + 1);
		items.push(WishlistItem {
			id: movie.id,
			movie,
			added_at: now_millis(),
		});
		items.extend(self.items.iter().cloned());
		self.persist(&items)?;
		self.items = items;
		Ok(true)
	}

	/// Removes a movie. Returns `false` if it was not listed.
	pub fn remove(&mut self, movie_id: u64) -> Result<bool, WishlistError> {
		if !self.contains(movie_id) {
			return Ok(false);
		}
		let items: Vec<WishlistItem> = self
			.items
			.iter()
			.filter(|item| item.id != movie_id)
			.cloned()
			.collect();
		self.persist(&items)?;
		self.items = items;
		Ok(true)
	}

	/// Adds or removes `movie`; returns whether it is listed afterwards.
	pub fn toggle(&mut self, movie: Movie) -> Result<bool, WishlistError> {
		if self.contains(movie.id) {
			self.remove(movie.id)?;
			Ok(false)
		} else {
			self.add(movie)?;
			Ok(true)
		}
	}

	pub fn clear(&mut self) -> Result<(), WishlistError> {
		self.persist(&[])?;
		self.items.clear();
		Ok(())
	}

	/// Drops the persisted copy as well as the in-memory items.
	pub fn forget(&mut self) -> Result<(), WishlistError> {
		self.storage.remove_item(WISHLIST_STORAGE_KEY)?;
		self.items.clear();
		Ok(())
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}
}

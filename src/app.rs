//! The movie application: catalog, page tree and browser-side preferences.
//!
//! The same [`MovieApp`] renders on the server and in the browser, so both
//! sides build identical trees for a given [`Resolution`].

mod catalog;
pub mod format;
mod layout;
mod pages;
mod storage;
mod theme;
mod wishlist;

use std::sync::Arc;
use theresa_pages::RenderError;
use theresa_pages::component::{Component, Page};
use theresa_pages::ssr::AppRenderer;
use theresa_urls::Resolution;

pub use catalog::{
	CatalogError, Genre, Movie, MovieCatalog, MovieCategory, MovieDetails, MoviePage, PAGE_SIZE,
	StaticCatalog,
};
pub use layout::{App, Header};
pub use pages::{
	CategoryRow, HomePage, MovieCard, MovieDetailPage, MovieDetailView, NotFoundPage, WishlistPage,
};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{ClientStorage, MemoryStorage, StorageError};
pub use theme::{
	ResolvedTheme, THEME_CLASSES, THEME_STORAGE_KEY, ThemeAttributes, ThemeMode, ThemeStore,
};
pub use wishlist::{
	STORAGE_VERSION, WISHLIST_STORAGE_KEY, WishlistError, WishlistItem, WishlistStore,
};

/// Renders routes against a movie catalog.
#[derive(Clone)]
pub struct MovieApp {
	catalog: Arc<dyn MovieCatalog>,
}

impl MovieApp {
	pub fn new(catalog: impl MovieCatalog + 'static) -> Self {
		Self::from_arc(Arc::new(catalog))
	}

	pub fn from_arc(catalog: Arc<dyn MovieCatalog>) -> Self {
		Self { catalog }
	}

	/// The app over the built-in sample catalog.
	pub fn sample() -> Self {
		Self::new(StaticCatalog::sample())
	}

	pub fn catalog(&self) -> &Arc<dyn MovieCatalog> {
		&self.catalog
	}
}

impl AppRenderer for MovieApp {
	fn render_route(&self, resolution: &Resolution) -> Result<Page, RenderError> {
		App {
			resolution: resolution.clone(),
			catalog: self.catalog.clone(),
		}
		.render()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use theresa_pages::ssr::render_to_string;
	use theresa_urls::resolve;

	#[rstest]
	#[case("/", "home")]
	#[case("/wishlist", "wishlist")]
	#[case("/movie/653", "movie-detail:653")]
	#[tokio::test]
	async fn test_render_route_carries_route_key(#[case] path: &str, #[case] key: &str) {
		let page = MovieApp::sample().render_route(&resolve(path)).unwrap();
		let html = render_to_string(page).await.unwrap();
		assert!(html.starts_with(&format!("<div class=\"app\" data-route=\"{}\">", key)));
	}

	#[rstest]
	#[tokio::test]
	async fn test_render_route_detail_content() {
		let page = MovieApp::sample().render_route(&resolve("/movie/653")).unwrap();
		let html = render_to_string(page).await.unwrap();
		assert!(html.contains("Nosferatu"));
		assert!(html.contains("1h 34m"));
	}

	#[rstest]
	fn test_wishlist_persists_exported_version() {
		let mut store = WishlistStore::load(MemoryStorage::new());
		store
			.add(Movie {
				id: 653,
				title: "Nosferatu".to_string(),
				overview: String::new(),
				poster_path: None,
				release_date: Some("1922-02-16".to_string()),
				vote_average: 7.7,
				vote_count: 1900,
			})
			.unwrap();

		let json = store.storage().get_item(WISHLIST_STORAGE_KEY).unwrap().unwrap();
		assert_eq!(STORAGE_VERSION, 0);
		assert!(json.ends_with(&format!("\"version\":{}}}", STORAGE_VERSION)));
	}
}

//! Application shell: the root element and the header.

use http::StatusCode;
use std::sync::Arc;
use theresa_pages::RenderError;
use theresa_pages::component::{Component, IntoPage, Page, PageElement};
use theresa_pages::hydration::ROUTE_ATTR;
use theresa_urls::{Resolution, Route};

use super::catalog::MovieCatalog;
use super::pages::{HomePage, MovieDetailPage, NotFoundPage, WishlistPage};

/// Root of the page tree.
///
/// Carries the route key in `data-route`; the hydrating client compares it
/// with its own render before taking over the markup.
pub struct App {
	pub resolution: Resolution,
	pub catalog: Arc<dyn MovieCatalog>,
}

impl App {
	fn content(&self) -> Result<Page, RenderError> {
		if self.resolution.status == StatusCode::NOT_FOUND {
			return NotFoundPage.render();
		}
		match &self.resolution.route {
			Route::Home => HomePage {
				catalog: self.catalog.clone(),
			}
			.render(),
			Route::Wishlist => WishlistPage.render(),
			Route::MovieDetail(id) => MovieDetailPage {
				id: id.clone(),
				catalog: self.catalog.clone(),
			}
			.render(),
		}
	}
}

impl Component for App {
	fn render(&self) -> Result<Page, RenderError> {
		let route = &self.resolution.route;
		let header = Header {
			current: route.clone(),
		};
		Ok(Page::element("div")
			.attr("class", "app")
			.attr(ROUTE_ATTR, route.key())
			.child(header.render()?)
			.child(
				Page::element("main")
					.attr("class", "main-content")
					.child(self.content()?),
			)
			.into_page())
	}

	fn name() -> &'static str {
		"App"
	}
}

/// Site header with navigation.
pub struct Header {
	pub current: Route,
}

impl Header {
	fn nav_link(&self, target: Route, label: PageElement) -> PageElement {
		let class = if self.current == target {
			"header__nav-btn header__nav-btn--active"
		} else {
			"header__nav-btn"
		};
		label.attr("class", class).attr("href", target.path())
	}
}

impl Component for Header {
	fn render(&self) -> Result<Page, RenderError> {
		let home = self.nav_link(Route::Home, Page::element("a").child("Home"));
		// The count is filled in by the browser from the persisted wishlist.
		let wishlist = self.nav_link(
			Route::Wishlist,
			Page::element("a")
				.child(Page::element("span").attr("class", "header__wishlist-text").child("Wishlist"))
				.child(
					Page::element("span")
						.attr("class", "header__wishlist-count")
						.attr("hidden", ""),
				),
		);

		Ok(Page::element("header")
			.attr("class", "header")
			.child(
				Page::element("div")
					.attr("class", "header__container")
					.child(
						Page::element("a")
							.attr("class", "header__brand")
							.attr("href", "/")
							.child(Page::element("h1").attr("class", "header__title").child("MovieApp")),
					)
					.child(Page::element("nav").attr("class", "header__nav").child(home).child(wishlist)),
			)
			.into_page())
	}

	fn name() -> &'static str {
		"Header"
	}
}

//! Hydration Runtime
//!
//! Attaches the client to markup the server already produced. The check that
//! matters is route agreement: the app root carries a `data-route` key on both
//! sides, and a client that would render a different route than the server
//! did must fail loudly instead of patching the DOM.

use regex::Regex;
use std::sync::LazyLock;

use crate::RenderError;
use crate::component::{Page, html_unescape};

/// Attribute on the app root naming the rendered route.
pub const ROUTE_ATTR: &str = "data-route";

/// Errors that can occur during hydration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrationError {
	/// The hydration root element was not found.
	#[error("Hydration root element not found: {0}")]
	RootNotFound(String),
	/// The root holds no server-rendered app element.
	#[error("Hydration root has no server-rendered markup")]
	EmptyRoot,
	/// The client page has no route key to compare.
	#[error("Client page root is missing the data-route attribute")]
	MissingRouteAttribute,
	/// Server and client rendered different routes.
	#[error("Route mismatch: server rendered {actual}, client expects {expected}")]
	RouteMismatch { expected: String, actual: String },
	/// The initial-route handoff value could not be read.
	#[error("Failed to read initial route: {0}")]
	HandoffParse(String),
	/// The client render failed.
	#[error(transparent)]
	Render(#[from] RenderError),
	/// A browser API was unavailable or threw.
	#[error("Browser API unavailable: {0}")]
	Browser(String),
}

/// The container of server-rendered markup a client hydrates.
pub trait HydrationRoot {
	/// Route key on the first element inside the root, if any.
	fn server_route_key(&self) -> Option<String>;

	/// Records that hydration completed on this root.
	fn mark_hydrated(&mut self);
}

static FIRST_TAG_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"^\s*<[A-Za-z][A-Za-z0-9-]*\b[^>]*?\sdata-route="([^"]*)""#)
		.expect("route attribute pattern is valid")
});

/// Server markup held as a string, as a test double for the DOM and for
/// checking server output against a client render natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRoot {
	markup: String,
	hydrated: bool,
}

impl MarkupRoot {
	pub fn new(markup: impl Into<String>) -> Self {
		Self {
			markup: markup.into(),
			hydrated: false,
		}
	}

	pub fn is_hydrated(&self) -> bool {
		self.hydrated
	}
}

impl HydrationRoot for MarkupRoot {
	fn server_route_key(&self) -> Option<String> {
		FIRST_TAG_ROUTE
			.captures(&self.markup)
			.and_then(|captures| captures.get(1))
			.map(|value| html_unescape(value.as_str()).into_owned())
	}

	fn mark_hydrated(&mut self) {
		self.hydrated = true;
	}
}

/// A DOM element whose children are the server-rendered app.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct DomRoot(pub web_sys::Element);

#[cfg(target_arch = "wasm32")]
impl HydrationRoot for DomRoot {
	fn server_route_key(&self) -> Option<String> {
		self.0.first_element_child()?.get_attribute(ROUTE_ATTR)
	}

	fn mark_hydrated(&mut self) {
		let _ = self.0.set_attribute("data-hydrated", "true");
	}
}

/// Hydrates `page` onto `root`.
///
/// ```
/// use theresa_pages::component::{IntoPage, Page};
/// use theresa_pages::hydration::{HydrationError, MarkupRoot, hydrate};
///
/// let client = Page::element("div").attr("data-route", "wishlist").into_page();
/// let mut root = MarkupRoot::new(r#"<div data-route="wishlist">server</div>"#);
/// assert!(hydrate(&client, &mut root).is_ok());
///
/// let mut stale = MarkupRoot::new(r#"<div data-route="home"></div>"#);
/// assert!(matches!(hydrate(&client, &mut stale), Err(HydrationError::RouteMismatch { .. })));
/// ```
pub fn hydrate<R: HydrationRoot>(page: &Page, root: &mut R) -> Result<(), HydrationError> {
	let expected = page
		.root_element()
		.and_then(|el| el.get_attr(ROUTE_ATTR))
		.ok_or(HydrationError::MissingRouteAttribute)?;
	let actual = root.server_route_key().ok_or(HydrationError::EmptyRoot)?;

	if expected != actual {
		return Err(HydrationError::RouteMismatch {
			expected: expected.to_string(),
			actual,
		});
	}

	root.mark_hydrated();
	mark_hydration_complete();
	tracing::debug!(route = %actual, "hydration complete");
	Ok(())
}

/// Runs the whole browser bootstrap against `#root`: takes the handoff,
/// resolves the starting route, renders the client page and hydrates it.
#[cfg(target_arch = "wasm32")]
pub fn hydrate_document<F>(render: F) -> Result<theresa_urls::Route, HydrationError>
where
	F: FnOnce(&theresa_urls::Resolution) -> Result<Page, RenderError>,
{
	use super::handoff::{bootstrap_route, take_initial_route_from_window};

	init_hydration_state();
	let mut handoff = take_initial_route_from_window()?;

	let window = web_sys::window().ok_or_else(|| HydrationError::Browser("window".to_string()))?;
	let location = window
		.location()
		.pathname()
		.map_err(|e| HydrationError::Browser(format!("{:?}", e)))?;
	let route = bootstrap_route(&mut handoff, &location);
	let resolution = theresa_urls::Resolution {
		route: route.clone(),
		status: theresa_urls::status_for_path(&location),
	};

	let page = render(&resolution)?;
	let element = window
		.document()
		.and_then(|doc| doc.get_element_by_id("root"))
		.ok_or_else(|| HydrationError::RootNotFound("#root".to_string()))?;

	hydrate(&page, &mut DomRoot(element))?;
	Ok(route)
}

// Global hydration state management
type HydrationListener = Box<dyn Fn(bool) + 'static>;
type HydrationListeners = Vec<HydrationListener>;

thread_local! {
	static HYDRATION_COMPLETE: std::cell::RefCell<bool> = const { std::cell::RefCell::new(false) };
	static HYDRATION_LISTENERS: std::cell::RefCell<HydrationListeners> = const { std::cell::RefCell::new(Vec::new()) };
}

/// Initialize hydration state (called before hydration starts)
pub fn init_hydration_state() {
	HYDRATION_COMPLETE.with(|state| {
		*state.borrow_mut() = false;
	});
}

/// Check if hydration is complete
pub fn is_hydration_complete() -> bool {
	HYDRATION_COMPLETE.with(|state| *state.borrow())
}

/// Register a callback to be called when hydration completes
pub fn on_hydration_complete<F>(callback: F)
where
	F: Fn(bool) + 'static,
{
	HYDRATION_LISTENERS.with(|listeners| {
		listeners.borrow_mut().push(Box::new(callback));
	});
}

fn mark_hydration_complete() {
	HYDRATION_COMPLETE.with(|state| {
		*state.borrow_mut() = true;
	});

	HYDRATION_LISTENERS.with(|listeners| {
		for listener in listeners.borrow().iter() {
			listener(true);
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::IntoPage;
	use rstest::rstest;
	use std::cell::Cell;
	use std::rc::Rc;

	fn client_page(key: &str) -> Page {
		Page::element("div")
			.attr("class", "app")
			.attr(ROUTE_ATTR, key.to_string())
			.child("client")
			.into_page()
	}

	#[rstest]
	#[case("<div class=\"app\" data-route=\"home\">x</div>", Some("home"))]
	#[case("\n  <main data-route=\"movie-detail:42\" id=\"m\"></main>", Some("movie-detail:42"))]
	#[case("<div class=\"app\"><p data-route=\"home\"></p></div>", None)]
	#[case("", None)]
	#[case("<div data-route=\"a&amp;b\"></div>", Some("a&b"))]
	fn test_markup_root_reads_first_tag_only(#[case] markup: &str, #[case] expected: Option<&str>) {
		assert_eq!(
			MarkupRoot::new(markup).server_route_key().as_deref(),
			expected
		);
	}

	#[rstest]
	fn test_hydrate_marks_root_and_notifies() {
		init_hydration_state();
		let notified = Rc::new(Cell::new(false));
		let seen = notified.clone();
		on_hydration_complete(move |done| seen.set(done));

		let mut root = MarkupRoot::new("<div class=\"app\" data-route=\"wishlist\"></div>");
		hydrate(&client_page("wishlist"), &mut root).unwrap();

		assert!(root.is_hydrated());
		assert!(is_hydration_complete());
		assert!(notified.get());
	}

	#[rstest]
	fn test_hydrate_rejects_mismatch() {
		init_hydration_state();
		let mut root = MarkupRoot::new("<div data-route=\"movie-detail:1\"></div>");

		let err = hydrate(&client_page("movie-detail:2"), &mut root).unwrap_err();
		assert_eq!(
			err,
			HydrationError::RouteMismatch {
				expected: "movie-detail:2".to_string(),
				actual: "movie-detail:1".to_string(),
			}
		);
		assert!(!root.is_hydrated());
		assert!(!is_hydration_complete());
	}

	#[rstest]
	fn test_hydrate_requires_server_markup() {
		let mut root = MarkupRoot::new("");
		assert_eq!(
			hydrate(&client_page("home"), &mut root),
			Err(HydrationError::EmptyRoot)
		);
	}

	#[rstest]
	fn test_hydrate_requires_client_route_key() {
		let mut root = MarkupRoot::new("<div data-route=\"home\"></div>");
		assert_eq!(
			hydrate(&Page::text("bare"), &mut root),
			Err(HydrationError::MissingRouteAttribute)
		);
	}
}

//! Initial-route handoff from server markup to the client bootstrap.

use theresa_urls::{Route, resolve_route};

use super::HydrationError;

/// One-shot carrier of the server-resolved route.
///
/// The value is read at most once; later client-side navigations resolve
/// routes from the location instead of reusing a stale server value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialRouteHandoff {
	value: Option<Route>,
}

impl InitialRouteHandoff {
	pub fn new(route: Route) -> Self {
		Self { value: Some(route) }
	}

	/// A handoff with nothing in it, as on pages that were not server rendered.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Parses the JSON the server embeds (a path string such as `"/movie/42"`).
	pub fn from_json(json: &str) -> Result<Self, HydrationError> {
		let route: Option<Route> =
			serde_json::from_str(json).map_err(|e| HydrationError::HandoffParse(e.to_string()))?;
		Ok(Self { value: route })
	}

	/// Takes the route out, leaving the handoff empty.
	///
	/// ```
	/// use theresa_pages::hydration::InitialRouteHandoff;
	/// use theresa_urls::Route;
	///
	/// let mut handoff = InitialRouteHandoff::new(Route::Wishlist);
	/// assert_eq!(handoff.take(), Some(Route::Wishlist));
	/// assert_eq!(handoff.take(), None);
	/// ```
	pub fn take(&mut self) -> Option<Route> {
		self.value.take()
	}

	pub fn is_pending(&self) -> bool {
		self.value.is_some()
	}
}

/// Picks the route the client starts in: the handed-off value when present,
/// otherwise the route resolved from `location` with the server's resolver.
pub fn bootstrap_route(handoff: &mut InitialRouteHandoff, location: &str) -> Route {
	match handoff.take() {
		Some(route) => {
			let from_location = resolve_route(location);
			if from_location != route {
				tracing::warn!(
					handed_off = %route,
					location = %location,
					"initial route differs from location, keeping server route"
				);
			}
			route
		}
		None => resolve_route(location),
	}
}

/// Reads `window.__INITIAL_ROUTE__` and deletes it.
#[cfg(target_arch = "wasm32")]
pub fn take_initial_route_from_window() -> Result<InitialRouteHandoff, HydrationError> {
	use crate::ssr::INITIAL_ROUTE_GLOBAL;
	use wasm_bindgen::JsValue;

	let window = web_sys::window().ok_or_else(|| HydrationError::Browser("window".to_string()))?;
	let key = JsValue::from_str(INITIAL_ROUTE_GLOBAL);
	let value = js_sys::Reflect::get(&window, &key)
		.map_err(|e| HydrationError::HandoffParse(format!("{:?}", e)))?;
	js_sys::Reflect::delete_property(&window, &key)
		.map_err(|e| HydrationError::Browser(format!("{:?}", e)))?;

	if value.is_undefined() || value.is_null() {
		return Ok(InitialRouteHandoff::empty());
	}
	let path = value
		.as_string()
		.ok_or_else(|| HydrationError::HandoffParse("initial route is not a string".to_string()))?;
	Ok(InitialRouteHandoff::new(resolve_route(&path)))
}

/// Non-WASM version: there is no window, so nothing is handed off.
#[cfg(not(target_arch = "wasm32"))]
pub fn take_initial_route_from_window() -> Result<InitialRouteHandoff, HydrationError> {
	Ok(InitialRouteHandoff::empty())
}

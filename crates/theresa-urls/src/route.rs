//! Route resolution.
//!
//! A raw request path is classified exactly once by [`classify_path`]; both the
//! resolved [`Route`] and the HTTP status are projections of that one
//! classification, which keeps them consistent by construction.

use http::StatusCode;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Movie detail pattern: `/movie/<id>` where `<id>` is the first path segment.
static MOVIE_DETAIL_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^/movie/([^/]+)").expect("movie detail pattern is valid"));

/// Prefix that selects the wishlist page.
const WISHLIST_PREFIX: &str = "/wishlist";

/// A logical application location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
	/// The category listing (also the fallback for unknown paths).
	Home,
	/// The persisted personal wishlist.
	Wishlist,
	/// A single movie, identified by its catalog id.
	MovieDetail(String),
}

impl Route {
	/// Returns the canonical path of this route.
	pub fn path(&self) -> String {
		match self {
			Self::Home => "/".to_string(),
			Self::Wishlist => WISHLIST_PREFIX.to_string(),
			Self::MovieDetail(id) => format!("/movie/{}", id),
		}
	}

	/// Returns a short stable name, used in markup and logs.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Home => "home",
			Self::Wishlist => "wishlist",
			Self::MovieDetail(_) => "movie-detail",
		}
	}

	/// Returns a compact identity (`home`, `wishlist`, `movie-detail:42`) that
	/// server markup and the hydrating client compare.
	pub fn key(&self) -> String {
		match self {
			Self::MovieDetail(id) => format!("{}:{}", self.name(), id),
			_ => self.name().to_string(),
		}
	}

	/// Returns the movie id for detail routes.
	pub fn movie_id(&self) -> Option<&str> {
		match self {
			Self::MovieDetail(id) => Some(id),
			_ => None,
		}
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path())
	}
}

impl FromStr for Route {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(resolve_route(s))
	}
}

impl Serialize for Route {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.path())
	}
}

impl<'de> Deserialize<'de> for Route {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let path = String::deserialize(deserializer)?;
		Ok(resolve_route(&path))
	}
}

/// The result of resolving a raw path: the route plus its HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	/// The canonical route.
	pub route: Route,
	/// 200 for recognized paths, 404 for the home fallback.
	pub status: StatusCode,
}

/// How a normalized path was recognized.
#[derive(Debug, PartialEq, Eq)]
enum PathClass<'a> {
	Root,
	Wishlist,
	MovieDetail(&'a str),
	Unknown,
}

impl PathClass<'_> {
	fn route(&self) -> Route {
		match self {
			Self::Root | Self::Unknown => Route::Home,
			Self::Wishlist => Route::Wishlist,
			Self::MovieDetail(id) => Route::MovieDetail((*id).to_string()),
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Self::Unknown => StatusCode::NOT_FOUND,
			_ => StatusCode::OK,
		}
	}
}

/// Strips everything from the first `?` (or `#`) onward.
pub fn strip_query(raw: &str) -> &str {
	match raw.find(['?', '#']) {
		Some(index) => &raw[..index],
		None => raw,
	}
}

fn classify_path(raw: &str) -> PathClass<'_> {
	let path = strip_query(raw);

	if path.is_empty() || path == "/" {
		return PathClass::Root;
	}

	if path.starts_with(WISHLIST_PREFIX) {
		return PathClass::Wishlist;
	}

	if let Some(id) = MOVIE_DETAIL_PATTERN
		.captures(path)
		.and_then(|captures| captures.get(1))
	{
		return PathClass::MovieDetail(id.as_str());
	}

	PathClass::Unknown
}

/// Resolves a raw request path (query string allowed) to a route.
///
/// Total and idempotent: every input maps to exactly one route, and resolving
/// the path of a resolved route yields the same route.
pub fn resolve_route(raw: &str) -> Route {
	classify_path(raw).route()
}

/// Computes the HTTP status for a raw request path.
///
/// This is derived from the raw path rather than from the resolved route:
/// an unknown path resolves to [`Route::Home`] but still reports 404.
pub fn status_for_path(raw: &str) -> StatusCode {
	classify_path(raw).status()
}

/// Resolves a raw path to both its route and status in one pass.
pub fn resolve(raw: &str) -> Resolution {
	let class = classify_path(raw);
	Resolution {
		route: class.route(),
		status: class.status(),
	}
}

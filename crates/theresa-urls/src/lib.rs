//! Theresa URLs - route resolution shared by server and client
//!
//! Both the SSR dispatcher (resolving from the request path) and the wasm
//! hydration bootstrap (resolving from `window.location`) link this crate, so
//! the two sides always run the exact same resolution algorithm.
//!
//! ## Example
//!
//! ```
//! use theresa_urls::{Route, resolve, resolve_route, status_for_path};
//! use http::StatusCode;
//!
//! assert_eq!(resolve_route("/movie/42?ref=home"), Route::MovieDetail("42".into()));
//! assert_eq!(status_for_path("/nowhere"), StatusCode::NOT_FOUND);
//!
//! let resolution = resolve("/wishlist/shared");
//! assert_eq!(resolution.route, Route::Wishlist);
//! assert_eq!(resolution.status, StatusCode::OK);
//! ```

pub mod route;

pub use route::{Resolution, Route, resolve, resolve_route, status_for_path, strip_query};

//! Client-side hydration.
//!
//! The browser bootstrap takes the one-shot initial-route handoff, resolves
//! the route it starts in with the same resolver the server used, renders the
//! page tree and verifies it against the server markup before taking over.

mod handoff;
mod runtime;

pub use handoff::{InitialRouteHandoff, bootstrap_route, take_initial_route_from_window};
#[cfg(target_arch = "wasm32")]
pub use runtime::{DomRoot, hydrate_document};
pub use runtime::{
	HydrationError, HydrationRoot, MarkupRoot, ROUTE_ATTR, hydrate, init_hydration_state,
	is_hydration_complete, on_hydration_complete,
};

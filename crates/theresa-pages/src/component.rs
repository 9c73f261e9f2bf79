//! Component system.
//!
//! - [`Page`]: the renderable tree (elements, text, fragments, suspense boundaries)
//! - [`IntoPage`]: conversion of builders and plain values into a [`Page`]
//! - [`Component`]: reusable units that render a [`Page`]

mod page;
mod r#trait;

pub use page::{
	IntoPage, Page, PageElement, PendingPage, SuspenseBoundary, html_escape, html_unescape,
	resolve_suspense,
};
pub use r#trait::Component;

//! Page rendering for theresa.
//!
//! One page tree serves both sides of the wire:
//!
//! - [`component`]: the [`Page`](component::Page) tree, builders and the
//!   [`Component`](component::Component) trait
//! - [`ssr`]: complete and streaming server rendering plus the HTML shell
//!   compositor
//! - [`hydration`]: the browser bootstrap that takes over server markup
//!
//! ## Example
//!
//! ```
//! use futures::StreamExt;
//! use theresa_pages::component::{IntoPage, Page};
//! use theresa_pages::ssr::{RenderEvent, RenderStream};
//!
//! # tokio_test::block_on(async {
//! let page = Page::element("main")
//!     .child(Page::suspense("Loading...", async { Ok(Page::text("Movies")) }))
//!     .into_page();
//!
//! let events: Vec<RenderEvent> = RenderStream::new(Ok(page)).collect().await;
//! assert_eq!(events.first(), Some(&RenderEvent::ShellReady));
//! assert_eq!(events.last(), Some(&RenderEvent::Done));
//! # });
//! ```

pub mod component;
mod error;
pub mod hydration;
pub mod ssr;

pub use error::RenderError;

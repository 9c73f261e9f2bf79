//! Render entry points.
//!
//! [`SsrEntry`] is what the server calls per request: it resolves the URL,
//! asks the application for its page tree and renders it either completely
//! ([`SsrEntry::render`]) or as an event stream ([`SsrEntry::render_stream`]).

use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use theresa_urls::{Resolution, Route};

use super::stream::RenderStream;
use crate::RenderError;
use crate::component::{Page, resolve_suspense};

/// The application side of server rendering.
pub trait AppRenderer: Send + Sync + 'static {
	/// Builds the page tree for a resolved request path.
	///
	/// The resolution carries the status so unknown paths (resolved to the
	/// home route with 404) can render their fallback UI.
	fn render_route(&self, resolution: &Resolution) -> Result<Page, RenderError>;
}

/// Renders a page completely, awaiting every suspense boundary in place.
///
/// ```
/// # tokio_test::block_on(async {
/// use theresa_pages::component::Page;
/// use theresa_pages::ssr::render_to_string;
///
/// let page = Page::suspense("Loading", async { Ok(Page::text("Done")) });
/// assert_eq!(render_to_string(page).await.unwrap(), "Done");
/// # });
/// ```
pub async fn render_to_string(page: Page) -> Result<String, RenderError> {
	Ok(resolve_suspense(page).await?.into_html())
}

/// Result of a complete render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
	pub markup: String,
	pub route: Route,
	pub status: StatusCode,
}

/// Result of a streaming render. Status and route are known before the first
/// event is polled.
pub struct StreamingRender {
	pub stream: RenderStream,
	pub route: Route,
	pub status: StatusCode,
}

impl fmt::Debug for StreamingRender {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StreamingRender")
			.field("route", &self.route)
			.field("status", &self.status)
			.finish_non_exhaustive()
	}
}

/// Server-side render module entry.
#[derive(Clone)]
pub struct SsrEntry {
	app: Arc<dyn AppRenderer>,
}

impl fmt::Debug for SsrEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SsrEntry").finish_non_exhaustive()
	}
}

impl SsrEntry {
	pub fn new(app: impl AppRenderer) -> Self {
		Self { app: Arc::new(app) }
	}

	pub fn from_arc(app: Arc<dyn AppRenderer>) -> Self {
		Self { app }
	}

	/// Renders `url` completely.
	pub async fn render(&self, url: &str) -> Result<RenderOutput, RenderError> {
		let resolution = theresa_urls::resolve(url);
		let page = self.app.render_route(&resolution)?;
		let markup = render_to_string(page).await?;
		Ok(RenderOutput {
			markup,
			route: resolution.route,
			status: resolution.status,
		})
	}

	/// Starts a streaming render of `url`. A failing application render
	/// surfaces as the stream's `ShellError`.
	pub fn render_stream(&self, url: &str) -> StreamingRender {
		let resolution = theresa_urls::resolve(url);
		let page = self.app.render_route(&resolution);
		tracing::debug!(route = %resolution.route, status = %resolution.status, "render started");
		StreamingRender {
			stream: RenderStream::new(page),
			route: resolution.route,
			status: resolution.status,
		}
	}
}

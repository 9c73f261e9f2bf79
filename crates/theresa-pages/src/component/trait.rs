//! Component trait definition.

use super::page::Page;
use crate::RenderError;

/// Trait for reusable UI components.
///
/// Rendering is synchronous and produces the page tree; asynchronous data
/// needs are expressed as suspense boundaries inside that tree, so a failing
/// `render` is always a failure before the shell exists.
///
/// # Example
///
/// ```
/// use theresa_pages::component::{Component, IntoPage, Page};
/// use theresa_pages::RenderError;
///
/// struct Greeting {
///     name: String,
/// }
///
/// impl Component for Greeting {
///     fn render(&self) -> Result<Page, RenderError> {
///         Ok(Page::element("div")
///             .attr("class", "greeting")
///             .child(format!("Hello, {}!", self.name))
///             .into_page())
///     }
///
///     fn name() -> &'static str {
///         "Greeting"
///     }
/// }
///
/// let html = Greeting { name: "World".into() }.render().unwrap().into_html();
/// assert_eq!(html, "<div class=\"greeting\">Hello, World!</div>");
/// ```
pub trait Component: 'static {
	/// Renders the component to a Page.
	fn render(&self) -> Result<Page, RenderError>;

	/// Returns the component's name for logs and error reports.
	fn name() -> &'static str
	where
		Self: Sized;
}

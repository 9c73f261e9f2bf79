//! Page tree and HTML serialization.

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use std::borrow::Cow;
use std::fmt;

use crate::RenderError;

/// Future resolving the content of a suspense boundary.
pub type PendingPage = BoxFuture<'static, Result<Page, RenderError>>;

/// A unified representation of renderable content.
///
/// `Page` is consumed by rendering: suspense boundaries own the future that
/// produces their content, so a tree renders exactly once.
#[derive(Debug)]
pub enum Page {
	/// An HTML element.
	Element(PageElement),
	/// Escaped text.
	Text(Cow<'static, str>),
	/// Trusted markup, written without escaping.
	Raw(Cow<'static, str>),
	/// Several pages without a wrapper element.
	Fragment(Vec<Page>),
	/// Content that waits on asynchronous data.
	Suspense(SuspenseBoundary),
	/// Renders nothing.
	Empty,
}

/// An HTML element in the page tree.
#[derive(Debug)]
pub struct PageElement {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
	children: Vec<Page>,
	is_void: bool,
}

/// A subtree whose content depends on pending data.
///
/// The fallback renders immediately, as part of the shell; the pending future
/// produces the real content later.
pub struct SuspenseBoundary {
	pub(crate) fallback: Box<Page>,
	pub(crate) pending: PendingPage,
}

impl fmt::Debug for SuspenseBoundary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SuspenseBoundary")
			.field("fallback", &self.fallback)
			.finish_non_exhaustive()
	}
}

impl SuspenseBoundary {
	/// Splits the boundary into its fallback and pending content.
	pub fn into_parts(self) -> (Page, PendingPage) {
		(*self.fallback, self.pending)
	}
}

impl PageElement {
	/// Creates a new element.
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		let tag = tag.into();
		let is_void = matches!(
			tag.as_ref(),
			"area"
				| "base" | "br"
				| "col" | "embed"
				| "hr" | "img"
				| "input" | "link"
				| "meta" | "source"
				| "track" | "wbr"
		);
		Self {
			tag,
			attrs: Vec::new(),
			children: Vec::new(),
			is_void,
		}
	}

	/// Adds an attribute.
	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds a child.
	pub fn child(mut self, child: impl IntoPage) -> Self {
		self.children.push(child.into_page());
		self
	}

	/// Adds several children.
	pub fn children(mut self, children: impl IntoIterator<Item = impl IntoPage>) -> Self {
		self.children
			.extend(children.into_iter().map(IntoPage::into_page));
		self
	}

	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Returns the value of the first attribute named `name`.
	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_ref())
	}

	pub fn child_pages(&self) -> &[Page] {
		&self.children
	}

	pub fn is_void(&self) -> bool {
		self.is_void
	}
}

impl Page {
	/// Starts an element builder.
	pub fn element(tag: impl Into<Cow<'static, str>>) -> PageElement {
		PageElement::new(tag)
	}

	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	/// Trusted markup; the caller guarantees it is well-formed and safe.
	pub fn raw(markup: impl Into<Cow<'static, str>>) -> Self {
		Self::Raw(markup.into())
	}

	pub fn fragment(children: impl IntoIterator<Item = impl IntoPage>) -> Self {
		Self::Fragment(children.into_iter().map(IntoPage::into_page).collect())
	}

	pub fn empty() -> Self {
		Self::Empty
	}

	/// Wraps pending content in a suspense boundary.
	///
	/// # Examples
	///
	/// ```
	/// use theresa_pages::component::Page;
	///
	/// let page = Page::suspense(Page::text("Loading..."), async {
	///     Ok(Page::text("Loaded"))
	/// });
	/// assert_eq!(page.into_html(), "Loading...");
	/// ```
	pub fn suspense<F>(fallback: impl IntoPage, pending: F) -> Self
	where
		F: Future<Output = Result<Page, RenderError>> + Send + 'static,
	{
		Self::Suspense(SuspenseBoundary {
			fallback: Box::new(fallback.into_page()),
			pending: pending.boxed(),
		})
	}

	/// Returns the outermost element of this tree, looking through fragments.
	pub fn root_element(&self) -> Option<&PageElement> {
		match self {
			Self::Element(el) => Some(el),
			Self::Fragment(children) => children.iter().find_map(Page::root_element),
			_ => None,
		}
	}

	/// Serializes the tree, rendering every suspense boundary as its fallback.
	pub fn into_html(self) -> String {
		let mut output = String::new();
		self.write_html(&mut output, &mut write_fallback);
		output
	}

	/// Serializes the tree into `output`, handing each suspense boundary to
	/// `on_suspense` at the position it occupies.
	pub fn write_html<F>(self, output: &mut String, on_suspense: &mut F)
	where
		F: FnMut(SuspenseBoundary, &mut String),
	{
		match self {
			Page::Element(el) => {
				output.push('<');
				output.push_str(&el.tag);

				for (name, value) in &el.attrs {
					output.push(' ');
					output.push_str(name);
					output.push_str("=\"");
					output.push_str(&html_escape(value));
					output.push('"');
				}

				if el.is_void {
					output.push_str(" />");
				} else {
					output.push('>');
					for child in el.children {
						child.write_html(output, on_suspense);
					}
					output.push_str("</");
					output.push_str(&el.tag);
					output.push('>');
				}
			}
			Page::Text(text) => output.push_str(&html_escape(&text)),
			Page::Raw(markup) => output.push_str(&markup),
			Page::Fragment(children) => {
				for child in children {
					child.write_html(output, on_suspense);
				}
			}
			Page::Suspense(boundary) => on_suspense(boundary, output),
			Page::Empty => {}
		}
	}
}

fn write_fallback(boundary: SuspenseBoundary, output: &mut String) {
	boundary.fallback.write_html(output, &mut write_fallback);
}

/// Replaces every suspense boundary with its resolved content.
///
/// Sibling boundaries resolve concurrently; nested boundaries uncovered by a
/// resolution are resolved in turn. The first failure aborts the whole tree.
pub fn resolve_suspense(page: Page) -> BoxFuture<'static, Result<Page, RenderError>> {
	async move {
		match page {
			Page::Element(mut el) => {
				let children = std::mem::take(&mut el.children);
				el.children = try_join_all(children.into_iter().map(resolve_suspense)).await?;
				Ok(Page::Element(el))
			}
			Page::Fragment(children) => Ok(Page::Fragment(
				try_join_all(children.into_iter().map(resolve_suspense)).await?,
			)),
			Page::Suspense(boundary) => resolve_suspense(boundary.pending.await?).await,
			other => Ok(other),
		}
	}
	.boxed()
}

/// Conversion into a [`Page`].
pub trait IntoPage {
	fn into_page(self) -> Page;
}

impl IntoPage for Page {
	fn into_page(self) -> Page {
		self
	}
}

impl IntoPage for PageElement {
	fn into_page(self) -> Page {
		Page::Element(self)
	}
}

impl IntoPage for String {
	fn into_page(self) -> Page {
		Page::Text(Cow::Owned(self))
	}
}

impl IntoPage for &'static str {
	fn into_page(self) -> Page {
		Page::Text(Cow::Borrowed(self))
	}
}

impl<T: IntoPage> IntoPage for Option<T> {
	fn into_page(self) -> Page {
		match self {
			Some(page) => page.into_page(),
			None => Page::Empty,
		}
	}
}

impl<T: IntoPage> IntoPage for Vec<T> {
	fn into_page(self) -> Page {
		Page::Fragment(self.into_iter().map(IntoPage::into_page).collect())
	}
}

impl IntoPage for () {
	fn into_page(self) -> Page {
		Page::Empty
	}
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Reverses [`html_escape`].
pub fn html_unescape(s: &str) -> Cow<'_, str> {
	if !s.contains('&') {
		return Cow::Borrowed(s);
	}
	Cow::Owned(
		s.replace("&lt;", "<")
			.replace("&gt;", ">")
			.replace("&quot;", "\"")
			.replace("&#x27;", "'")
			.replace("&amp;", "&"),
	)
}

//! HTML shell composition.
//!
//! The shell template carries two marker comments, each exactly once:
//! [`ROUTE_MARKER`] becomes an inline script assigning the serialized route to
//! `window.__INITIAL_ROUTE__`, and [`MARKUP_MARKER`] becomes the rendered
//! application markup (or the seam a stream is piped through).

use std::ops::Range;
use theresa_urls::Route;

/// Marker replaced by the initial-route script.
pub const ROUTE_MARKER: &str = "<!--initial-route-->";

/// Marker replaced by the application markup.
pub const MARKUP_MARKER: &str = "<!--app-html-->";

/// Global slot carrying the route to the browser.
pub const INITIAL_ROUTE_GLOBAL: &str = "__INITIAL_ROUTE__";

/// Template errors. Both are configuration errors: a template that fails here
/// can never produce a correct page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
	#[error("Template is missing the {0} marker")]
	MissingMarker(&'static str),
	#[error("Template contains the {0} marker more than once")]
	DuplicateMarker(&'static str),
}

fn find_unique(template: &str, marker: &'static str) -> Result<usize, TemplateError> {
	let at = template
		.find(marker)
		.ok_or(TemplateError::MissingMarker(marker))?;
	if template[at + marker.len()..].contains(marker) {
		return Err(TemplateError::DuplicateMarker(marker));
	}
	Ok(at)
}

/// Escapes a JSON document for embedding in an inline `<script>`.
///
/// `<`, `>` and `&` become unicode escapes, so the output can neither close
/// the script element nor open a comment; U+2028 and U+2029 are escaped
/// because older engines treat them as line terminators inside literals.
pub fn escape_json_for_script(json: &str) -> String {
	let mut escaped = String::with_capacity(json.len());
	for c in json.chars() {
		match c {
			'<' => escaped.push_str("\\u003c"),
			'>' => escaped.push_str("\\u003e"),
			'&' => escaped.push_str("\\u0026"),
			'\u{2028}' => escaped.push_str("\\u2028"),
			'\u{2029}' => escaped.push_str("\\u2029"),
			_ => escaped.push(c),
		}
	}
	escaped
}

/// Builds the inline script carrying the initial route.
///
/// ```
/// use theresa_pages::ssr::route_script;
/// use theresa_urls::Route;
///
/// assert_eq!(
///     route_script(&Route::MovieDetail("42".into())),
///     r#"<script>window.__INITIAL_ROUTE__ = "/movie/42";</script>"#
/// );
/// ```
pub fn route_script(route: &Route) -> String {
	let json = serde_json::Value::String(route.path()).to_string();
	format!(
		"<script>window.{} = {};</script>",
		INITIAL_ROUTE_GLOBAL,
		escape_json_for_script(&json)
	)
}

/// Replaces the route marker with the initial-route script.
pub fn inject_route(template: &str, route: &Route) -> Result<String, TemplateError> {
	let at = find_unique(template, ROUTE_MARKER)?;
	Ok(splice(template, at, ROUTE_MARKER, &route_script(route)))
}

/// Replaces the markup marker with the rendered application markup.
pub fn inject_markup(template: &str, markup: &str) -> Result<String, TemplateError> {
	let at = find_unique(template, MARKUP_MARKER)?;
	Ok(splice(template, at, MARKUP_MARKER, markup))
}

/// Splits the template around the markup marker into `(head, tail)`.
pub fn split_at_markup_marker(template: &str) -> Result<(&str, &str), TemplateError> {
	let at = find_unique(template, MARKUP_MARKER)?;
	Ok((&template[..at], &template[at + MARKUP_MARKER.len()..]))
}

fn splice(template: &str, at: usize, marker: &str, replacement: &str) -> String {
	let mut out = String::with_capacity(template.len() + replacement.len());
	out.push_str(&template[..at]);
	out.push_str(replacement);
	out.push_str(&template[at + marker.len()..]);
	out
}

/// A validated shell template.
///
/// Marker positions are located once by [`HtmlTemplate::parse`]; composition
/// afterwards is pure concatenation and cannot fail, whatever the markup
/// contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTemplate {
	source: String,
	route_at: usize,
	markup_at: usize,
}

impl HtmlTemplate {
	/// Validates that both markers occur exactly once.
	///
	/// ```
	/// use theresa_pages::ssr::{HtmlTemplate, TemplateError};
	///
	/// assert!(HtmlTemplate::parse("<head><!--initial-route--></head><body><!--app-html--></body>").is_ok());
	/// assert_eq!(
	///     HtmlTemplate::parse("<body><!--app-html--></body>"),
	///     Err(TemplateError::MissingMarker("<!--initial-route-->"))
	/// );
	/// ```
	pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
		let source = source.into();
		let route_at = find_unique(&source, ROUTE_MARKER)?;
		let markup_at = find_unique(&source, MARKUP_MARKER)?;
		Ok(Self {
			source,
			route_at,
			markup_at,
		})
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	/// Produces the complete document for sync rendering.
	pub fn compose(&self, route: &Route, markup: &str) -> String {
		let (head, tail) = self.split(route);
		let mut out = String::with_capacity(head.len() + markup.len() + tail.len());
		out.push_str(&head);
		out.push_str(markup);
		out.push_str(&tail);
		out
	}

	/// Produces the fragments written before and after a streamed body, with
	/// the route script already injected into whichever side holds its marker.
	pub fn split(&self, route: &Route) -> (String, String) {
		let script = route_script(route);
		let head = self.render_range(0..self.markup_at, &script);
		let tail = self.render_range(self.markup_at + MARKUP_MARKER.len()..self.source.len(), &script);
		(head, tail)
	}

	fn render_range(&self, range: Range<usize>, script: &str) -> String {
		let route_range = self.route_at..self.route_at + ROUTE_MARKER.len();
		if range.start <= route_range.start && route_range.end <= range.end {
			let mut out = String::with_capacity(range.len() + script.len());
			out.push_str(&self.source[range.start..route_range.start]);
			out.push_str(script);
			out.push_str(&self.source[route_range.end..range.end]);
			out
		} else {
			self.source[range].to_string()
		}
	}
}

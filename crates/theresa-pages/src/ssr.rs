//! Server-side rendering.
//!
//! - [`template`]: the HTML shell and its two markers
//! - [`stream`]: the streaming render event protocol
//! - [`renderer`]: per-request entry points used by the server

pub mod renderer;
pub mod stream;
pub mod template;

pub use renderer::{AppRenderer, RenderOutput, SsrEntry, StreamingRender, render_to_string};
pub use stream::{RenderEvent, RenderOptions, RenderStream, SWAP_HELPER};
pub use template::{
	HtmlTemplate, INITIAL_ROUTE_GLOBAL, MARKUP_MARKER, ROUTE_MARKER, TemplateError,
	escape_json_for_script, inject_markup, inject_route, route_script, split_at_markup_marker,
};

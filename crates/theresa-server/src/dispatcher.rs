//! Request dispatch for server rendering.
//!
//! Every request walks the same state machine:
//!
//! ```text
//! received -> asset-served
//! received -> routing -> rendering -> shell-ready -> streaming -> completed
//!                                  \-> shell-error -> completed
//! ```
//!
//! Production looks assets up in the bundled client build, development in
//! the wasm-pack output and `public/`. Nothing is retried: a
//! failure is reported once, through the status line if it happens before
//! the shell, or inline in the body if it happens after.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use hyper::StatusCode;
use std::fmt;
use std::sync::Arc;
use theresa_conf::{RunMode, Settings};
use theresa_http::{BoxError, Handler, Request, Response, Result};
use theresa_pages::ssr::{RenderEvent, RenderStream, StreamingRender};

use crate::loader::ModuleLoader;
use crate::static_files::StaticAssetResponder;

/// Markup appended when a boundary fails after the shell was sent.
pub const STREAM_ERROR_MARKUP: &str = "<h1>Something went wrong</h1>";

const PRODUCTION_ERROR_BODY: &str = "Internal Server Error";

/// Lifecycle of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
	Received,
	AssetServed,
	Routing,
	Rendering,
	ShellReady,
	ShellError,
	Streaming,
	Completed,
}

impl fmt::Display for RequestState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Received => "received",
			Self::AssetServed => "asset-served",
			Self::Routing => "routing",
			Self::Rendering => "rendering",
			Self::ShellReady => "shell-ready",
			Self::ShellError => "shell-error",
			Self::Streaming => "streaming",
			Self::Completed => "completed",
		})
	}
}

fn enter(state: RequestState, path: &str) {
	tracing::debug!(state = %state, path = %path, "request state");
}

/// Serves static assets and renders everything else.
pub struct SsrDispatcher {
	mode: RunMode,
	assets: Vec<StaticAssetResponder>,
	loader: Arc<dyn ModuleLoader>,
	streaming: bool,
}

impl fmt::Debug for SsrDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SsrDispatcher")
			.field("mode", &self.mode)
			.field("assets", &self.assets)
			.field("streaming", &self.streaming)
			.finish_non_exhaustive()
	}
}

impl SsrDispatcher {
	/// Creates a streaming dispatcher serving assets from
	/// [`Settings::asset_dirs`].
	pub fn new(settings: &Settings, loader: Arc<dyn ModuleLoader>) -> Self {
		let assets = settings
			.asset_dirs()
			.into_iter()
			.map(StaticAssetResponder::new)
			.collect();
		Self {
			mode: settings.mode,
			assets,
			loader,
			streaming: true,
		}
	}

	/// Switches between streaming responses and fully buffered ones.
	///
	/// Buffered responses wait for every boundary and carry complete markup,
	/// for clients that cannot run the swap scripts.
	pub fn with_streaming(mut self, streaming: bool) -> Self {
		self.streaming = streaming;
		self
	}

	pub fn mode(&self) -> RunMode {
		self.mode
	}

	/// A 500 response for `err`. Development shows the whole report,
	/// production a fixed message.
	fn error_response(&self, err: anyhow::Error) -> Response {
		tracing::error!(error = ?err, "SSR render error");
		match self.mode {
			RunMode::Development => {
				Response::text(StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", err))
			}
			RunMode::Production => {
				Response::text(StatusCode::INTERNAL_SERVER_ERROR, PRODUCTION_ERROR_BODY)
			}
		}
	}

	async fn render_buffered(&self, url: &str) -> Response {
		let module = match self.loader.load().await {
			Ok(module) => module,
			Err(err) => return self.error_response(anyhow::Error::new(err)),
		};

		enter(RequestState::Rendering, url);
		match module.entry.render(url).await {
			Ok(output) => {
				let html = module.template.compose(&output.route, &output.markup);
				enter(RequestState::Completed, url);
				Response::html(output.status, html)
			}
			Err(err) => {
				enter(RequestState::ShellError, url);
				self.error_response(anyhow::Error::new(err).context(format!("rendering {}", url)))
			}
		}
	}

	async fn render_streaming(&self, url: &str) -> Response {
		let module = match self.loader.load().await {
			Ok(module) => module,
			Err(err) => return self.error_response(anyhow::Error::new(err)),
		};

		enter(RequestState::Rendering, url);
		let StreamingRender {
			mut stream,
			route,
			status,
		} = module.entry.render_stream(url);

		match stream.next().await {
			Some(RenderEvent::ShellReady) => {
				enter(RequestState::ShellReady, url);
				let (head, tail) = module.template.split(&route);
				let body = streaming_body(url.to_string(), head, stream, tail);
				Response::new(status)
					.with_content_type("text/html")
					.chunked()
					.with_stream(body)
			}
			Some(RenderEvent::ShellError(err)) => {
				enter(RequestState::ShellError, url);
				self.error_response(anyhow::Error::new(err).context(format!("rendering {}", url)))
			}
			other => {
				enter(RequestState::ShellError, url);
				self.error_response(anyhow::anyhow!(
					"render of {} ended before its shell: {:?}",
					url,
					other
				))
			}
		}
	}
}

struct BodyState {
	url: String,
	head: Option<Bytes>,
	events: RenderStream,
	tail: Option<Bytes>,
	finished: bool,
}

/// Head fragment, rendered chunks in order, then the tail fragment.
///
/// A post-shell failure appends [`STREAM_ERROR_MARKUP`] and ends the body
/// without the tail; the status line is already on the wire.
fn streaming_body(
	url: String,
	head: String,
	events: RenderStream,
	tail: String,
) -> impl Stream<Item = std::result::Result<Bytes, BoxError>> + Send + 'static {
	let state = BodyState {
		url,
		head: Some(Bytes::from(head)),
		events,
		tail: Some(Bytes::from(tail)),
		finished: false,
	};

	stream::unfold(state, |mut state| async move {
		if let Some(head) = state.head.take() {
			enter(RequestState::Streaming, &state.url);
			return Some((Ok(head), state));
		}
		if state.finished {
			return None;
		}

		loop {
			match state.events.next().await {
				Some(RenderEvent::Chunk(chunk)) => return Some((Ok(chunk), state)),
				Some(RenderEvent::StreamError(err)) => {
					tracing::error!(path = %state.url, error = %err, "render failed after shell");
					state.finished = true;
					enter(RequestState::Completed, &state.url);
					return Some((Ok(Bytes::from_static(STREAM_ERROR_MARKUP.as_bytes())), state));
				}
				Some(RenderEvent::AllReady) => {
					tracing::debug!(path = %state.url, "all boundaries resolved");
				}
				Some(RenderEvent::ShellReady | RenderEvent::ShellError(_)) => {}
				Some(RenderEvent::Done) | None => {
					state.finished = true;
					enter(RequestState::Completed, &state.url);
					let tail = state.tail.take()?;
					return Some((Ok(tail), state));
				}
			}
		}
	})
}

#[async_trait]
impl Handler for SsrDispatcher {
	async fn handle(&self, request: Request) -> Result<Response> {
		let target = request.path_and_query();
		enter(RequestState::Received, target);

		for assets in &self.assets {
			if let Some(response) = assets.try_serve(target).await {
				enter(RequestState::AssetServed, target);
				return Ok(response);
			}
		}

		let url = request.path();
		enter(RequestState::Routing, url);

		let response = if self.streaming {
			self.render_streaming(url).await
		} else {
			self.render_buffered(url).await
		};
		Ok(response)
	}
}

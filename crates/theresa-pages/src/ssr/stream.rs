//! Streaming render.
//!
//! A [`RenderStream`] turns a page tree into an ordered sequence of
//! [`RenderEvent`]s:
//!
//! ```text
//! ShellReady, Chunk(shell), (Chunk | StreamError)*, AllReady, Done
//! ShellError, Done
//! ```
//!
//! The shell is everything that renders without waiting: suspense boundaries
//! contribute their fallback wrapped in a placeholder. Each boundary that
//! resolves later streams its content in a hidden container followed by a
//! call to a small swap helper that moves it into the placeholder. A boundary
//! whose data fails reports `StreamError` and keeps its fallback.

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::RenderError;
use crate::component::{Page, SuspenseBoundary};

/// Client helper that swaps a resolved boundary into its placeholder.
///
/// `$RC(b, s)` removes the fallback between template `b` and the closing
/// `<!--/$-->` comment, moves the children of container `s` in its place and
/// marks the opening comment as resolved.
pub const SWAP_HELPER: &str = "<script>function $RC(b,s){var t=document.getElementById(b),\
n=document.getElementById(s);if(!t||!n)return;var p=t.parentNode,o=t.previousSibling,e=t;\
while(e&&!(e.nodeType===8&&e.data==='/$')){var x=e.nextSibling;p.removeChild(e);e=x}\
while(n.firstChild)p.insertBefore(n.firstChild,e);n.parentNode.removeChild(n);\
if(o&&o.nodeType===8)o.data='$'}</script>";

/// A lifecycle event of a streaming render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
	/// The shell is ready; status and headers may be committed.
	ShellReady,
	/// No shell could be produced.
	ShellError(RenderError),
	/// Markup to append to the response, in order.
	Chunk(Bytes),
	/// A boundary failed after the shell was committed.
	StreamError(RenderError),
	/// Every boundary has settled.
	AllReady,
	/// The render is over; nothing follows.
	Done,
}

type PendingBoundary = BoxFuture<'static, (u32, Result<Page, RenderError>)>;

enum Phase {
	Start(Option<Result<Page, RenderError>>),
	Streaming,
	Finished,
}

/// Event stream of one render. Consumed exactly once.
pub struct RenderStream {
	phase: Phase,
	pending: FuturesUnordered<PendingBoundary>,
	queue: VecDeque<RenderEvent>,
	next_boundary: u32,
	helper_sent: bool,
}

impl RenderStream {
	/// Starts a render of `page`. An `Err` is reported as a shell error.
	pub fn new(page: Result<Page, RenderError>) -> Self {
		Self {
			phase: Phase::Start(Some(page)),
			pending: FuturesUnordered::new(),
			queue: VecDeque::new(),
			next_boundary: 0,
			helper_sent: false,
		}
	}

	/// Wraps the stream with lifecycle callbacks.
	pub fn with_callbacks(self, mut options: RenderOptions) -> impl Stream<Item = RenderEvent> + Send {
		self.inspect(move |event| options.dispatch(event))
	}

	/// Renders `page` into markup, registering its boundaries.
	fn render_markup(&mut self, page: Page) -> String {
		let mut markup = String::new();
		let next_boundary = &mut self.next_boundary;
		let pending = &mut self.pending;
		page.write_html(&mut markup, &mut |boundary: SuspenseBoundary, out: &mut String| {
			let id = *next_boundary;
			*next_boundary += 1;
			let (fallback, content) = boundary.into_parts();

			let _ = write!(out, "<!--$?--><template id=\"B:{}\"></template>", id);
			out.push_str(&fallback.into_html());
			out.push_str("<!--/$-->");

			pending.push(content.map(move |result| (id, result)).boxed());
		});
		markup
	}

	fn resolution_chunk(&mut self, id: u32, page: Page) -> Bytes {
		let content = self.render_markup(page);
		let mut chunk = String::with_capacity(content.len() + 96);
		if !self.helper_sent {
			chunk.push_str(SWAP_HELPER);
			self.helper_sent = true;
		}
		let _ = write!(
			chunk,
			"<div hidden id=\"S:{id}\">{content}</div><script>$RC(\"B:{id}\",\"S:{id}\")</script>"
		);
		Bytes::from(chunk)
	}

	fn finish(&mut self) {
		self.queue.push_back(RenderEvent::AllReady);
		self.queue.push_back(RenderEvent::Done);
		self.phase = Phase::Finished;
	}
}

impl Stream for RenderStream {
	type Item = RenderEvent;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = &mut *self;
		loop {
			if let Some(event) = this.queue.pop_front() {
				return Poll::Ready(Some(event));
			}

			match &mut this.phase {
				Phase::Start(page) => match page.take() {
					Some(Ok(page)) => {
						let shell = this.render_markup(page);
						tracing::debug!(
							boundaries = this.pending.len(),
							bytes = shell.len(),
							"shell rendered"
						);
						this.queue.push_back(RenderEvent::ShellReady);
						if !shell.is_empty() {
							this.queue.push_back(RenderEvent::Chunk(Bytes::from(shell)));
						}
						this.phase = Phase::Streaming;
					}
					Some(Err(err)) => {
						this.queue.push_back(RenderEvent::ShellError(err));
						this.queue.push_back(RenderEvent::Done);
						this.phase = Phase::Finished;
					}
					None => this.phase = Phase::Finished,
				},
				Phase::Streaming => {
					if this.pending.is_empty() {
						this.finish();
						continue;
					}
					match this.pending.poll_next_unpin(cx) {
						Poll::Ready(Some((id, Ok(page)))) => {
							tracing::debug!(boundary = id, "boundary resolved");
							let chunk = this.resolution_chunk(id, page);
							this.queue.push_back(RenderEvent::Chunk(chunk));
						}
						Poll::Ready(Some((id, Err(err)))) => {
							tracing::warn!(boundary = id, error = %err, "boundary failed");
							this.queue.push_back(RenderEvent::StreamError(err));
						}
						Poll::Ready(None) => this.finish(),
						Poll::Pending => return Poll::Pending,
					}
				}
				Phase::Finished => return Poll::Ready(None),
			}
		}
	}
}

type Callback = Box<dyn FnMut() + Send>;
type ErrorCallback = Box<dyn FnMut(&RenderError) + Send>;

/// Lifecycle callbacks for callers that prefer them to matching on events.
///
/// Callbacks fire while the stream is polled, in event order.
#[derive(Default)]
pub struct RenderOptions {
	on_shell_ready: Option<Callback>,
	on_shell_error: Option<ErrorCallback>,
	on_all_ready: Option<Callback>,
	on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for RenderOptions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RenderOptions")
			.field("on_shell_ready", &self.on_shell_ready.is_some())
			.field("on_shell_error", &self.on_shell_error.is_some())
			.field("on_all_ready", &self.on_all_ready.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

impl RenderOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_shell_ready(mut self, callback: impl FnMut() + Send + 'static) -> Self {
		self.on_shell_ready = Some(Box::new(callback));
		self
	}

	pub fn on_shell_error(mut self, callback: impl FnMut(&RenderError) + Send + 'static) -> Self {
		self.on_shell_error = Some(Box::new(callback));
		self
	}

	pub fn on_all_ready(mut self, callback: impl FnMut() + Send + 'static) -> Self {
		self.on_all_ready = Some(Box::new(callback));
		self
	}

	pub fn on_error(mut self, callback: impl FnMut(&RenderError) + Send + 'static) -> Self {
		self.on_error = Some(Box::new(callback));
		self
	}

	fn dispatch(&mut self, event: &RenderEvent) {
		match event {
			RenderEvent::ShellReady => {
				if let Some(callback) = self.on_shell_ready.as_mut() {
					callback();
				}
			}
			RenderEvent::ShellError(err) => {
				if let Some(callback) = self.on_shell_error.as_mut() {
					callback(err);
				}
			}
			RenderEvent::StreamError(err) => {
				if let Some(callback) = self.on_error.as_mut() {
					callback(err);
				}
			}
			RenderEvent::AllReady => {
				if let Some(callback) = self.on_all_ready.as_mut() {
					callback();
				}
			}
			RenderEvent::Chunk(_) | RenderEvent::Done => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::IntoPage;
	use futures::channel::oneshot;
	use rstest::rstest;
	use std::sync::{Arc, Mutex};

	fn chunk_text(event: &RenderEvent) -> Option<String> {
		match event {
			RenderEvent::Chunk(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
			_ => None,
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_page_without_boundaries() {
		let page = Page::element("p").child("static").into_page();
		let events: Vec<_> = RenderStream::new(Ok(page)).collect().await;

		assert_eq!(
			events,
			vec![
				RenderEvent::ShellReady,
				RenderEvent::Chunk(Bytes::from_static(b"<p>static</p>")),
				RenderEvent::AllReady,
				RenderEvent::Done,
			]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_shell_error_never_reports_shell_ready() {
		let events: Vec<_> = RenderStream::new(Err(RenderError::component("App", "boom")))
			.collect()
			.await;

		assert_eq!(
			events,
			vec![
				RenderEvent::ShellError(RenderError::component("App", "boom")),
				RenderEvent::Done,
			]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_boundary_streams_after_shell() {
		let page = Page::element("main")
			.child(Page::suspense("Loading", async { Ok(Page::text("Loaded")) }))
			.into_page();
		let events: Vec<_> = RenderStream::new(Ok(page)).collect().await;

		assert_eq!(events[0], RenderEvent::ShellReady);
		assert_eq!(
			chunk_text(&events[1]).unwrap(),
			"<main><!--$?--><template id=\"B:0\"></template>Loading<!--/$--></main>"
		);
		let resolution = chunk_text(&events[2]).unwrap();
		assert!(resolution.starts_with(SWAP_HELPER));
		assert!(resolution.ends_with(
			"<div hidden id=\"S:0\">Loaded</div><script>$RC(\"B:0\",\"S:0\")</script>"
		));
		assert_eq!(&events[3..], &[RenderEvent::AllReady, RenderEvent::Done]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_boundaries_stream_in_completion_order() {
		let (first_tx, first_rx) = oneshot::channel::<()>();
		let (second_tx, second_rx) = oneshot::channel::<()>();
		let page = Page::fragment(vec![
			Page::suspense("a...", async move {
				first_rx.await.map_err(RenderError::data)?;
				Ok(Page::text("A"))
			}),
			Page::suspense("b...", async move {
				second_rx.await.map_err(RenderError::data)?;
				Ok(Page::text("B"))
			}),
		]);

		let mut stream = RenderStream::new(Ok(page));
		assert_eq!(stream.next().await, Some(RenderEvent::ShellReady));
		assert!(stream.next().await.is_some());

		second_tx.send(()).unwrap();
		let b = chunk_text(&stream.next().await.unwrap()).unwrap();
		assert!(b.starts_with(SWAP_HELPER));
		assert!(b.contains("id=\"S:1\">B</div>"));

		first_tx.send(()).unwrap();
		let a = chunk_text(&stream.next().await.unwrap()).unwrap();
		assert!(!a.contains("function $RC"));
		assert!(a.contains("id=\"S:0\">A</div>"));

		assert_eq!(stream.next().await, Some(RenderEvent::AllReady));
		assert_eq!(stream.next().await, Some(RenderEvent::Done));
		assert_eq!(stream.next().await, None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_nested_boundary_gets_fresh_id() {
		let page = Page::suspense("outer...", async {
			Ok(Page::element("section")
				.child(Page::suspense("inner...", async { Ok(Page::text("inner")) }))
				.into_page())
		});
		let events: Vec<_> = RenderStream::new(Ok(page)).collect().await;
		let chunks: Vec<String> = events.iter().filter_map(chunk_text).collect();

		assert_eq!(chunks.len(), 3);
		assert!(chunks[1].contains(
			"<div hidden id=\"S:0\"><section><!--$?--><template id=\"B:1\"></template>inner...<!--/$--></section></div>"
		));
		assert!(chunks[2].contains("<div hidden id=\"S:1\">inner</div>"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_failed_boundary_reports_stream_error_and_continues() {
		let page = Page::fragment(vec![
			Page::suspense("x", async { Err(RenderError::data("catalog offline")) }),
			Page::suspense("y", async { Ok(Page::text("fine")) }),
		]);
		let events: Vec<_> = RenderStream::new(Ok(page)).collect().await;

		let shell_ready = events.iter().filter(|e| **e == RenderEvent::ShellReady).count();
		assert_eq!(shell_ready, 1);
		assert!(events.contains(&RenderEvent::StreamError(RenderError::data("catalog offline"))));
		assert!(events.iter().filter_map(chunk_text).any(|c| c.contains(">fine</div>")));
		assert_eq!(events.last(), Some(&RenderEvent::Done));
	}

	#[rstest]
	#[tokio::test]
	async fn test_callbacks_fire_in_event_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let options = {
			let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
			RenderOptions::new()
				.on_shell_ready(move || a.lock().unwrap().push("shell-ready".to_string()))
				.on_shell_error(move |e| b.lock().unwrap().push(format!("shell-error: {e}")))
				.on_error(move |e| c.lock().unwrap().push(format!("error: {e}")))
				.on_all_ready(move || d.lock().unwrap().push("all-ready".to_string()))
		};
		let page = Page::suspense("...", async { Err(RenderError::data("late")) });

		let _: Vec<_> = RenderStream::new(Ok(page)).with_callbacks(options).collect().await;

		assert_eq!(
			*log.lock().unwrap(),
			vec![
				"shell-ready".to_string(),
				"error: Data dependency failed: late".to_string(),
				"all-ready".to_string(),
			]
		);
	}
}

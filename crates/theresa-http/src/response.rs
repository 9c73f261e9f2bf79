use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue, TRANSFER_ENCODING};
use hyper::{HeaderMap, StatusCode};
use std::fmt;
use std::pin::Pin;

use crate::BoxError;

/// Type alias for streaming body
pub type StreamBody = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Body of a [`Response`].
pub enum ResponseBody {
	/// A complete, buffered body.
	Full(Bytes),
	/// A body produced incrementally; frames are written in stream order.
	Stream(StreamBody),
}

impl fmt::Debug for ResponseBody {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
			Self::Stream(_) => f.write_str("Stream(..)"),
		}
	}
}

impl Default for ResponseBody {
	fn default() -> Self {
		Self::Full(Bytes::new())
	}
}

impl ResponseBody {
	/// Returns true for streamed bodies.
	pub fn is_stream(&self) -> bool {
		matches!(self, Self::Stream(_))
	}

	/// Collects the whole body into memory.
	///
	/// Streamed bodies are drained frame by frame; the first stream error
	/// aborts collection.
	pub async fn collect(self) -> Result<Bytes, BoxError> {
		match self {
			Self::Full(bytes) => Ok(bytes),
			Self::Stream(mut stream) => {
				let mut buffer = Vec::new();
				while let Some(frame) = stream.next().await {
					buffer.extend_from_slice(&frame?);
				}
				Ok(Bytes::from(buffer))
			}
		}
	}
}

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: ResponseBody,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use theresa_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(!response.body.is_stream());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: ResponseBody::default(),
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Set a buffered response body
	///
	/// # Examples
	///
	/// ```
	/// use theresa_http::{Response, ResponseBody};
	///
	/// let response = Response::ok().with_body("Hello, World!");
	/// assert!(matches!(response.body, ResponseBody::Full(ref b) if b == "Hello, World!"));
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = ResponseBody::Full(body.into());
		self
	}

	/// Set a streamed response body
	pub fn with_stream<S>(mut self, stream: S) -> Self
	where
		S: Stream<Item = Result<Bytes, BoxError>> + Send + 'static,
	{
		self.body = ResponseBody::Stream(Box::pin(stream));
		self
	}

	/// Add a custom header to the response
	///
	/// Invalid names or values are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use theresa_http::Response;
	///
	/// let response = Response::ok().with_header("X-Custom-Header", "custom-value");
	/// assert_eq!(
	///     response.headers.get("X-Custom-Header").unwrap().to_str().unwrap(),
	///     "custom-value"
	/// );
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(header_name), Ok(header_value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Set the Content-Type header
	pub fn with_content_type(mut self, media_type: &str) -> Self {
		let value = HeaderValue::from_str(media_type)
			.unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
		self.headers.insert(CONTENT_TYPE, value);
		self
	}

	/// Marks the response as `Transfer-Encoding: chunked`
	pub fn chunked(mut self) -> Self {
		self.headers
			.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
		self
	}

	/// Create an HTML response with the given status and body
	///
	/// # Examples
	///
	/// ```
	/// use theresa_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::html(StatusCode::NOT_FOUND, "<h1>Missing</h1>");
	/// assert_eq!(response.status, StatusCode::NOT_FOUND);
	/// assert_eq!(response.headers.get("content-type").unwrap(), "text/html");
	/// ```
	pub fn html(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self::new(status)
			.with_content_type("text/html")
			.with_body(body)
	}

	/// Create a plain-text response with the given status and body
	pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self::new(status)
			.with_content_type("text/plain")
			.with_body(body)
	}
}

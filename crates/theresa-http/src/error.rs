//! Error types shared by handlers and the server.

/// Boxed error carried by streamed bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for handler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by request handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Malformed HTTP data (invalid header value, bad status line input).
	#[error("HTTP error: {0}")]
	Http(#[from] hyper::http::Error),
	/// Filesystem or socket failure.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// Any other failure inside a handler.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Creates an internal error from any displayable message.
	pub fn internal(message: impl std::fmt::Display) -> Self {
		Self::Internal(message.to_string())
	}
}

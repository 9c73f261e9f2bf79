//! Handler trait for request processing.

use async_trait::async_trait;

use crate::{Request, Response, Result};

/// Handler trait for processing requests.
///
/// Handlers receive a request and produce a response or an error. A returned
/// error is converted into a bare 500 by the server, so handlers that need a
/// specific error body build that response themselves.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for std::sync::Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

//! HTTP primitives for theresa.
//!
//! - [`Request`]: an inbound request with its body already collected
//! - [`Response`]: status, headers, and either a full or a streamed body
//! - [`Handler`]: the async request handling abstraction the server drives
//!
//! ## Example
//!
//! ```rust
//! use theresa_http::{Handler, Request, Response};
//! use async_trait::async_trait;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> theresa_http::Result<Response> {
//!         Ok(Response::ok().with_body("Hello!"))
//!     }
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;

pub use error::{BoxError, Error, Result};
pub use handler::Handler;
pub use request::Request;
pub use response::{Response, ResponseBody, StreamBody};

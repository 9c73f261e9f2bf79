use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use theresa_http::{BoxError, Handler, Request, Response, ResponseBody};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::task::TaskTracker;

use crate::shutdown::ShutdownCoordinator;

/// Body type handed to hyper: a full buffer or frames pulled from a stream.
pub type HttpBody = UnsyncBoxBody<Bytes, BoxError>;

/// HTTP/1.1 server driving a single [`Handler`]
pub struct HttpServer {
	pub handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use theresa_server::HttpServer;
	/// use theresa_http::{Handler, Request, Response};
	///
	/// struct MyHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for MyHandler {
	///     async fn handle(&self, _req: Request) -> theresa_http::Result<Response> {
	///         Ok(Response::ok().with_body("Hello"))
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(MyHandler));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Returns a clone of the server's handler
	pub fn handler(&self) -> Arc<dyn Handler> {
		self.handler.clone()
	}

	/// Start the server with graceful shutdown support
	///
	/// When the coordinator requests shutdown the server stops accepting new
	/// connections and asks open ones to finish their in-flight response.
	/// Completion is reported once the last connection has closed.
	///
	/// # Examples
	///
	/// ```no_run
	/// use std::sync::Arc;
	/// use std::net::SocketAddr;
	/// use std::time::Duration;
	/// use theresa_server::{HttpServer, ShutdownCoordinator};
	/// use theresa_http::{Handler, Request, Response};
	///
	/// struct MyHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for MyHandler {
	///     async fn handle(&self, _req: Request) -> theresa_http::Result<Response> {
	///         Ok(Response::ok())
	///     }
	/// }
	///
	/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
	/// let server = HttpServer::new(Arc::new(MyHandler));
	/// let addr: SocketAddr = "127.0.0.1:8080".parse()?;
	/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
	/// server.listen_with_shutdown(addr, coordinator).await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> std::io::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve_listener(listener, coordinator).await
	}

	/// Serve connections from an already bound listener until shutdown
	///
	/// Binding separately lets callers pick port 0 and read the actual
	/// address before serving.
	pub async fn serve_listener(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> std::io::Result<()> {
		if let Ok(addr) = listener.local_addr() {
			tracing::info!("Server listening on http://{}", addr);
		}

		let mut shutdown_rx = coordinator.subscribe();
		let connections = TaskTracker::new();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, socket_addr) = result?;
					let handler = self.handler.clone();
					let conn_shutdown = coordinator.subscribe();

					connections.spawn(async move {
						if let Err(err) =
							Self::handle_connection_until(stream, socket_addr, handler, conn_shutdown).await
						{
							tracing::warn!(peer = %socket_addr, error = ?err, "Error handling connection");
						}
					});
				}
				_ = shutdown_rx.wait_for(|stop| *stop) => {
					tracing::info!("Shutdown signal received, stopping server...");
					break;
				}
			}
		}

		connections.close();
		tracing::debug!(open = connections.len(), "draining connections");
		connections.wait().await;
		coordinator.notify_shutdown_complete();

		Ok(())
	}

	/// Serves one connection, shutting it down gracefully on request.
	async fn handle_connection_until(
		stream: TcpStream,
		socket_addr: SocketAddr,
		handler: Arc<dyn Handler>,
		mut shutdown: tokio::sync::watch::Receiver<bool>,
	) -> Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr: socket_addr,
		};

		let conn = http1::Builder::new().serve_connection(io, service);
		tokio::pin!(conn);

		tokio::select! {
			result = conn.as_mut() => return result,
			_ = shutdown.wait_for(|stop| *stop) => {
				conn.as_mut().graceful_shutdown();
			}
		}
		conn.await
	}
}

/// Converts a handler response body into the body hyper writes.
///
/// Streamed bodies are forwarded chunk by chunk, in order, as they are
/// produced.
pub fn into_http_body(body: ResponseBody) -> HttpBody {
	match body {
		ResponseBody::Full(bytes) => Full::new(bytes)
			.map_err(|never| match never {})
			.boxed_unsync(),
		ResponseBody::Stream(stream) => {
			http_body_util::StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync()
		}
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<HttpBody>;
	type Error = BoxError;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body_bytes = body.collect().await?.to_bytes();

			let mut request = Request::new(
				parts.method,
				parts.uri,
				parts.version,
				parts.headers,
				body_bytes,
			);
			request.remote_addr = Some(remote_addr);

			let response = handler.handle(request).await.unwrap_or_else(|err| {
				tracing::error!(error = %err, "handler failed");
				Response::internal_server_error()
			});

			let mut hyper_response = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				hyper_response = hyper_response.header(key, value);
			}

			Ok(hyper_response.body(into_http_body(response.body))?)
		})
	}
}

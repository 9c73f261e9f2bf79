//! HTTP server and request dispatch for theresa.
//!
//! This crate turns the rendering pieces of `theresa-pages` into a running
//! process: a hyper HTTP/1.1 listener, a static asset responder for the
//! client build output, the dev/prod render module loaders and the
//! [`SsrDispatcher`] that drives a streaming render into a response.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use theresa_conf::Settings;
//! use theresa_server::{HttpServer, OnceModuleLoader, ShutdownCoordinator, SsrDispatcher};
//! # use theresa_pages::{RenderError, component::Page, ssr::{AppRenderer, SsrEntry}};
//! # use theresa_urls::Resolution;
//! # struct App;
//! # impl AppRenderer for App {
//! #     fn render_route(&self, _: &Resolution) -> Result<Page, RenderError> { Ok(Page::empty()) }
//! # }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let loader = OnceModuleLoader::load_once(&settings.template_path(), SsrEntry::new(App)).await?;
//! let dispatcher = SsrDispatcher::new(&settings, Arc::new(loader));
//!
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! HttpServer::new(Arc::new(dispatcher))
//!     .listen_with_shutdown(settings.bind_addr(), coordinator)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod http;
pub mod loader;
pub mod shutdown;
pub mod static_files;

pub use dispatcher::{RequestState, SsrDispatcher, STREAM_ERROR_MARKUP};
pub use http::HttpServer;
pub use loader::{FreshModuleLoader, LoadError, ModuleLoader, OnceModuleLoader, RenderModule};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
pub use static_files::{StaticAssetResponder, content_type_for};

// Re-export the types handlers work with
pub use theresa_http::{Handler, Request, Response};

//! # theresa
//!
//! A server-rendered movie browser. Every route is rendered on the server,
//! streamed to the browser as soon as the shell is ready, and then hydrated
//! by the same application compiled to WebAssembly.
//!
//! ## Crates
//!
//! - `theresa-urls`: route resolution shared by server and client
//! - `theresa-pages`: page tree, streaming SSR, HTML shell and hydration
//! - `theresa-http`: request, response and handler types
//! - `theresa-conf`: environment-driven settings
//! - `theresa-server`: hyper listener, static assets, render dispatch
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use theresa::conf::Settings;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! theresa::serve::run(settings).await
//! # }
//! ```

pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod client;
#[cfg(not(target_arch = "wasm32"))]
pub mod serve;

pub use theresa_pages as pages;
pub use theresa_urls as urls;

#[cfg(not(target_arch = "wasm32"))]
pub use theresa_conf as conf;
#[cfg(not(target_arch = "wasm32"))]
pub use theresa_http as http;
#[cfg(not(target_arch = "wasm32"))]
pub use theresa_server as server;

pub use app::MovieApp;
pub use theresa_urls::{Resolution, Route, resolve};

/// Re-export commonly used types
pub mod prelude {
	pub use crate::app::{MovieApp, MovieCatalog, StaticCatalog};
	pub use theresa_pages::component::{Component, IntoPage, Page};
	pub use theresa_pages::ssr::{AppRenderer, SsrEntry};
	pub use theresa_pages::RenderError;
	pub use theresa_urls::{Resolution, Route};

	#[cfg(not(target_arch = "wasm32"))]
	pub use theresa_conf::{RunMode, Settings};
	#[cfg(not(target_arch = "wasm32"))]
	pub use theresa_server::{HttpServer, ShutdownCoordinator, SsrDispatcher};
}

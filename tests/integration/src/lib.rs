//! Integration test utilities for theresa
//!
//! Builds throwaway project roots on disk (shell template, client build
//! output, catalog fixtures) and drives the real dispatcher against them.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use theresa::app::{
	CatalogError, MovieApp, MovieCatalog, MovieCategory, MovieDetails, MoviePage,
};
use theresa_conf::{RunMode, Settings};
use theresa_http::Response;
use theresa_pages::ssr::{HtmlTemplate, SsrEntry};
use theresa_server::{OnceModuleLoader, RenderModule, SsrDispatcher};

/// Shell template written to both `index.html` locations.
pub const TEMPLATE: &str = "<!doctype html><html><head><title>MovieApp</title><!--initial-route--></head>\
	<body><div id=\"root\"><!--app-html--></div><script type=\"module\" src=\"/app.js\"></script></body></html>";

/// Contents of `dist/client/app.js`.
pub const APP_JS: &[u8] = b"import init from \"./theresa.js\";\ninit();\n";

/// Contents of `pkg/theresa.js`, the development client build.
pub const DEV_CLIENT_JS: &[u8] = b"export default async function init() {}\n";

/// Contents of a file beside the project root that must never be served.
pub const SECRET: &str = "top secret contents";

/// A project root inside a temporary directory.
///
/// Layout:
///
/// ```text
/// <tmp>/secret.txt
/// <tmp>/project/index.html
/// <tmp>/project/dist/client/index.html
/// <tmp>/project/dist/client/app.js
/// <tmp>/project/pkg/theresa.js
/// ```
pub struct TestProject {
	dir: TempDir,
}

impl TestProject {
	pub fn new() -> Self {
		let dir = TempDir::new().expect("Failed to create temp dir");
		let root = dir.path().join("project");
		let client = root.join("dist").join("client");
		let pkg = root.join("pkg");
		fs::create_dir_all(&client).expect("Failed to create client dir");
		fs::create_dir_all(&pkg).expect("Failed to create pkg dir");

		fs::write(dir.path().join("secret.txt"), SECRET).expect("Failed to write secret");
		fs::write(root.join("index.html"), TEMPLATE).expect("Failed to write template");
		fs::write(client.join("index.html"), TEMPLATE).expect("Failed to write built template");
		fs::write(client.join("app.js"), APP_JS).expect("Failed to write app.js");
		fs::write(pkg.join("theresa.js"), DEV_CLIENT_JS).expect("Failed to write theresa.js");

		Self { dir }
	}

	pub fn root(&self) -> PathBuf {
		self.dir.path().join("project")
	}

	pub fn settings(&self, mode: RunMode) -> Settings {
		Settings::new(self.root()).with_mode(mode)
	}

	/// Writes a catalog fixture and returns its path.
	pub fn write_catalog(&self, json: &str) -> PathBuf {
		let path = self.root().join("catalog.json");
		fs::write(&path, json).expect("Failed to write catalog");
		path
	}

	/// The dispatcher the binary would build for these settings.
	pub async fn dispatcher(&self, mode: RunMode) -> SsrDispatcher {
		theresa::serve::build_dispatcher(&self.settings(mode))
			.await
			.expect("Failed to build dispatcher")
	}

	/// A production dispatcher rendering `app` instead of the sample catalog.
	pub fn dispatcher_for(&self, mode: RunMode, app: MovieApp) -> SsrDispatcher {
		let settings = self.settings(mode);
		let template = HtmlTemplate::parse(TEMPLATE).expect("Template is valid");
		let loader = OnceModuleLoader::from_module(RenderModule::new(template, SsrEntry::new(app)));
		SsrDispatcher::new(&settings, Arc::new(loader))
	}
}

impl Default for TestProject {
	fn default() -> Self {
		Self::new()
	}
}

/// Collects a response body as UTF-8 text.
pub async fn body_text(response: Response) -> String {
	let bytes = response.body.collect().await.expect("Failed to collect body");
	String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub fn content_type(response: &Response) -> Option<&str> {
	response
		.headers
		.get("content-type")
		.and_then(|value| value.to_str().ok())
}

/// A catalog whose every lookup fails, for exercising post-shell errors.
pub struct OfflineCatalog;

#[async_trait]
impl MovieCatalog for OfflineCatalog {
	async fn movies_by_category(
		&self,
		_category: MovieCategory,
		_page: u32,
	) -> Result<MoviePage, CatalogError> {
		Err(CatalogError::Unavailable("catalog offline".to_string()))
	}

	async fn movie_details(&self, _id: &str) -> Result<MovieDetails, CatalogError> {
		Err(CatalogError::Unavailable("catalog offline".to_string()))
	}

	async fn search(&self, _query: &str, _page: u32) -> Result<MoviePage, CatalogError> {
		Err(CatalogError::Unavailable("catalog offline".to_string()))
	}
}

//! Static asset responder for the client build output.
//!
//! Only regular files that resolve inside the asset root are served. Anything
//! else (missing files, directories, traversal attempts, undecodable paths)
//! is "not handled" and falls through to server rendering, which owns the
//! 404 for unknown paths.

use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use theresa_http::{BoxError, Response};
use theresa_utils::safe_path_join;
use tokio_util::io::ReaderStream;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type for a file, from its extension.
///
/// ```
/// use std::path::Path;
/// use theresa_server::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("app.js")), "text/javascript");
/// assert_eq!(content_type_for(Path::new("font.WOFF2")), "font/woff2");
/// assert_eq!(content_type_for(Path::new("archive.tar")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
	let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
		return DEFAULT_CONTENT_TYPE;
	};
	match ext.to_ascii_lowercase().as_str() {
		"js" | "mjs" | "cjs" => "text/javascript",
		"css" => "text/css",
		"html" => "text/html",
		"json" => "application/json",
		"ico" => "image/x-icon",
		"png" => "image/png",
		"jpg" | "jpeg" => "image/jpeg",
		"svg" => "image/svg+xml",
		"gif" => "image/gif",
		"webp" => "image/webp",
		"txt" => "text/plain",
		"woff" => "font/woff",
		"woff2" => "font/woff2",
		_ => DEFAULT_CONTENT_TYPE,
	}
}

/// Serves files below a fixed root directory.
#[derive(Debug, Clone)]
pub struct StaticAssetResponder {
	root: PathBuf,
	canonical_root: PathBuf,
}

impl StaticAssetResponder {
	/// Creates a responder for `root`.
	///
	/// The root does not have to exist yet; until it does, nothing is served.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root = root.into();
		let canonical_root = std::fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
		Self {
			root,
			canonical_root,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolves a request path to a servable file, or `None`.
	pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
		let raw = theresa_urls::strip_query(request_path);
		let decoded = match urlencoding::decode(raw) {
			Ok(decoded) => decoded,
			Err(err) => {
				tracing::debug!(path = %raw, error = %err, "asset path is not valid UTF-8");
				return None;
			}
		};

		if decoded.is_empty() || decoded == "/" {
			return None;
		}

		let candidate = match safe_path_join(&self.canonical_root, &decoded) {
			Ok(candidate) => candidate,
			Err(err) => {
				tracing::debug!(path = %decoded, error = %err, "asset path rejected");
				return None;
			}
		};

		// Symlinks may still point outside the root.
		let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
		if !resolved.starts_with(&self.canonical_root) {
			tracing::debug!(path = %decoded, "asset resolves outside the root");
			return None;
		}

		let metadata = tokio::fs::metadata(&resolved).await.ok()?;
		metadata.is_file().then_some(resolved)
	}

	/// Serves `request_path` if it names a file under the root.
	///
	/// Returns `None` when the request is not an asset; this never produces
	/// an error response of its own.
	pub async fn try_serve(&self, request_path: &str) -> Option<Response> {
		let path = self.resolve(request_path).await?;
		let file = match tokio::fs::File::open(&path).await {
			Ok(file) => file,
			Err(err) => {
				tracing::debug!(path = %path.display(), error = %err, "asset could not be opened");
				return None;
			}
		};
		let length = file.metadata().await.ok().map(|metadata| metadata.len());

		tracing::debug!(path = %path.display(), "serving static asset");
		let body = ReaderStream::new(file).map_err(|err| Box::new(err) as BoxError);
		let mut response = Response::ok()
			.with_content_type(content_type_for(&path))
			.with_stream(body);
		if let Some(length) = length {
			response = response.with_header("content-length", &length.to_string());
		}
		Some(response)
	}
}

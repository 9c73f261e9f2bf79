//! Render module loading.
//!
//! A [`RenderModule`] is the validated shell template plus the render entry.
//! How it is obtained is a strategy picked once at startup:
//!
//! - [`OnceModuleLoader`] (production) loads at startup and shares the same
//!   module for the process lifetime. A broken template stops the process
//!   before it listens.
//! - [`FreshModuleLoader`] (development) re-reads the template and rebuilds
//!   the entry on every call, so edits to `index.html` or the catalog fixture
//!   show up on the next request.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use theresa_pages::ssr::{HtmlTemplate, SsrEntry, TemplateError};

/// Errors raised while loading a render module.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// The template file could not be read.
	#[error("Failed to read template {}: {source}", .path.display())]
	TemplateRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	/// The template is missing a marker or repeats one.
	#[error("Invalid template {}: {source}", .path.display())]
	Template {
		path: PathBuf,
		#[source]
		source: TemplateError,
	},
	/// The render entry could not be built.
	#[error("Failed to build render entry: {0}")]
	Entry(String),
}

impl LoadError {
	pub fn entry(message: impl fmt::Display) -> Self {
		Self::Entry(message.to_string())
	}
}

/// Template and render entry used to answer a request.
#[derive(Debug, Clone)]
pub struct RenderModule {
	pub template: HtmlTemplate,
	pub entry: SsrEntry,
}

impl RenderModule {
	pub fn new(template: HtmlTemplate, entry: SsrEntry) -> Self {
		Self { template, entry }
	}
}

async fn read_template(path: &Path) -> Result<HtmlTemplate, LoadError> {
	let source = tokio::fs::read_to_string(path)
		.await
		.map_err(|source| LoadError::TemplateRead {
			path: path.to_path_buf(),
			source,
		})?;
	HtmlTemplate::parse(source).map_err(|source| LoadError::Template {
		path: path.to_path_buf(),
		source,
	})
}

/// Source of the render module for each request.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
	/// Returns the module to render the current request with.
	async fn load(&self) -> Result<Arc<RenderModule>, LoadError>;
}

/// Loads the module once and hands out the same instance afterwards.
#[derive(Debug, Clone)]
pub struct OnceModuleLoader {
	module: Arc<RenderModule>,
}

impl OnceModuleLoader {
	/// Reads and validates the template at `template_path`.
	///
	/// # Errors
	///
	/// Fails if the template is unreadable or its markers are wrong.
	pub async fn load_once(template_path: &Path, entry: SsrEntry) -> Result<Self, LoadError> {
		let template = read_template(template_path).await?;
		tracing::info!(template = %template_path.display(), "render module loaded");
		Ok(Self::from_module(RenderModule::new(template, entry)))
	}

	pub fn from_module(module: RenderModule) -> Self {
		Self {
			module: Arc::new(module),
		}
	}
}

#[async_trait]
impl ModuleLoader for OnceModuleLoader {
	async fn load(&self) -> Result<Arc<RenderModule>, LoadError> {
		Ok(self.module.clone())
	}
}

type EntryFactory = dyn Fn() -> Result<SsrEntry, LoadError> + Send + Sync;

/// Rebuilds the module on every call.
#[derive(Clone)]
pub struct FreshModuleLoader {
	template_path: PathBuf,
	factory: Arc<EntryFactory>,
}

impl fmt::Debug for FreshModuleLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FreshModuleLoader")
			.field("template_path", &self.template_path)
			.finish_non_exhaustive()
	}
}

impl FreshModuleLoader {
	/// `factory` builds a new render entry each time a request needs one.
	pub fn new<F>(template_path: impl Into<PathBuf>, factory: F) -> Self
	where
		F: Fn() -> Result<SsrEntry, LoadError> + Send + Sync + 'static,
	{
		Self {
			template_path: template_path.into(),
			factory: Arc::new(factory),
		}
	}

	pub fn template_path(&self) -> &Path {
		&self.template_path
	}

	/// Reads the template and builds the entry again.
	pub async fn load_fresh(&self) -> Result<RenderModule, LoadError> {
		let template = read_template(&self.template_path).await?;
		let entry = (self.factory)()?;
		tracing::debug!(template = %self.template_path.display(), "render module reloaded");
		Ok(RenderModule::new(template, entry))
	}
}

#[async_trait]
impl ModuleLoader for FreshModuleLoader {
	async fn load(&self) -> Result<Arc<RenderModule>, LoadError> {
		self.load_fresh().await.map(Arc::new)
	}
}

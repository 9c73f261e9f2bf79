//! Process bootstrap: wires settings, loaders and the dispatcher together.

use std::sync::Arc;
use std::time::Duration;
use theresa_conf::Settings;
use theresa_pages::ssr::SsrEntry;
use theresa_server::{
	FreshModuleLoader, HttpServer, LoadError, ModuleLoader, OnceModuleLoader, ShutdownCoordinator,
	SsrDispatcher, shutdown_signal,
};

use crate::app::{MovieApp, StaticCatalog};

/// How long in-flight connections get to finish after a shutdown signal.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

fn catalog_entry(settings: &Settings) -> Result<SsrEntry, LoadError> {
	let catalog = StaticCatalog::load(settings.catalog_path()).map_err(LoadError::entry)?;
	Ok(SsrEntry::new(MovieApp::new(catalog)))
}

/// Builds the render module loader for the configured mode.
///
/// Production reads the template and catalog once and fails here when either
/// is unusable. Development re-reads both on every request so edits show up
/// without a restart.
pub async fn build_loader(settings: &Settings) -> Result<Arc<dyn ModuleLoader>, LoadError> {
	if settings.mode.is_production() {
		let entry = catalog_entry(settings)?;
		let loader = OnceModuleLoader::load_once(&settings.template_path(), entry).await?;
		return Ok(Arc::new(loader));
	}

	let factory_settings = settings.clone();
	Ok(Arc::new(FreshModuleLoader::new(
		settings.template_path(),
		move || catalog_entry(&factory_settings),
	)))
}

pub async fn build_dispatcher(settings: &Settings) -> Result<SsrDispatcher, LoadError> {
	let loader = build_loader(settings).await?;
	Ok(SsrDispatcher::new(settings, loader))
}

/// Serves until ctrl-c or SIGTERM, then drains connections.
///
/// Connections still open after the shutdown timeout are dropped.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
	let dispatcher = build_dispatcher(&settings).await?;
	tracing::info!(mode = %settings.mode, root = %settings.root.display(), "starting theresa");

	let coordinator = ShutdownCoordinator::new(SHUTDOWN_TIMEOUT);
	let mut server = tokio::spawn(
		HttpServer::new(Arc::new(dispatcher))
			.listen_with_shutdown(settings.bind_addr(), coordinator.clone()),
	);

	tokio::select! {
		result = &mut server => {
			result??;
			return Ok(());
		}
		_ = shutdown_signal() => {}
	}

	coordinator.shutdown();
	if !coordinator.wait_for_shutdown().await {
		tracing::warn!("shutdown timed out, dropping open connections");
		server.abort();
		return Ok(());
	}
	server.await??;
	Ok(())
}

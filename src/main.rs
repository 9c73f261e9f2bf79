#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
	use theresa::conf::Settings;
	use tracing_subscriber::EnvFilter;

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let settings = Settings::from_env()?;
	theresa::serve::run(settings).await
}

// The browser build starts from `theresa::client::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}

//! Process settings.

pub mod env;
pub mod testing;

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use env::{Env, EnvError};

/// Listen port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5173;

/// Which render path the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
	/// Template and catalog re-read per request, detailed error bodies.
	#[default]
	Development,
	/// Precompiled assets served from `dist/client`, render module loaded once.
	Production,
}

impl RunMode {
	/// Maps a `NODE_ENV` value: only the exact string `production` selects
	/// [`RunMode::Production`].
	pub fn from_node_env(value: Option<&str>) -> Self {
		match value {
			Some("production") => Self::Production,
			_ => Self::Development,
		}
	}

	pub fn is_production(self) -> bool {
		self == Self::Production
	}
}

impl fmt::Display for RunMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Development => "development",
			Self::Production => "production",
		})
	}
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub port: u16,
	pub mode: RunMode,
	/// Project root holding `index.html` and `dist/`.
	pub root: PathBuf,
	/// Optional JSON movie catalog fixture.
	pub catalog: Option<PathBuf>,
	/// Development client build directory; `root/pkg` when unset.
	pub client_dev: Option<PathBuf>,
}

impl Settings {
	/// Settings for `root` with every other value at its default.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			port: DEFAULT_PORT,
			mode: RunMode::Development,
			root: root.into(),
			catalog: None,
			client_dev: None,
		}
	}

	pub fn with_mode(mut self, mode: RunMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_port(mut self, port: u16) -> Self {
		self.port = port;
		self
	}

	pub fn with_catalog(mut self, catalog: impl Into<PathBuf>) -> Self {
		self.catalog = Some(catalog.into());
		self
	}

	pub fn with_client_dev(mut self, dir: impl Into<PathBuf>) -> Self {
		self.client_dev = Some(dir.into());
		self
	}

	/// Reads `PORT`, `NODE_ENV`, `THERESA_ROOT`, `THERESA_CATALOG` and
	/// `THERESA_CLIENT_DEV`.
	pub fn from_env() -> Result<Self, EnvError> {
		Self::from_env_with(&Env::new())
	}

	/// Same as [`Settings::from_env`] through a caller-supplied reader.
	pub fn from_env_with(env: &Env) -> Result<Self, EnvError> {
		let port = env.port_with_default("PORT", DEFAULT_PORT)?;
		let mode = RunMode::from_node_env(env.optional_str("NODE_ENV")?.as_deref());
		let root = env.path_with_default("THERESA_ROOT", Some(PathBuf::from(".")))?;
		let catalog = env.optional_path("THERESA_CATALOG")?;
		let client_dev = env.optional_path("THERESA_CLIENT_DEV")?;

		let settings = Self {
			port,
			mode,
			root,
			catalog,
			client_dev,
		};
		tracing::debug!(?settings, "settings loaded from environment");
		Ok(settings)
	}

	/// Directory of built client assets.
	pub fn client_dist(&self) -> PathBuf {
		self.root.join("dist").join("client")
	}

	/// Where the development client build (the wasm-pack output) lands.
	pub fn client_dev_dir(&self) -> PathBuf {
		self.client_dev
			.clone()
			.unwrap_or_else(|| self.root.join("pkg"))
	}

	/// Directories served as static assets, in lookup order.
	///
	/// Production serves only `dist/client`. Development serves the client
	/// build and the unbundled `public/` directory.
	pub fn asset_dirs(&self) -> Vec<PathBuf> {
		match self.mode {
			RunMode::Development => vec![self.client_dev_dir(), self.root.join("public")],
			RunMode::Production => vec![self.client_dist()],
		}
	}

	/// HTML shell for the current mode: `index.html` at the root in
	/// development, the built copy under `dist/client` in production.
	pub fn template_path(&self) -> PathBuf {
		match self.mode {
			RunMode::Development => self.root.join("index.html"),
			RunMode::Production => self.client_dist().join("index.html"),
		}
	}

	pub fn catalog_path(&self) -> Option<&Path> {
		self.catalog.as_deref()
	}

	/// Socket address on all interfaces at the configured port.
	pub fn bind_addr(&self) -> SocketAddr {
		SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use testing::TestEnv;

	const KEYS: [&str; 5] = [
		"PORT",
		"NODE_ENV",
		"THERESA_ROOT",
		"THERESA_CATALOG",
		"THERESA_CLIENT_DEV",
	];

	fn clean_env() -> TestEnv {
		let mut guard = TestEnv::new().unwrap();
		for key in KEYS {
			guard.remove_var(key);
		}
		guard
	}

	#[rstest]
	#[case(None, RunMode::Development)]
	#[case(Some("production"), RunMode::Production)]
	#[case(Some("development"), RunMode::Development)]
	#[case(Some("PRODUCTION"), RunMode::Development)]
	#[case(Some("test"), RunMode::Development)]
	fn test_run_mode_from_node_env(#[case] raw: Option<&str>, #[case] expected: RunMode) {
		assert_eq!(RunMode::from_node_env(raw), expected);
	}

	#[rstest]
	#[serial(theresa_env)]
	fn test_from_env_defaults() {
		let _guard = clean_env();

		let settings = Settings::from_env().unwrap();
		assert_eq!(settings.port, DEFAULT_PORT);
		assert_eq!(settings.mode, RunMode::Development);
		assert_eq!(settings.root, PathBuf::from("."));
		assert_eq!(settings.catalog, None);
		assert_eq!(settings.client_dev_dir(), PathBuf::from("./pkg"));
	}

	#[rstest]
	#[serial(theresa_env)]
	fn test_from_env_production() {
		let mut guard = clean_env();
		let root = guard.path().to_path_buf();
		guard.set_var("PORT", "8081");
		guard.set_var("NODE_ENV", "production");
		guard.set_var("THERESA_ROOT", root.to_string_lossy());
		guard.set_var("THERESA_CATALOG", "catalog.json");

		let settings = Settings::from_env().unwrap();
		assert_eq!(settings.port, 8081);
		assert!(settings.mode.is_production());
		assert_eq!(settings.client_dist(), root.join("dist/client"));
		assert_eq!(settings.template_path(), root.join("dist/client/index.html"));
		assert_eq!(settings.catalog_path(), Some(Path::new("catalog.json")));
		assert_eq!(settings.asset_dirs(), vec![root.join("dist/client")]);
	}

	#[rstest]
	#[serial(theresa_env)]
	fn test_from_env_client_dev_override() {
		let mut guard = clean_env();
		guard.set_var("THERESA_CLIENT_DEV", "/tmp/wasm-out");

		let settings = Settings::from_env().unwrap();
		assert_eq!(settings.client_dev_dir(), PathBuf::from("/tmp/wasm-out"));
		assert_eq!(settings.asset_dirs()[0], PathBuf::from("/tmp/wasm-out"));
	}

	#[rstest]
	fn test_development_asset_dirs() {
		let settings = Settings::new("/srv/app");
		assert_eq!(
			settings.asset_dirs(),
			vec![PathBuf::from("/srv/app/pkg"), PathBuf::from("/srv/app/public")]
		);
		assert!(!settings.asset_dirs().contains(&settings.client_dist()));
	}

	#[rstest]
	#[serial(theresa_env)]
	fn test_from_env_rejects_bad_port() {
		let mut guard = clean_env();
		guard.set_var("PORT", "99999");

		assert!(matches!(
			Settings::from_env(),
			Err(EnvError::ParseError { .. })
		));
	}

	#[rstest]
	fn test_development_template_is_project_index() {
		let settings = Settings::new("/srv/app");
		assert_eq!(settings.template_path(), PathBuf::from("/srv/app/index.html"));
	}

	#[rstest]
	fn test_bind_addr_uses_all_interfaces() {
		let settings = Settings::new(".").with_port(3000);
		assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:3000");
	}
}

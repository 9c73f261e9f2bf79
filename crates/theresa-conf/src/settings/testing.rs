//! Test helpers for settings.
//!
//! [`TestEnv`] pairs a scratch project root with environment variable
//! overrides that are rolled back on drop. Tests that mutate the environment
//! must still run under `#[serial]`.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch project root plus reversible environment overrides.
pub struct TestEnv {
	temp_dir: TempDir,
	original_env: HashMap<String, Option<String>>,
}

impl TestEnv {
	/// Create a new test environment
	///
	/// # Examples
	///
	/// ```
	/// use theresa_conf::settings::testing::TestEnv;
	///
	/// let mut test_env = TestEnv::new().unwrap();
	/// test_env.set_var("THERESA_DOC_KEY", "value");
	/// assert_eq!(std::env::var("THERESA_DOC_KEY").unwrap(), "value");
	/// drop(test_env);
	/// assert!(std::env::var("THERESA_DOC_KEY").is_err());
	/// ```
	pub fn new() -> std::io::Result<Self> {
		Ok(Self {
			temp_dir: TempDir::new()?,
			original_env: HashMap::new(),
		})
	}

	/// The scratch directory, usable as `THERESA_ROOT`.
	pub fn path(&self) -> &Path {
		self.temp_dir.path()
	}

	/// Set an environment variable until this guard drops.
	pub fn set_var(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
		let key = key.into();
		self.remember(&key);
		// SAFETY: Setting environment variables is unsafe in multi-threaded programs.
		// TestEnv is used from tests marked #[serial] to ensure exclusive access.
		unsafe {
			env::set_var(&key, value.as_ref());
		}
	}

	/// Remove an environment variable until this guard drops.
	pub fn remove_var(&mut self, key: impl Into<String>) {
		let key = key.into();
		self.remember(&key);
		// SAFETY: Removing environment variables is unsafe in multi-threaded programs.
		// TestEnv is used from tests marked #[serial] to ensure exclusive access.
		unsafe {
			env::remove_var(&key);
		}
	}

	/// Write `content` to `relative` under the scratch root, creating parent
	/// directories as needed.
	///
	/// ```
	/// use theresa_conf::settings::testing::TestEnv;
	///
	/// let test_env = TestEnv::new().unwrap();
	/// let asset = test_env.create_file("dist/client/app.js", "console.log(1)").unwrap();
	/// assert!(asset.ends_with("dist/client/app.js"));
	/// ```
	pub fn create_file(&self, relative: &str, content: impl AsRef<[u8]>) -> std::io::Result<PathBuf> {
		let path = self.temp_dir.path().join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, content)?;
		Ok(path)
	}

	fn remember(&mut self, key: &str) {
		if !self.original_env.contains_key(key) {
			self.original_env.insert(key.to_string(), env::var(key).ok());
		}
	}
}

impl Drop for TestEnv {
	fn drop(&mut self) {
		for (key, original) in &self.original_env {
			// SAFETY: Restoring environment variables is unsafe in multi-threaded programs.
			// TestEnv is used from tests marked #[serial] to ensure exclusive access.
			unsafe {
				match original {
					Some(val) => env::set_var(key, val),
					None => env::remove_var(key),
				}
			}
		}
	}
}

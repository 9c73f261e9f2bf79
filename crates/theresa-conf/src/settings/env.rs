//! Environment variable handling module
//!
//! Typed reads of process environment variables with optional defaults.

use std::env;
use std::path::PathBuf;

/// Environment variable reader
#[derive(Debug, Clone, Default)]
pub struct Env;

impl Env {
	/// Create a new Env instance
	pub fn new() -> Self {
		Self
	}

	fn raw(&self, key: &str) -> Result<(String, Option<String>), EnvError> {
		validate_env_var_name(key)?;
		Ok((key.to_string(), env::var(key).ok()))
	}

	/// Read an optional string value; absence is not an error
	pub fn optional_str(&self, key: &str) -> Result<Option<String>, EnvError> {
		Ok(self.raw(key)?.1)
	}
	/// Read an integer value with a default
	pub fn int_with_default(&self, key: &str, default: Option<i64>) -> Result<i64, EnvError> {
		match self.raw(key)? {
			(full_key, Some(val)) => val.trim().parse::<i64>().map_err(|e| EnvError::ParseError {
				key: full_key,
				value_len: val.len(),
				error: e.to_string(),
			}),
			(full_key, None) => default.ok_or(EnvError::MissingVariable(full_key)),
		}
	}
	/// Read a port number, rejecting values outside `0..=65535`
	pub fn port_with_default(&self, key: &str, default: u16) -> Result<u16, EnvError> {
		let value = self.int_with_default(key, Some(i64::from(default)))?;
		u16::try_from(value).map_err(|e| EnvError::ParseError {
			key: key.to_string(),
			value_len: value.to_string().len(),
			error: e.to_string(),
		})
	}
	/// Read a path value with a default
	pub fn path_with_default(
		&self,
		key: &str,
		default: Option<PathBuf>,
	) -> Result<PathBuf, EnvError> {
		match self.raw(key)? {
			(_, Some(val)) => Ok(PathBuf::from(val)),
			(full_key, None) => default.ok_or(EnvError::MissingVariable(full_key)),
		}
	}
	/// Read an optional path value
	pub fn optional_path(&self, key: &str) -> Result<Option<PathBuf>, EnvError> {
		Ok(self
			.optional_str(key)?
			.filter(|val| !val.is_empty())
			.map(PathBuf::from))
	}
}

/// Validates an environment variable name.
///
/// Rejects names that are empty, contain control characters, or contain
/// the `=` character (which is used as the key-value separator).
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

/// Environment variable errors
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

//! Colour theme preference.
//!
//! The chosen mode is kept in client storage under [`THEME_STORAGE_KEY`].
//! `auto` follows the system `prefers-color-scheme`.

use std::fmt;

use super::storage::{ClientStorage, StorageError};

/// Storage key of the theme preference.
pub const THEME_STORAGE_KEY: &str = "theme";

/// Theme classes that [`ThemeAttributes`] may set on the root element.
pub const THEME_CLASSES: [&str; 2] = ["theme-light", "theme-dark"];

/// The mode a visitor picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
	Light,
	Dark,
	#[default]
	Auto,
}

impl ThemeMode {
	pub fn as_str(self) -> &'static str {
		match self {
			ThemeMode::Light => "light",
			ThemeMode::Dark => "dark",
			ThemeMode::Auto => "auto",
		}
	}

	/// Parses a stored value. Anything but the three mode names is rejected.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"light" => Some(ThemeMode::Light),
			"dark" => Some(ThemeMode::Dark),
			"auto" => Some(ThemeMode::Auto),
			_ => None,
		}
	}

	/// light, dark, auto, light, ...
	pub fn next(self) -> Self {
		match self {
			ThemeMode::Light => ThemeMode::Dark,
			ThemeMode::Dark => ThemeMode::Auto,
			ThemeMode::Auto => ThemeMode::Light,
		}
	}

	/// The concrete theme, given whether the system prefers dark.
	pub fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
		match self {
			ThemeMode::Light => ResolvedTheme::Light,
			ThemeMode::Dark => ResolvedTheme::Dark,
			ThemeMode::Auto if prefers_dark => ResolvedTheme::Dark,
			ThemeMode::Auto => ResolvedTheme::Light,
		}
	}
}

impl fmt::Display for ThemeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
	Light,
	Dark,
}

impl ResolvedTheme {
	pub fn as_str(self) -> &'static str {
		match self {
			ResolvedTheme::Light => "light",
			ResolvedTheme::Dark => "dark",
		}
	}
}

/// What the document root carries for a theme.
///
/// Previous `data-theme` and [`THEME_CLASSES`] are cleared before these are
/// applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeAttributes {
	/// `data-theme`, unset in auto mode.
	pub data_theme: Option<&'static str>,
	/// `theme-light` or `theme-dark`, unset in auto mode.
	pub class: Option<&'static str>,
	/// Value of the `--theme-mode` custom property.
	pub theme_mode: &'static str,
}

impl ThemeAttributes {
	pub fn new(mode: ThemeMode, prefers_dark: bool) -> Self {
		let (data_theme, class) = match mode {
			ThemeMode::Light => (Some("light"), Some("theme-light")),
			ThemeMode::Dark => (Some("dark"), Some("theme-dark")),
			ThemeMode::Auto => (None, None),
		};
		Self {
			data_theme,
			class,
			theme_mode: mode.resolve(prefers_dark).as_str(),
		}
	}
}

/// The theme preference and the storage it lives in.
#[derive(Debug)]
pub struct ThemeStore<S: ClientStorage> {
	storage: S,
	mode: ThemeMode,
}

impl<S: ClientStorage> ThemeStore<S> {
	/// Restores the stored mode. Missing or unknown values give
	/// [`ThemeMode::Auto`].
	pub fn load(storage: S) -> Self {
		let mode = match storage.get_item(THEME_STORAGE_KEY) {
			Ok(Some(value)) => ThemeMode::parse(&value).unwrap_or_else(|| {
				tracing::debug!(value = %value, "ignoring unknown theme");
				ThemeMode::default()
			}),
			Ok(None) => ThemeMode::default(),
			Err(err) => {
				tracing::warn!(error = %err, "theme storage unreadable");
				ThemeMode::default()
			}
		};
		Self { storage, mode }
	}

	pub fn mode(&self) -> ThemeMode {
		self.mode
	}

	/// Stores `mode`, then makes it current.
	pub fn set(&mut self, mode: ThemeMode) -> Result<(), StorageError> {
		self.storage.set_item(THEME_STORAGE_KEY, mode.as_str())?;
		self.mode = mode;
		Ok(())
	}

	/// Moves to the next mode and returns it.
	pub fn toggle(&mut self) -> Result<ThemeMode, StorageError> {
		let next = self.mode.next();
		self.set(next)?;
		Ok(next)
	}

	pub fn attributes(&self, prefers_dark: bool) -> ThemeAttributes {
		ThemeAttributes::new(self.mode, prefers_dark)
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}
}

//! Path traversal protection.
//!
//! [`safe_path_join`] is purely lexical: it never touches the filesystem, so
//! callers that follow symlinks must still canonicalize the result and check
//! it against the canonical base.

use std::path::{Component, Path, PathBuf};

/// Errors returned by [`safe_path_join`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathTraversalError {
	/// A `..` component would climb above the base directory.
	#[error("Path escapes base directory: {0}")]
	EscapesBase(String),
	/// The path contains a NUL byte.
	#[error("Path contains a NUL byte")]
	NulByte,
	/// The path carries a platform prefix such as a drive letter.
	#[error("Path carries a platform prefix: {0}")]
	Prefixed(String),
}

/// Joins an untrusted relative path onto `base`.
///
/// Leading `/` is treated as relative to `base`, `.` components are dropped
/// and `..` components are resolved lexically. A `..` that would leave `base`
/// is rejected, as is any segment containing a backslash.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use theresa_utils::safe_path_join;
///
/// let joined = safe_path_join(Path::new("/srv/dist"), "/assets/./app.js").unwrap();
/// assert_eq!(joined, Path::new("/srv/dist/assets/app.js"));
///
/// assert!(safe_path_join(Path::new("/srv/dist"), "../secret").is_err());
/// assert!(safe_path_join(Path::new("/srv/dist"), "a/../../secret").is_err());
/// ```
pub fn safe_path_join(base: &Path, user_path: &str) -> Result<PathBuf, PathTraversalError> {
	if user_path.contains('\0') {
		return Err(PathTraversalError::NulByte);
	}

	let mut segments: Vec<&std::ffi::OsStr> = Vec::new();
	for component in Path::new(user_path.trim_start_matches('/')).components() {
		match component {
			Component::Normal(segment) => {
				// Backslashes are separators on Windows even though they parse
				// as part of a name here.
				if !segment.to_str().is_some_and(is_safe_filename_component) {
					return Err(PathTraversalError::EscapesBase(user_path.to_string()));
				}
				segments.push(segment);
			}
			Component::CurDir | Component::RootDir => {}
			Component::ParentDir => {
				if segments.pop().is_none() {
					return Err(PathTraversalError::EscapesBase(user_path.to_string()));
				}
			}
			Component::Prefix(_) => {
				return Err(PathTraversalError::Prefixed(user_path.to_string()));
			}
		}
	}

	let mut joined = base.to_path_buf();
	joined.extend(segments);
	Ok(joined)
}

/// Returns true when `name` is usable as a single file name: non-empty, not
/// `.` or `..`, and free of separators and NUL bytes.
pub fn is_safe_filename_component(name: &str) -> bool {
	!name.is_empty()
		&& name != "."
		&& name != ".."
		&& !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	#[case("app.js", "/base/app.js")]
	#[case("/app.js", "/base/app.js")]
	#[case("assets/logo.svg", "/base/assets/logo.svg")]
	#[case("assets/../app.js", "/base/app.js")]
	#[case("./assets//logo.svg", "/base/assets/logo.svg")]
	#[case("", "/base")]
	fn test_safe_join_accepts(#[case] input: &str, #[case] expected: &str) {
		let joined = safe_path_join(Path::new("/base"), input).unwrap();
		assert_eq!(joined, Path::new(expected));
	}

	#[rstest]
	#[case("..")]
	#[case("../etc/passwd")]
	#[case("/../etc/passwd")]
	#[case("assets/../../etc/passwd")]
	#[case("..\\..\\etc\\passwd")]
	fn test_safe_join_rejects_escape(#[case] input: &str) {
		let err = safe_path_join(Path::new("/base"), input).unwrap_err();
		assert!(matches!(err, PathTraversalError::EscapesBase(_)));
	}

	#[rstest]
	fn test_safe_join_rejects_nul() {
		assert_eq!(
			safe_path_join(Path::new("/base"), "app\0.js"),
			Err(PathTraversalError::NulByte)
		);
	}

	#[rstest]
	#[case("index.html", true)]
	#[case("", false)]
	#[case(".", false)]
	#[case("..", false)]
	#[case("a/b", false)]
	#[case("a\\b", false)]
	fn test_is_safe_filename_component(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(is_safe_filename_component(name), expected);
	}

	proptest! {
		#[test]
		fn joined_path_stays_under_base(input in "[a-z./]{0,24}") {
			let base = Path::new("/base");
			if let Ok(joined) = safe_path_join(base, &input) {
				prop_assert!(joined.starts_with(base));
			}
		}
	}
}

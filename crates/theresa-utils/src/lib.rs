//! Utility functions for theresa.
//!
//! Currently limited to path safety: joining untrusted, URL-derived paths
//! onto a trusted base directory without letting them escape it.

pub mod path_safety;

pub use path_safety::{PathTraversalError, is_safe_filename_component, safe_path_join};

//! Render errors.

/// Errors raised while building or resolving a page tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
	/// A component refused to produce a page.
	#[error("Component {component} failed to render: {message}")]
	Component {
		component: &'static str,
		message: String,
	},
	/// An asynchronous data dependency behind a suspense boundary failed.
	#[error("Data dependency failed: {0}")]
	Data(String),
	/// The render module itself could not run (missing entry, bad state).
	#[error("Render module error: {0}")]
	Module(String),
}

impl RenderError {
	/// Creates a component error.
	pub fn component(component: &'static str, message: impl Into<String>) -> Self {
		Self::Component {
			component,
			message: message.into(),
		}
	}

	/// Creates a data dependency error from any displayable cause.
	pub fn data(cause: impl std::fmt::Display) -> Self {
		Self::Data(cause.to_string())
	}
}

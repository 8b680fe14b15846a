//! Error types for engine construction and diagram rendering.

use thiserror::Error;

/// Errors raised while building a [`crate::DiagramEngine`].
///
/// All of these surface before the first scan; a constructed engine never
/// fails a reconcile.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// No container classes were configured.
	#[error("container-classes must name at least one class")]
	MissingContainerClasses,

	/// A container class was blank or contained whitespace.
	#[error("invalid container class {0:?}")]
	InvalidClass(String),

	/// The diagram language or one of its aliases was blank.
	#[error("diagram language aliases must be non-empty")]
	EmptyAlias,

	/// The language alias pattern could not be compiled.
	#[error("invalid language alias pattern: {0}")]
	InvalidAlias(#[from] regex::Error),

	/// `renderer-options` was neither absent nor a table.
	#[error("renderer-options must be a table, got {0}")]
	InvalidRendererOptions(String),

	/// Error parsing TOML configuration.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// The renderer rejected its initialization options.
	#[error("renderer initialization failed: {0}")]
	RendererInit(#[source] RenderError),
}

/// Failure of one diagram render.
///
/// Render errors stay local to the block's container and are never returned
/// from [`crate::DiagramEngine::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// The renderer rejected the diagram source.
	#[error("{0}")]
	Failed(String),

	/// The renderer panicked while rendering.
	#[error("renderer panicked: {0}")]
	Panicked(String),

	/// The render task was torn down before producing a result.
	#[error("render task was cancelled")]
	Cancelled,
}

impl RenderError {
	/// Convenience constructor for renderer implementations.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

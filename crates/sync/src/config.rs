//! Engine configuration.
//!
//! Configuration can be built in code with [`EngineConfig::new`] or loaded
//! from TOML:
//!
//! ```toml
//! target-kind = "codeBlock"
//! debounce-ms = 300
//! container-classes = ["mermaid", "diagram"]
//! eviction = "sweep-missing"
//!
//! [renderer-options]
//! theme = "dark"
//! ```
//!
//! `container-classes` is the only required field and also accepts a single
//! string.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Node kind treated as a diagram candidate unless configured otherwise.
pub const DEFAULT_TARGET_KIND: &str = "codeBlock";

/// Quiescence window before a changed block is rendered.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Canonical diagram language.
pub const DEFAULT_LANGUAGE: &str = "mermaid";

/// Language tags accepted in addition to the canonical language.
pub const DEFAULT_ALIASES: &[&str] = &["mmd", "mindmap"];

/// What happens to cache entries whose block disappears from the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
	/// Keep entries for the engine's lifetime; removed blocks keep their container.
	#[default]
	Retain,
	/// After each scan, evict entries not seen in it and cancel their pending renders.
	SweepMissing,
}

/// Configuration for a [`crate::DiagramEngine`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
	/// Node kind scanned for diagram source.
	#[serde(default = "default_target_kind")]
	pub target_kind: String,
	/// Debounce window in milliseconds.
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
	/// Classes applied to every container the engine creates.
	#[serde(default, deserialize_with = "one_or_many")]
	pub container_classes: Vec<String>,
	/// Passed through to [`crate::DiagramRenderer::initialize`].
	#[serde(default)]
	pub renderer_options: Value,
	/// Canonical diagram language name.
	#[serde(default = "default_language")]
	pub language: String,
	/// Extra language tags mapped onto [`Self::language`].
	#[serde(default = "default_aliases")]
	pub aliases: Vec<String>,
	#[serde(default)]
	pub eviction: EvictionPolicy,
	/// Discard a finished render when a newer one for the same block was already applied.
	#[serde(default)]
	pub discard_stale_renders: bool,
}

fn default_target_kind() -> String {
	DEFAULT_TARGET_KIND.to_string()
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}

fn default_language() -> String {
	DEFAULT_LANGUAGE.to_string()
}

fn default_aliases() -> Vec<String> {
	DEFAULT_ALIASES.iter().map(|alias| alias.to_string()).collect()
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match OneOrMany::deserialize(deserializer)? {
		OneOrMany::One(class) => vec![class],
		OneOrMany::Many(classes) => classes,
	})
}

impl EngineConfig {
	/// Creates a configuration with default options and the given container classes.
	pub fn new<I, S>(container_classes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			target_kind: default_target_kind(),
			debounce_ms: DEFAULT_DEBOUNCE_MS,
			container_classes: container_classes.into_iter().map(Into::into).collect(),
			renderer_options: Value::Null,
			language: default_language(),
			aliases: default_aliases(),
			eviction: EvictionPolicy::default(),
			discard_stale_renders: false,
		}
	}

	/// Parses and validates a TOML configuration document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	pub fn target_kind(mut self, kind: impl Into<String>) -> Self {
		self.target_kind = kind.into();
		self
	}

	pub fn debounce(mut self, delay: Duration) -> Self {
		self.debounce_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
		self
	}

	pub fn renderer_options(mut self, options: Value) -> Self {
		self.renderer_options = options;
		self
	}

	pub fn eviction(mut self, policy: EvictionPolicy) -> Self {
		self.eviction = policy;
		self
	}

	pub fn discard_stale_renders(mut self, enabled: bool) -> Self {
		self.discard_stale_renders = enabled;
		self
	}

	/// Returns the debounce window.
	pub fn debounce_delay(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Checks invariants that cannot be expressed in the type.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.container_classes.is_empty() {
			return Err(ConfigError::MissingContainerClasses);
		}
		if let Some(bad) = self.container_classes.iter().find(|class| class.is_empty() || class.contains(char::is_whitespace)) {
			return Err(ConfigError::InvalidClass(bad.clone()));
		}
		if self.language.trim().is_empty() || self.aliases.iter().any(|alias| alias.trim().is_empty()) {
			return Err(ConfigError::EmptyAlias);
		}
		match &self.renderer_options {
			Value::Null | Value::Object(_) => Ok(()),
			other => Err(ConfigError::InvalidRendererOptions(other.to_string())),
		}
	}

	/// Options handed to the renderer at initialization.
	///
	/// Caller options are kept; automatic page-load rendering and the
	/// renderer's own error output are always disabled since the engine owns
	/// both.
	pub(crate) fn renderer_init_options(&self) -> Value {
		let mut options = match &self.renderer_options {
			Value::Object(map) => map.clone(),
			_ => Map::new(),
		};
		options.insert("startOnLoad".to_string(), Value::Bool(false));
		options.insert("suppressErrorRendering".to_string(), Value::Bool(true));
		Value::Object(options)
	}
}

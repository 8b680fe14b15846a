//! Persistent visual containers.
//!
//! A [`Container`] is created once per block identifier and handed to the
//! host in every placement for that block. Renders mutate it in place, so
//! the host can compare placements by container identity instead of content.

use std::sync::Arc;

use parking_lot::Mutex;

/// Class added to a container whose last render failed.
pub const ERROR_CLASS: &str = "error";

/// Rendered visual output, typically SVG markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
	pub markup: String,
}

impl Artifact {
	pub fn new(markup: impl Into<String>) -> Self {
		Self { markup: markup.into() }
	}
}

/// What a container currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
	/// Nothing rendered yet.
	#[default]
	Empty,
	Artifact(Artifact),
	/// Human-readable message from the last failed render.
	Error(String),
}

#[derive(Debug)]
struct ContainerState {
	classes: Vec<String>,
	content: Content,
	/// Bumped on every visible change.
	revision: u64,
	/// Generation of the render whose outcome is shown.
	applied_generation: u64,
}

/// Shared handle to one block's visual element.
///
/// Clones refer to the same element; use [`Container::ptr_eq`] for identity.
#[derive(Debug, Clone)]
pub struct Container {
	state: Arc<Mutex<ContainerState>>,
}

impl Container {
	pub(crate) fn new(classes: &[String]) -> Self {
		Self {
			state: Arc::new(Mutex::new(ContainerState {
				classes: classes.to_vec(),
				content: Content::Empty,
				revision: 0,
				applied_generation: 0,
			})),
		}
	}

	/// Returns true if both handles refer to the same container.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.state, &other.state)
	}

	pub fn classes(&self) -> Vec<String> {
		self.state.lock().classes.clone()
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.state.lock().classes.iter().any(|c| c == class)
	}

	/// Returns true when the last applied render failed.
	pub fn is_error(&self) -> bool {
		self.has_class(ERROR_CLASS)
	}

	pub fn content(&self) -> Content {
		self.state.lock().content.clone()
	}

	/// Number of content changes applied so far.
	pub fn revision(&self) -> u64 {
		self.state.lock().revision
	}

	/// Replaces the content with a rendered artifact and clears the error marker.
	pub(crate) fn show_artifact(&self, artifact: Artifact, generation: u64, discard_stale: bool) -> bool {
		self.apply(generation, discard_stale, |state| {
			state.content = Content::Artifact(artifact);
			state.classes.retain(|class| class != ERROR_CLASS);
		})
	}

	/// Replaces the content with an error message and sets the error marker.
	pub(crate) fn show_error(&self, message: String, generation: u64, discard_stale: bool) -> bool {
		self.apply(generation, discard_stale, |state| {
			state.content = Content::Error(message);
			if !state.classes.iter().any(|class| class == ERROR_CLASS) {
				state.classes.push(ERROR_CLASS.to_string());
			}
		})
	}

	fn apply(&self, generation: u64, discard_stale: bool, update: impl FnOnce(&mut ContainerState)) -> bool {
		let mut state = self.state.lock();
		if discard_stale && generation < state.applied_generation {
			return false;
		}
		update(&mut state);
		state.applied_generation = state.applied_generation.max(generation);
		state.revision = state.revision.wrapping_add(1);
		true
	}
}

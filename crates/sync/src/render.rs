//! Render pipeline: one block's source in, one container updated.
//!
//! Failures of any kind (rejection, panic, teardown) end up as an error
//! message on the block's own container and are never propagated.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use mermaid_worker::{TaskClass, join_error_panic_message, spawn};
use regex::Regex;
use serde_json::Value;

use crate::container::{Artifact, Container};
use crate::error::RenderError;

/// Successful renderer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
	pub svg: String,
}

/// External diagram rendering engine.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
	/// Called once when the engine is built, with the configured renderer options.
	fn initialize(&self, _options: &Value) -> Result<(), RenderError> {
		Ok(())
	}

	/// Renders `source`. `id` is the block identifier and doubles as the
	/// renderer's own de-duplication key.
	async fn render(&self, id: &str, source: &str) -> Result<RenderedDiagram, RenderError>;
}

/// Caller-supplied transformation applied to every successful artifact.
pub trait PostProcess: Send + Sync {
	fn process(&self, artifact: &mut Artifact);
}

/// Strips fixed `width`/`height` from the root `<svg>` so its `viewBox` governs sizing.
///
/// Renderers size their output to the layout box they were given; dropping
/// the fixed dimensions lets the drawing shrink to its own bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitViewBox;

impl PostProcess for FitViewBox {
	fn process(&self, artifact: &mut Artifact) {
		static ROOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").expect("valid svg root pattern"));
		static SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\s(?:width|height)="[^"]*""#).expect("valid svg size pattern"));

		let Some(tag) = ROOT.find(&artifact.markup) else {
			return;
		};
		let range = tag.range();
		let mut fitted = SIZE.replace_all(tag.as_str(), "").into_owned();
		if fitted.contains("viewBox=") && !fitted.contains("preserveAspectRatio=") {
			let insert_at = fitted.len() - if fitted.ends_with("/>") { 2 } else { 1 };
			fitted.insert_str(insert_at, r#" preserveAspectRatio="xMidYMid meet""#);
		}
		artifact.markup.replace_range(range, &fitted);
	}
}

/// How one render invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderOutcome {
	Rendered,
	Failed,
	/// A newer render had already been applied to the container.
	Stale,
}

/// Shared state needed by every scheduled render.
#[derive(Clone)]
pub(crate) struct RenderPipeline {
	renderer: Arc<dyn DiagramRenderer>,
	post: Arc<[Arc<dyn PostProcess>]>,
	discard_stale: bool,
}

impl RenderPipeline {
	pub(crate) fn new(renderer: Arc<dyn DiagramRenderer>, post: Vec<Arc<dyn PostProcess>>, discard_stale: bool) -> Self {
		Self {
			renderer,
			post: post.into(),
			discard_stale,
		}
	}

	/// Renders `source` and applies the outcome to `container`.
	///
	/// The renderer runs in its own task so a panic is contained and reported
	/// like any other failure.
	pub(crate) async fn render_into(&self, container: &Container, id: &str, source: &str, generation: u64) -> RenderOutcome {
		let renderer = Arc::clone(&self.renderer);
		let (task_id, task_source) = (id.to_string(), source.to_string());
		let result = match spawn(TaskClass::Render, async move { renderer.render(&task_id, &task_source).await }).await {
			Ok(result) => result,
			Err(err) => Err(join_error_panic_message(err).map_or(RenderError::Cancelled, RenderError::Panicked)),
		};

		match result {
			Ok(rendered) => {
				let mut artifact = Artifact::new(rendered.svg);
				for post in self.post.iter() {
					post.process(&mut artifact);
				}
				if container.show_artifact(artifact, generation, self.discard_stale) {
					tracing::debug!(id, generation, "diagram.render.ok");
					RenderOutcome::Rendered
				} else {
					tracing::debug!(id, generation, "diagram.render.stale");
					RenderOutcome::Stale
				}
			}
			Err(err) => {
				tracing::error!(id, generation, error = %err, "diagram render failed");
				if container.show_error(format!("Mermaid render error: {err}"), generation, self.discard_stale) {
					RenderOutcome::Failed
				} else {
					RenderOutcome::Stale
				}
			}
		}
	}
}

//! Incremental reconciliation of diagram code blocks.
//!
//! A [`DiagramEngine`] is driven by the host editor: on every document change
//! the host calls [`DiagramEngine::reconcile`] with a read-only snapshot and
//! receives the ordered [`Placement`]s to composite into its view. Each
//! diagram block keeps one [`Container`] for as long as its identifier is
//! known, and renders run later, debounced per block, through the caller's
//! [`DiagramRenderer`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use mermaid_sync::*;
//! # async fn demo(renderer: Arc<dyn DiagramRenderer>) -> Result<(), ConfigError> {
//! let mut engine = DiagramEngine::builder(EngineConfig::new(["mermaid"]), renderer)
//! 	.post_process(FitViewBox)
//! 	.build()?;
//!
//! let doc = Document::new([Element::new("codeBlock")
//! 	.attr("language", "mermaid")
//! 	.attr("id", "flow")
//! 	.text("graph TD\nA --> B")]);
//! let placements = engine.reconcile(&doc);
//! assert_eq!(placements.len(), 1);
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod container;
mod document;
mod engine;
mod error;
mod highlight;
mod render;
mod scan;

pub use cache::{CacheEntry, FingerprintCache};
pub use config::{DEFAULT_ALIASES, DEFAULT_DEBOUNCE_MS, DEFAULT_LANGUAGE, DEFAULT_TARGET_KIND, EngineConfig, EvictionPolicy};
pub use container::{Artifact, Container, Content, ERROR_CLASS};
pub use document::{Document, DocumentTree, Element, ID_ATTR, LANGUAGE_ATTR, Node, NodeView, TEXT_KIND};
pub use engine::{DiagramEngine, DiagramEngineBuilder, Placement, ScanStats, Side};
pub use error::{ConfigError, RenderError};
pub use highlight::{DiagramGrammar, HighlightRegistrar, MERMAID_GRAMMAR};
pub use render::{DiagramRenderer, FitViewBox, PostProcess, RenderedDiagram};
pub use scan::BlockSnapshot;

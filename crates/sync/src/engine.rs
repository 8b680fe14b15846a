//! The reconciliation engine.
//!
//! [`DiagramEngine::reconcile`] is called by the host on every document
//! change. It walks the snapshot, emits one placement per diagram block, and
//! schedules a debounced render for each block whose source changed since
//! the last scheduled render. The scan itself never waits on rendering;
//! renders complete later and mutate containers that are already placed.
//!
//! # Fingerprints
//!
//! A block's fingerprint is its trimmed source text. It is recorded the
//! moment a render is scheduled, not when it completes, so repeated scans
//! during a pending debounce window do not reschedule, and a failed render
//! is not retried until the source changes.
//!
//! # Ordering
//!
//! Two renders for the same block can overlap when an edit lands after the
//! first one has started. By default the one that completes last wins;
//! [`EngineConfig::discard_stale_renders`] keeps the most recently scheduled
//! one instead.

use std::sync::Arc;
use std::time::Duration;

use mermaid_worker::Debouncer;
use rustc_hash::FxHashSet;

use crate::cache::{CacheEntry, FingerprintCache};
use crate::config::{EngineConfig, EvictionPolicy};
use crate::container::Container;
use crate::document::{DocumentTree, NodeView};
use crate::error::ConfigError;
use crate::highlight::{HighlightRegistrar, register_language};
use crate::render::{DiagramRenderer, PostProcess, RenderPipeline};
use crate::scan::{BlockSnapshot, CandidateFilter};

/// Which side of its anchor a placement renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	/// After the anchor, so the diagram follows the block's text.
	After,
}

impl Side {
	/// Signed bias understood by placement compositors.
	pub const fn bias(self) -> i8 {
		match self {
			Self::After => 1,
		}
	}
}

/// A container positioned in the document.
#[derive(Debug, Clone)]
pub struct Placement {
	pub anchor: usize,
	pub container: Container,
	pub side: Side,
}

/// Summary of one scan, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
	pub candidates: usize,
	pub scheduled: usize,
	pub evicted: usize,
}

/// Builder for [`DiagramEngine`].
pub struct DiagramEngineBuilder {
	config: EngineConfig,
	renderer: Arc<dyn DiagramRenderer>,
	highlighter: Option<Arc<dyn HighlightRegistrar>>,
	post: Vec<Arc<dyn PostProcess>>,
}

impl DiagramEngineBuilder {
	/// Registers the diagram grammar and aliases with a highlighter at build time.
	pub fn highlighter(mut self, registrar: Arc<dyn HighlightRegistrar>) -> Self {
		self.highlighter = Some(registrar);
		self
	}

	/// Appends a post-processor run on every successful artifact.
	pub fn post_process(mut self, post: impl PostProcess + 'static) -> Self {
		self.post.push(Arc::new(post));
		self
	}

	/// Validates the configuration, initializes the renderer, and builds the engine.
	pub fn build(self) -> Result<DiagramEngine, ConfigError> {
		self.config.validate()?;
		let filter = CandidateFilter::new(&self.config)?;
		self.renderer.initialize(&self.config.renderer_init_options()).map_err(ConfigError::RendererInit)?;

		if let Some(registrar) = &self.highlighter {
			register_language(registrar.as_ref(), &self.config.language, &self.config.aliases);
		}

		tracing::debug!(
			target_kind = %self.config.target_kind,
			debounce_ms = self.config.debounce_ms,
			eviction = ?self.config.eviction,
			"diagram.engine.build"
		);

		Ok(DiagramEngine {
			filter,
			debounce: self.config.debounce_delay(),
			eviction: self.config.eviction,
			cache: FingerprintCache::new(self.config.container_classes),
			scheduler: Debouncer::new(),
			pipeline: RenderPipeline::new(self.renderer, self.post, self.config.discard_stale_renders),
			last_scan: ScanStats::default(),
		})
	}
}

/// Keeps rendered diagram containers in sync with a document's diagram blocks.
///
/// Each engine owns its cache and pending renders; separate editors use
/// separate engines. Dropping the engine cancels renders that have not
/// started.
pub struct DiagramEngine {
	filter: CandidateFilter,
	debounce: Duration,
	eviction: EvictionPolicy,
	cache: FingerprintCache,
	scheduler: Debouncer<String>,
	pipeline: RenderPipeline,
	last_scan: ScanStats,
}

impl std::fmt::Debug for DiagramEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DiagramEngine")
			.field("filter", &self.filter)
			.field("debounce", &self.debounce)
			.field("eviction", &self.eviction)
			.field("cache", &self.cache)
			.field("pending", &self.scheduler.pending_count())
			.finish()
	}
}

impl DiagramEngine {
	pub fn builder(config: EngineConfig, renderer: Arc<dyn DiagramRenderer>) -> DiagramEngineBuilder {
		DiagramEngineBuilder {
			config,
			renderer,
			highlighter: None,
			post: Vec::new(),
		}
	}

	/// Builds an engine with no highlighter and no post-processing.
	pub fn new(config: EngineConfig, renderer: Arc<dyn DiagramRenderer>) -> Result<Self, ConfigError> {
		Self::builder(config, renderer).build()
	}

	/// Scans `tree` and returns placements for every diagram block in document order.
	///
	/// Blocks whose source changed since their last scheduled render get a
	/// fresh debounced render, replacing any render still waiting out its
	/// window. Must be called from within a Tokio runtime, or renders run on
	/// a shared background runtime.
	pub fn reconcile<T>(&mut self, tree: &T) -> Vec<Placement>
	where
		T: DocumentTree + ?Sized,
	{
		let Self {
			filter,
			debounce,
			eviction,
			cache,
			scheduler,
			pipeline,
			..
		} = self;
		let sweep = *eviction == EvictionPolicy::SweepMissing;
		let doc_size = tree.size();

		let mut placements = Vec::new();
		let mut seen = FxHashSet::default();
		let mut stats = ScanStats::default();

		tree.walk(&mut |node| {
			let block = filter.snapshot(&node);
			let Some(id) = block.candidate_id() else {
				return;
			};
			debug_assert!(block.anchor <= doc_size, "anchor {} past document end {doc_size}", block.anchor);

			let entry = cache.get_or_create(id);
			placements.push(Placement {
				anchor: block.anchor,
				container: entry.container.clone(),
				side: Side::After,
			});
			stats.candidates += 1;
			if sweep {
				seen.insert(id.to_string());
			}

			let Some(generation) = entry.record_source(block.source) else {
				return;
			};
			let container = entry.container.clone();
			let pipeline = pipeline.clone();
			let (render_id, source) = (id.to_string(), block.source.to_string());
			scheduler.schedule(id.to_string(), *debounce, move || async move {
				pipeline.render_into(&container, &render_id, &source, generation).await;
			});
			stats.scheduled += 1;
		});

		if sweep {
			for id in cache.sweep(|id| seen.contains(id)) {
				scheduler.cancel(&id);
				stats.evicted += 1;
			}
		}

		tracing::debug!(candidates = stats.candidates, scheduled = stats.scheduled, evicted = stats.evicted, "diagram.reconcile");
		self.last_scan = stats;
		placements
	}

	/// Classifies one node the way [`Self::reconcile`] does, without side effects.
	pub fn classify<'a>(&self, node: &'a NodeView<'_>) -> BlockSnapshot<'a> {
		self.filter.snapshot(node)
	}

	/// Read-only cache lookup.
	pub fn peek(&self, id: &str) -> Option<&CacheEntry> {
		self.cache.peek(id)
	}

	pub fn cache(&self) -> &FingerprintCache {
		&self.cache
	}

	/// Statistics of the most recent [`Self::reconcile`].
	pub fn last_scan(&self) -> ScanStats {
		self.last_scan
	}

	/// Returns true while a render for `id` is waiting out its debounce window.
	pub fn is_render_pending(&self, id: &str) -> bool {
		self.scheduler.is_pending(id)
	}

	/// Number of renders waiting out their debounce window.
	pub fn pending_renders(&self) -> usize {
		self.scheduler.pending_count()
	}

	/// Drops the cache entry for `id` and cancels its pending render.
	///
	/// A render already in progress still completes against the old container.
	pub fn evict(&mut self, id: &str) -> bool {
		self.scheduler.cancel(id);
		self.cache.evict(id).is_some()
	}

	/// Cancels every render that has not started yet.
	pub fn cancel_all(&self) -> usize {
		self.scheduler.cancel_all()
	}

	/// Cancels pending renders and forgets every block.
	///
	/// The next scan treats all blocks as new, with fresh containers.
	pub fn shutdown(&mut self) {
		let cancelled = self.scheduler.cancel_all();
		let cached = self.cache.len();
		self.cache.clear();
		tracing::debug!(cancelled, cached, "diagram.engine.shutdown");
	}
}

//! Identifier-keyed fingerprint cache.
//!
//! Maps a block identifier to the source text last scheduled for rendering
//! and to the container the block owns. Entries are never evicted
//! implicitly; see [`crate::EvictionPolicy`].

use rustc_hash::FxHashMap;

use crate::container::Container;

/// Cached state for one block identifier.
#[derive(Debug, Clone)]
pub struct CacheEntry {
	/// Source text of the most recently scheduled render, if any.
	pub last_rendered_source: Option<String>,
	/// Container owned by the block; never replaced while the entry lives.
	pub container: Container,
	/// Number of renders scheduled for this identifier.
	pub generation: u64,
}

impl CacheEntry {
	fn new(container: Container) -> Self {
		Self {
			last_rendered_source: None,
			container,
			generation: 0,
		}
	}

	/// Records `source` as scheduled if it differs from the cached fingerprint.
	///
	/// Returns the new render generation on change, `None` on a cache hit.
	pub(crate) fn record_source(&mut self, source: &str) -> Option<u64> {
		if self.last_rendered_source.as_deref() == Some(source) {
			return None;
		}
		self.last_rendered_source = Some(source.to_string());
		self.generation = self.generation.wrapping_add(1);
		Some(self.generation)
	}
}

#[derive(Debug)]
pub struct FingerprintCache {
	classes: Vec<String>,
	entries: FxHashMap<String, CacheEntry>,
}

impl FingerprintCache {
	/// Creates an empty cache whose containers carry `classes`.
	pub fn new(classes: Vec<String>) -> Self {
		Self {
			classes,
			entries: FxHashMap::default(),
		}
	}

	/// Returns the entry for `id`, creating it with a fresh container on first sight.
	pub fn get_or_create(&mut self, id: &str) -> &mut CacheEntry {
		let classes = &self.classes;
		self.entries.entry(id.to_string()).or_insert_with(|| {
			tracing::trace!(id, "diagram.cache.create");
			CacheEntry::new(Container::new(classes))
		})
	}

	pub fn peek(&self, id: &str) -> Option<&CacheEntry> {
		self.entries.get(id)
	}

	pub fn evict(&mut self, id: &str) -> Option<CacheEntry> {
		self.entries.remove(id)
	}

	/// Evicts every entry for which `keep` returns false, returning the evicted identifiers.
	pub fn sweep(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
		let mut evicted = Vec::new();
		self.entries.retain(|id, _| {
			let retain = keep(id);
			if !retain {
				evicted.push(id.clone());
			}
			retain
		});
		evicted
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Cached identifiers in unspecified order.
	pub fn identifiers(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cache() -> FingerprintCache {
		FingerprintCache::new(vec!["mermaid".to_string()])
	}

	#[test]
	fn get_or_create_is_idempotent() {
		let mut cache = cache();
		let first = cache.get_or_create("a").container.clone();
		let second = cache.get_or_create("a").container.clone();
		assert!(first.ptr_eq(&second));
		assert_eq!(cache.len(), 1);
		assert!(first.has_class("mermaid"));
	}

	#[test]
	fn fresh_entry_has_no_fingerprint() {
		let mut cache = cache();
		assert!(cache.peek("a").is_none());
		cache.get_or_create("a");
		let entry = cache.peek("a").unwrap();
		assert_eq!(entry.last_rendered_source, None);
		assert_eq!(entry.generation, 0);
	}

	#[test]
	fn record_source_detects_changes_only() {
		let mut cache = cache();
		let entry = cache.get_or_create("a");
		assert_eq!(entry.record_source("graph TD"), Some(1));
		assert_eq!(entry.record_source("graph TD"), None);
		assert_eq!(entry.record_source("graph LR"), Some(2));
		assert_eq!(entry.last_rendered_source.as_deref(), Some("graph LR"));
	}

	#[test]
	fn sweep_reports_evicted_ids() {
		let mut cache = cache();
		for id in ["a", "b", "c"] {
			cache.get_or_create(id);
		}

		let mut evicted = cache.sweep(|id| id == "b");
		evicted.sort();
		assert_eq!(evicted, vec!["a".to_string(), "c".to_string()]);
		assert_eq!(cache.identifiers().collect::<Vec<_>>(), vec!["b"]);
	}

	#[test]
	fn evict_and_clear() {
		let mut cache = cache();
		cache.get_or_create("a");
		cache.get_or_create("b");
		assert!(cache.evict("a").is_some());
		assert!(cache.evict("a").is_none());
		cache.clear();
		assert!(cache.is_empty());
	}
}

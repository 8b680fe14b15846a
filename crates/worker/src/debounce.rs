//! Keyed debounce scheduling.
//!
//! A [`Debouncer`] holds at most one pending delayed task per key. Scheduling
//! again under the same key cancels the pending task (its closure is dropped
//! unexecuted) and restarts the quiescence window from zero.
//!
//! Once a window elapses the task claims its slot under the map lock and only
//! then starts its work. From that point the work is no longer cancellable:
//! a later [`Debouncer::schedule`] for the same key arms a fresh window and
//! may end up running concurrently with the started work.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::token::{GenerationClock, GenerationToken};
use crate::{TaskClass, spawn};

type PendingMap<K> = Arc<Mutex<FxHashMap<K, GenerationToken>>>;

/// Keyed, cancellable delayed-task scheduler.
///
/// Dropping the debouncer cancels every task that has not started yet.
#[derive(Debug)]
pub struct Debouncer<K> {
	pending: PendingMap<K>,
	clock: GenerationClock,
}

impl<K> Default for Debouncer<K>
where
	K: Eq + Hash + Clone + Debug + Send + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<K> Debouncer<K>
where
	K: Eq + Hash + Clone + Debug + Send + 'static,
{
	/// Creates a debouncer with no pending tasks.
	pub fn new() -> Self {
		Self {
			pending: Arc::new(Mutex::new(FxHashMap::default())),
			clock: GenerationClock::new(),
		}
	}

	/// Schedules `work` to run once `delay` passes without another schedule for `key`.
	///
	/// Returns the generation assigned to the new task.
	pub fn schedule<F, Fut>(&self, key: K, delay: Duration, work: F) -> u64
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		let token = GenerationToken::new(self.clock.next());
		let generation = token.generation();

		if let Some(previous) = self.pending.lock().insert(key.clone(), token.clone()) {
			previous.cancel();
			tracing::trace!(key = ?key, superseded = previous.generation(), generation, "debounce.restart");
		}

		let pending = Arc::clone(&self.pending);
		spawn(TaskClass::Debounce, async move {
			tokio::select! {
				biased;
				() = token.cancelled() => return,
				() = tokio::time::sleep(delay) => {}
			}

			if !claim(&pending, &key, &token) {
				return;
			}

			tracing::trace!(key = ?key, generation, delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "debounce.fire");
			work().await;
		});

		generation
	}

	/// Cancels the pending task for `key`, returning whether one existed.
	pub fn cancel<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Eq + Hash + Debug + ?Sized,
	{
		match self.pending.lock().remove(key) {
			Some(token) => {
				token.cancel();
				tracing::trace!(key = ?key, generation = token.generation(), "debounce.cancel");
				true
			}
			None => false,
		}
	}

	/// Cancels every pending task, returning how many were cancelled.
	pub fn cancel_all(&self) -> usize {
		let drained: Vec<_> = self.pending.lock().drain().collect();
		for (_, token) in &drained {
			token.cancel();
		}
		if !drained.is_empty() {
			tracing::trace!(cancelled = drained.len(), "debounce.cancel_all");
		}
		drained.len()
	}

	/// Returns true while a task for `key` is scheduled but not yet started.
	pub fn is_pending<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Eq + Hash + ?Sized,
	{
		self.pending.lock().contains_key(key)
	}

	/// Returns the number of scheduled-but-not-started tasks.
	pub fn pending_count(&self) -> usize {
		self.pending.lock().len()
	}
}

impl<K> Drop for Debouncer<K> {
	fn drop(&mut self) {
		for (_, token) in self.pending.lock().drain() {
			token.cancel();
		}
	}
}

/// Removes the fired task's own entry, unless it was cancelled or superseded.
///
/// Cancellation and replacement both happen under the same lock, so a task
/// either claims its slot before a reschedule or observes the cancellation.
fn claim<K>(pending: &Mutex<FxHashMap<K, GenerationToken>>, key: &K, token: &GenerationToken) -> bool
where
	K: Eq + Hash,
{
	let mut map = pending.lock();
	if token.is_cancelled() {
		return false;
	}
	match map.get(key) {
		Some(current) if current.generation() == token.generation() => {
			map.remove(key);
			true
		}
		_ => false,
	}
}

#[cfg(test)]
mod tests;

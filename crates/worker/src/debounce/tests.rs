use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::*;

const DELAY: Duration = Duration::from_millis(300);

fn recorder() -> Arc<Mutex<Vec<String>>> {
	Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &Arc<Mutex<Vec<String>>>, value: &str) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
	let log = Arc::clone(log);
	let value = value.to_string();
	move || {
		log.lock().push(value);
		std::future::ready(())
	}
}

#[tokio::test(start_paused = true)]
async fn fires_once_after_quiescence() {
	let debouncer = Debouncer::new();
	let log = recorder();

	debouncer.schedule("a", DELAY, record(&log, "v1"));
	assert!(debouncer.is_pending(&"a"));

	tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
	assert!(log.lock().is_empty(), "must not fire before the window elapses");

	tokio::time::sleep(Duration::from_millis(2)).await;
	assert_eq!(*log.lock(), vec!["v1".to_string()]);
	assert!(!debouncer.is_pending(&"a"));
}

#[tokio::test(start_paused = true)]
async fn rapid_reschedules_coalesce_to_last_work() {
	let debouncer = Debouncer::new();
	let log = recorder();

	for i in 0..10 {
		debouncer.schedule("a", DELAY, record(&log, &format!("v{i}")));
		tokio::time::sleep(Duration::from_millis(50)).await;
	}
	assert_eq!(debouncer.pending_count(), 1);

	tokio::time::sleep(DELAY).await;
	assert_eq!(*log.lock(), vec!["v9".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn reschedule_restarts_window_from_zero() {
	let debouncer = Debouncer::new();
	let log = recorder();

	debouncer.schedule("a", DELAY, record(&log, "first"));
	tokio::time::sleep(Duration::from_millis(250)).await;
	debouncer.schedule("a", DELAY, record(&log, "second"));

	// 100ms past the first deadline, still inside the restarted window.
	tokio::time::sleep(Duration::from_millis(150)).await;
	assert!(log.lock().is_empty());

	tokio::time::sleep(Duration::from_millis(200)).await;
	assert_eq!(*log.lock(), vec!["second".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn keys_are_independent() {
	let debouncer = Debouncer::new();
	let log = recorder();

	debouncer.schedule("a", DELAY, record(&log, "a"));
	debouncer.schedule("b", DELAY, record(&log, "b"));
	assert_eq!(debouncer.pending_count(), 2);

	tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
	let mut fired = log.lock().clone();
	fired.sort();
	assert_eq!(fired, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_pending_work() {
	let debouncer = Debouncer::new();
	let log = recorder();

	debouncer.schedule("a", DELAY, record(&log, "a"));
	assert!(debouncer.cancel(&"a"));
	assert!(!debouncer.cancel(&"a"));

	tokio::time::sleep(DELAY * 2).await;
	assert!(log.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_clears_every_key() {
	let debouncer = Debouncer::new();
	let log = recorder();

	for key in ["a", "b", "c"] {
		debouncer.schedule(key, DELAY, record(&log, key));
	}
	assert_eq!(debouncer.cancel_all(), 3);
	assert_eq!(debouncer.pending_count(), 0);

	tokio::time::sleep(DELAY * 2).await;
	assert!(log.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_pending_work() {
	let log = recorder();
	{
		let debouncer = Debouncer::new();
		debouncer.schedule("a", DELAY, record(&log, "a"));
	}

	tokio::time::sleep(DELAY * 2).await;
	assert!(log.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn started_work_is_not_cancelled() {
	let debouncer = Debouncer::new();
	let finished = Arc::new(AtomicUsize::new(0));

	let done = Arc::clone(&finished);
	debouncer.schedule("a", DELAY, move || async move {
		tokio::time::sleep(Duration::from_secs(1)).await;
		done.fetch_add(1, Ordering::SeqCst);
	});

	tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
	assert!(!debouncer.is_pending(&"a"), "fired task releases its slot before running");
	assert_eq!(debouncer.cancel_all(), 0);

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_delay_still_defers() {
	let debouncer = Debouncer::new();
	let log = recorder();

	debouncer.schedule("a", Duration::ZERO, record(&log, "a"));
	assert!(log.lock().is_empty(), "work never runs inline with schedule");

	tokio::time::sleep(Duration::from_millis(1)).await;
	assert_eq!(log.lock().len(), 1);
}

#[test]
fn generations_increase_per_schedule() {
	let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
	let _guard = rt.enter();
	let debouncer = Debouncer::new();

	let first = debouncer.schedule("a", DELAY, || async {});
	let second = debouncer.schedule("a", DELAY, || async {});
	let other = debouncer.schedule("b", DELAY, || async {});
	assert!(first < second && second < other);
}

#[tokio::test(start_paused = true)]
async fn oversized_delay_stays_pending() {
	let log = recorder();
	let debouncer = Debouncer::new();
	debouncer.schedule("a", Duration::MAX, record(&log, "never"));

	tokio::time::sleep(Duration::from_secs(3600)).await;
	assert!(debouncer.is_pending(&"a"));
	assert!(log.lock().is_empty());
	assert!(debouncer.cancel(&"a"));
}

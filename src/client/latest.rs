//! Single-slot cache for the most recent decoded sample

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Consumer-supplied sample handler
///
/// Runs on the worker thread and must not block; a handler that panics is
/// caught and logged, never propagated into the read loop.
pub type SampleHandler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Thread-safe single-slot store of the latest decoded sample
///
/// The worker thread is the sole writer; any number of reader threads may
/// take a snapshot. The registered callback is invoked outside the lock so
/// a slow consumer cannot block readers or the worker.
pub struct LatestCache<T> {
    slot: Mutex<Option<T>>,
    on_sample: Option<SampleHandler<T>>,
    name: &'static str,
}

impl<T: Clone> LatestCache<T> {
    pub fn new(name: &'static str, on_sample: Option<SampleHandler<T>>) -> Self {
        Self {
            slot: Mutex::new(None),
            on_sample,
            name,
        }
    }

    /// Replace the cached value and notify the callback (outside the lock)
    pub fn update(&self, value: T) {
        {
            let mut slot = self.slot.lock();
            *slot = Some(value.clone());
        }

        if let Some(ref callback) = self.on_sample {
            if catch_unwind(AssertUnwindSafe(|| callback(&value))).is_err() {
                log::error!("{}: sample callback panicked (ignored)", self.name);
            }
        }
    }

    /// Snapshot of the most recent value, or None before the first decode
    pub fn get(&self) -> Option<T> {
        self.slot.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_empty_until_first_update() {
        let cache: LatestCache<u32> = LatestCache::new("test", None);
        assert_eq!(cache.get(), None);

        cache.update(7);
        assert_eq!(cache.get(), Some(7));
    }

    #[test]
    fn test_get_is_idempotent() {
        let cache = LatestCache::new("test", None);
        cache.update(42u32);
        // Repeated reads without new data return the same value
        assert_eq!(cache.get(), Some(42));
        assert_eq!(cache.get(), Some(42));
        assert_eq!(cache.get(), Some(42));
    }

    #[test]
    fn test_update_replaces_value_and_fires_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let cache = LatestCache::new(
            "test",
            Some(Box::new(move |_: &u32| {
                seen.fetch_add(1, Ordering::Relaxed);
            }) as SampleHandler<u32>),
        );

        cache.update(1);
        cache.update(2);
        assert_eq!(cache.get(), Some(2));
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_callback_panic_is_isolated() {
        let cache = LatestCache::new(
            "test",
            Some(Box::new(|_: &u32| panic!("consumer bug")) as SampleHandler<u32>),
        );

        // Neither update panics, and the cache state stays consistent
        cache.update(1);
        cache.update(2);
        assert_eq!(cache.get(), Some(2));
    }
}

//! Culture dictionary cache.

use std::num::NonZeroUsize;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};
use std::time::{
    Duration,
    Instant,
};

use lru::LruCache;

use crate::dictionary::CultureDictionary;
use crate::store::StoreError;

/// Cultures kept by the default policy.
const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(32) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Eviction settings of a [`MemoryDictionaryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Cultures kept before the least recently used is evicted.
    pub capacity: NonZeroUsize,
    /// Age after which a dictionary is rebuilt. `None` keeps it forever.
    pub time_to_live: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, time_to_live: None }
    }
}

/// Builds a dictionary on a cache miss.
pub type DictionaryBuilder<'a> = &'a dyn Fn() -> Result<CultureDictionary, StoreError>;

/// Cache of culture dictionaries keyed by the culture identifier as given.
pub trait DictionaryCache: Send + Sync {
    /// Cached dictionary of `culture`, built with `build` on a miss.
    ///
    /// A failed build is not cached.
    fn get_or_build(
        &self,
        culture: &str,
        build: DictionaryBuilder<'_>,
    ) -> Result<Arc<CultureDictionary>, StoreError>;

    /// Drops the cached dictionary of `culture`.
    fn invalidate(&self, culture: &str);

    /// Drops every cached dictionary.
    fn clear(&self);
}

/// Built dictionary and when it was built.
type SlotValue = Option<(Arc<CultureDictionary>, Instant)>;

/// Per-culture slot; its mutex serializes builds of one culture.
#[derive(Debug, Default)]
struct Slot {
    /// Dictionary once built.
    value: Mutex<SlotValue>,
}

/// In-memory LRU cache with an optional time-to-live.
#[derive(Debug)]
pub struct MemoryDictionaryCache {
    /// Capacity and time-to-live.
    policy: CachePolicy,
    /// Slots in least recently used order.
    slots: Mutex<LruCache<String, Arc<Slot>>>,
}

impl MemoryDictionaryCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self { policy, slots: Mutex::new(LruCache::new(policy.capacity)) }
    }

    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Number of cultures with a slot.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot of `key`, created and marked most recently used on a miss.
    fn slot(&self, key: &str) -> Arc<Slot> {
        let mut slots = lock(&self.slots);
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        let slot = Arc::new(Slot::default());
        let _ = slots.put(key.to_string(), Arc::clone(&slot));
        slot
    }

    /// True while a dictionary built at `built_at` is within its time-to-live.
    fn is_fresh(&self, built_at: Instant) -> bool {
        self.policy.time_to_live.is_none_or(|ttl| built_at.elapsed() < ttl)
    }
}

impl Default for MemoryDictionaryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl DictionaryCache for MemoryDictionaryCache {
    fn get_or_build(
        &self,
        culture: &str,
        build: DictionaryBuilder<'_>,
    ) -> Result<Arc<CultureDictionary>, StoreError> {
        let slot = self.slot(culture);
        let mut value = lock(&slot.value);

        if let Some((dictionary, built_at)) = value.as_ref()
            && self.is_fresh(*built_at)
        {
            return Ok(Arc::clone(dictionary));
        }

        tracing::debug!(culture = %culture, "Building culture dictionary");
        let dictionary = Arc::new(build()?);
        *value = Some((Arc::clone(&dictionary), Instant::now()));
        Ok(dictionary)
    }

    fn invalidate(&self, culture: &str) {
        let _ = lock(&self.slots).pop(culture);
    }

    fn clear(&self) {
        lock(&self.slots).clear();
    }
}

/// Locks `mutex`, recovering the data of a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };
    use std::thread;

    use rstest::rstest;

    use super::*;

    fn counting_builder<'a>(
        counter: &'a AtomicUsize,
        culture: &'static str,
    ) -> impl Fn() -> Result<CultureDictionary, StoreError> + 'a {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CultureDictionary::empty(culture))
        }
    }

    #[rstest]
    fn test_builds_once_per_culture() {
        let cache = MemoryDictionaryCache::default();
        let builds = AtomicUsize::new(0);
        let build = counting_builder(&builds, "fr");

        let first = cache.get_or_build("fr", &build).unwrap();
        let second = cache.get_or_build("fr", &build).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_culture_key_is_not_case_folded() {
        let cache = MemoryDictionaryCache::default();
        let builds = AtomicUsize::new(0);

        let upper = cache.get_or_build("FR", &counting_builder(&builds, "FR")).unwrap();
        let lower = cache.get_or_build("fr", &counting_builder(&builds, "fr")).unwrap();

        assert!(!Arc::ptr_eq(&upper, &lower));
        assert_eq!(lower.culture(), "fr");
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn test_concurrent_requests_build_once() {
        let cache = MemoryDictionaryCache::default();
        let builds = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let build = || -> Result<CultureDictionary, StoreError> {
                        builds.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok(CultureDictionary::empty("de"))
                    };
                    cache.get_or_build("de", &build).unwrap();
                });
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_failed_build_is_not_cached() {
        let cache = MemoryDictionaryCache::default();
        let failing = || -> Result<CultureDictionary, StoreError> {
            Err(StoreError::Parse {
                path: PathBuf::from("fr/messages.po"),
                line: 1,
                message: "broken".to_string(),
            })
        };

        assert!(cache.get_or_build("fr", &failing).is_err());

        let builds = AtomicUsize::new(0);
        cache.get_or_build("fr", &counting_builder(&builds, "fr")).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn test_lru_eviction_keeps_handed_out_dictionary() {
        let policy = CachePolicy { capacity: NonZeroUsize::MIN, time_to_live: None };
        let cache = MemoryDictionaryCache::new(policy);
        let builds = AtomicUsize::new(0);

        let french = cache.get_or_build("fr", &counting_builder(&builds, "fr")).unwrap();
        cache.get_or_build("de", &counting_builder(&builds, "de")).unwrap();
        assert_eq!(cache.len(), 1);

        assert_eq!(french.culture(), "fr");
        cache.get_or_build("fr", &counting_builder(&builds, "fr")).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    fn test_time_to_live_rebuilds() {
        let policy = CachePolicy { time_to_live: Some(Duration::ZERO), ..CachePolicy::default() };
        let cache = MemoryDictionaryCache::new(policy);
        let builds = AtomicUsize::new(0);
        let build = counting_builder(&builds, "fr");

        cache.get_or_build("fr", &build).unwrap();
        cache.get_or_build("fr", &build).unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn test_invalidate_and_clear() {
        let cache = MemoryDictionaryCache::default();
        let builds = AtomicUsize::new(0);
        let build = counting_builder(&builds, "fr");

        cache.get_or_build("fr", &build).unwrap();
        cache.invalidate("fr");
        cache.get_or_build("fr", &build).unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}

//! Per-type descriptor cache.
//!
//! Each type gets a build-once cell. The first caller builds the set; any
//! concurrent caller for the same type blocks on the same cell and sees the
//! same result. Failures are cached too.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{debug, warn};

use super::descriptor::{Describe, DescriptorSet};
use super::errors::DescriptorResult;

type Cell = Arc<OnceLock<DescriptorResult<Arc<DescriptorSet>>>>;

/// Injectable type → descriptor cache.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<TypeId, Cell>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors for `T`, building them on first use.
    pub fn resolve<T: Describe>(&self) -> DescriptorResult<Arc<DescriptorSet>> {
        let id = TypeId::of::<T>();

        if let Some(cell) = self.entries.get(&id) {
            if let Some(result) = cell.get() {
                return result.clone();
            }
        }

        // Clone the cell out so the shard lock is not held while building.
        let cell = self.entries.entry(id).or_default().clone();
        cell.get_or_init(|| {
            debug!(type_name = T::type_name(), "building descriptors");
            let built = DescriptorSet::of::<T>().map(Arc::new);
            if let Err(err) = &built {
                warn!(type_name = T::type_name(), error = %err, "descriptor build failed");
            }
            built
        })
        .clone()
    }

    /// Whether `T` has been resolved (successfully or not).
    pub fn contains<T: Describe>(&self) -> bool {
        self.entries
            .get(&TypeId::of::<T>())
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorError, FieldDef};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Describe for Counted {
        fn field_defs() -> Vec<FieldDef> {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            vec![FieldDef::text("name"), FieldDef::int("id")]
        }
    }

    struct Broken;

    impl Describe for Broken {
        fn field_defs() -> Vec<FieldDef> {
            vec![FieldDef::text("name").column("a").column("b")]
        }
    }

    #[test]
    fn test_builds_once_per_type() {
        let cache = Arc::new(DescriptorCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.resolve::<Counted>().unwrap())
            })
            .collect();
        let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(sets.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(cache.contains::<Counted>());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_is_cached() {
        let cache = DescriptorCache::new();
        let first = cache.resolve::<Broken>().unwrap_err();
        let second = cache.resolve::<Broken>().unwrap_err();

        assert!(matches!(first, DescriptorError::Conflicting { .. }));
        assert_eq!(first, second);
        assert!(cache.contains::<Broken>());
    }

    #[test]
    fn test_separate_caches_are_independent() {
        let a = DescriptorCache::new();
        let b = DescriptorCache::new();
        a.resolve::<Broken>().unwrap_err();
        assert!(!b.contains::<Broken>());
        assert!(b.is_empty());
    }
}

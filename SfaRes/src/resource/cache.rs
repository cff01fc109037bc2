//! Per-id resource caching
//!
//! Entries are loaded on first request and never evicted. Concurrent loads of
//! the same id may both run; the first to insert wins and every caller gets
//! that entry. A failed load is remembered as absent and never retried.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};

/// Cache statistics for debugging
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub absent: usize,
}

/// Cache of loaded resources keyed by numeric id.
#[derive(Debug)]
pub struct IdCache<T> {
    kind: &'static str,
    /// `None` marks an id whose load failed.
    entries: RwLock<HashMap<u32, Option<Arc<T>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<T> IdCache<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Return the cached entry for `id`, running `load` on first request.
    ///
    /// # Errors
    /// Returns the loader's error on the failing call, and
    /// [`Error::ResourceAbsent`] on every later request for the same id.
    pub fn get_or_load<F>(&self, id: u32, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(entry) = self.cached(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.ok_or(Error::ResourceAbsent { kind: self.kind, id });
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let loaded = load().map(Arc::new);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let slot = entries
            .entry(id)
            .or_insert_with(|| loaded.as_ref().ok().map(Arc::clone));

        match (slot, loaded) {
            (Some(entry), _) => Ok(Arc::clone(entry)),
            (None, Err(e)) => {
                tracing::warn!("Failed to load {} #{id}: {e}", self.kind);
                Err(e)
            }
            (None, Ok(_)) => Err(Error::ResourceAbsent { kind: self.kind, id }),
        }
    }

    /// `Some(entry)` if `id` has been requested before.
    fn cached(&self, id: u32) -> Option<Option<Arc<T>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&id).cloned()
    }

    pub fn contains(&self, id: u32) -> bool {
        matches!(self.cached(id), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            absent: entries.values().filter(|e| e.is_none()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_once() {
        let cache = IdCache::new("test");
        let mut calls = 0;
        let a = cache
            .get_or_load(3, || {
                calls += 1;
                Ok(vec![1u8, 2])
            })
            .unwrap();
        let b = cache.get_or_load(3, || unreachable!()).unwrap();
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, absent: 0 });
    }

    #[test]
    fn test_failure_is_permanent() {
        let cache: IdCache<u8> = IdCache::new("test");
        let first = cache.get_or_load(9, || Err(Error::UnexpectedEof)).unwrap_err();
        assert!(matches!(first, Error::UnexpectedEof));

        let second = cache.get_or_load(9, || Ok(1)).unwrap_err();
        assert!(matches!(second, Error::ResourceAbsent { kind: "test", id: 9 }));
        assert!(!cache.contains(9));
        assert_eq!(cache.stats().absent, 1);
    }

    #[test]
    fn test_concurrent_loads_converge() {
        let cache: IdCache<Vec<u8>> = IdCache::new("test");
        let results: Vec<Arc<Vec<u8>>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.get_or_load(1, || Ok(vec![0xAB; 16])).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(cache.len(), 1);
    }
}

// Path: crates/dps-invoker/src/cache.rs
//! The process-wide, size-bounded register-read cache (`spec.md` §4.7):
//! keyed by `(height, path)`, capacity expressed in bytes rather than entry
//! count, evicting least-recently-used entries until back under budget.
//!
//! `lru::LruCache` itself only bounds entry count, so capacity here is
//! tracked separately (`current_bytes`) alongside an unbounded
//! `LruCache`, the same two-number bookkeeping `dps-storage::PayloadStoreImpl`
//! uses for its own eviction accounting.

use dps_types::{Height, LedgerPath, LedgerValue};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// A thread-safe, byte-budgeted LRU cache of register reads.
pub struct RegisterCache {
    entries: Mutex<LruCache<(Height, LedgerPath), LedgerValue>>,
    budget_bytes: usize,
    current_bytes: Mutex<usize>,
}

const KEY_COST: usize = std::mem::size_of::<(Height, LedgerPath)>();

fn entry_cost(value: &LedgerValue) -> usize {
    KEY_COST + value.len()
}

impl RegisterCache {
    /// Builds a cache with the given byte budget. Callers must not pass
    /// zero; `crate::config::InvokerConfig::validate` rejects that before
    /// construction ever reaches here.
    pub fn new(budget_bytes: usize) -> Self {
        assert!(budget_bytes > 0, "register cache budget must be nonzero");
        Self {
            // Entry-count bound is unreachable in practice (bytes evict
            // first); NonZeroUsize::MAX just satisfies the LruCache API.
            entries: Mutex::new(LruCache::new(NonZeroUsize::new(usize::MAX).unwrap())),
            budget_bytes,
            current_bytes: Mutex::new(0),
        }
    }

    /// Returns a cached value, if present, promoting it to most-recently-used.
    pub fn get(&self, height: Height, path: LedgerPath) -> Option<LedgerValue> {
        let mut entries = self.entries.lock().unwrap();
        entries.get(&(height, path)).cloned()
    }

    /// Inserts a value, evicting least-recently-used entries until the
    /// total tracked size is back within budget.
    pub fn put(&self, height: Height, path: LedgerPath, value: LedgerValue) {
        let cost = entry_cost(&value);
        let mut entries = self.entries.lock().unwrap();
        let mut current = self.current_bytes.lock().unwrap();

        if let Some(old) = entries.put((height, path), value) {
            *current = current.saturating_sub(entry_cost(&old));
        }
        *current += cost;

        while *current > self.budget_bytes {
            match entries.pop_lru() {
                Some((_, evicted_value)) => {
                    *current = current.saturating_sub(entry_cost(&evicted_value));
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(byte: u8) -> LedgerPath {
        LedgerPath::new([byte; 32])
    }

    #[test]
    fn round_trips_a_value() {
        let cache = RegisterCache::new(1024);
        cache.put(10, path(1), vec![1, 2, 3]);
        assert_eq!(cache.get(10, path(1)), Some(vec![1, 2, 3]));
    }

    #[test]
    fn misses_on_different_height() {
        let cache = RegisterCache::new(1024);
        cache.put(10, path(1), vec![1, 2, 3]);
        assert_eq!(cache.get(11, path(1)), None);
    }

    #[test]
    fn evicts_oldest_entry_once_over_budget() {
        let cost = entry_cost(&vec![0u8; 8]);
        let cache = RegisterCache::new(cost + 4);
        cache.put(1, path(1), vec![0u8; 8]);
        cache.put(2, path(2), vec![0u8; 8]);
        assert_eq!(cache.get(1, path(1)), None);
        assert_eq!(cache.get(2, path(2)), Some(vec![0u8; 8]));
    }
}

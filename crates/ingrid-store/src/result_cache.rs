//! # Result Cache
//!
//! The single most-recent scan result, stored as JSON under `scan_result`.
//!
//! ```text
//! save(result) ──► memory slot ──► store["scan_result"]   (write-through)
//! load()       ◄── memory slot ◄── store["scan_result"]   (read-through)
//! ```
//!
//! A save always overwrites; results are never merged. If the store fails
//! the memory slot keeps the value for the rest of the process.

use std::sync::{Arc, Mutex};

use ingrid_core::ScanResult;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Storage key of the most recent result.
pub const SCAN_RESULT_KEY: &str = "scan_result";

/// Single-slot cache of the most recent [`ScanResult`].
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    slot: Mutex<Option<ScanResult>>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        ResultCache {
            store,
            slot: Mutex::new(None),
        }
    }

    /// Replaces the cached result.
    pub fn save(&self, result: &ScanResult) {
        {
            let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
            *slot = Some(result.clone());
        }

        if let Err(e) = self.write(result) {
            warn!(
                error = %e,
                product_id = %result.product.id,
                "Could not persist scan result, keeping it in memory"
            );
        }
    }

    /// Returns the cached result, or `None` if nothing was saved.
    pub fn load(&self) -> Option<ScanResult> {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(result) = slot.as_ref() {
            return Some(result.clone());
        }

        match self.read() {
            Ok(Some(result)) => {
                *slot = Some(result.clone());
                Some(result)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read cached scan result");
                None
            }
        }
    }

    /// Updates the bookmark flag of the cached result if it holds
    /// `product_id`. Returns true if the cache changed.
    pub fn set_bookmarked(&self, product_id: &str, bookmarked: bool) -> bool {
        let Some(mut result) = self.load() else {
            return false;
        };
        if result.product.id != product_id {
            debug!(product_id = %product_id, "Cached result holds another product");
            return false;
        }

        result.is_bookmarked = bookmarked;
        self.save(&result);
        true
    }

    /// Empties the slot.
    pub fn clear(&self) {
        {
            let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
            *slot = None;
        }
        if let Err(e) = self.store.remove(SCAN_RESULT_KEY) {
            warn!(error = %e, "Could not remove cached scan result");
        }
    }

    fn write(&self, result: &ScanResult) -> StoreResult<()> {
        let json =
            serde_json::to_string(result).map_err(|e| StoreError::corrupt(SCAN_RESULT_KEY, e))?;
        self.store.set(SCAN_RESULT_KEY, &json)
    }

    fn read(&self) -> StoreResult<Option<ScanResult>> {
        let Some(json) = self.store.get(SCAN_RESULT_KEY)? else {
            return Ok(None);
        };
        let result: ScanResult =
            serde_json::from_str(&json).map_err(|e| StoreError::corrupt(SCAN_RESULT_KEY, e))?;
        Ok(Some(result.normalized()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FailingStore, FileStore, MemoryStore};
    use ingrid_core::{ProductRecord, Rating};

    fn result(id: &str, count: usize) -> ScanResult {
        let ingredients = (0..count).map(|i| format!("ingredient {i}")).collect();
        ScanResult::new(ProductRecord::new(id, "Test", ingredients), false)
    }

    #[test]
    fn test_empty_cache_reports_not_found() {
        let cache = ResultCache::new(Arc::new(MemoryStore::new()));
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let cache = ResultCache::new(Arc::new(MemoryStore::new()));
        let saved = result("p1", 3);
        cache.save(&saved);
        assert_eq!(cache.load(), Some(saved));
    }

    #[test]
    fn test_save_overwrites_previous_result() {
        let cache = ResultCache::new(Arc::new(MemoryStore::new()));
        cache.save(&result("p1", 3));
        cache.save(&result("p2", 12));

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.product.id, "p2");
        assert_eq!(loaded.product.rating, Rating::Red);
    }

    #[test]
    fn test_result_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        ResultCache::new(Arc::new(FileStore::open(dir.path()).unwrap())).save(&result("p1", 6));

        let reopened = ResultCache::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.product.id, "p1");
        assert_eq!(loaded.product.rating, Rating::Amber);
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(SCAN_RESULT_KEY, "{not json").unwrap();
        assert!(ResultCache::new(store).load().is_none());
    }

    #[test]
    fn test_set_bookmarked_only_touches_matching_product() {
        let cache = ResultCache::new(Arc::new(MemoryStore::new()));
        cache.save(&result("p1", 3));

        assert!(!cache.set_bookmarked("other", true));
        assert!(!cache.load().unwrap().is_bookmarked);

        assert!(cache.set_bookmarked("p1", true));
        assert!(cache.load().unwrap().is_bookmarked);
    }

    #[test]
    fn test_failing_store_keeps_result_in_memory() {
        let cache = ResultCache::new(Arc::new(FailingStore));
        cache.save(&result("p1", 3));
        assert_eq!(cache.load().unwrap().product.id, "p1");
    }

    #[test]
    fn test_clear() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResultCache::new(store.clone());
        cache.save(&result("p1", 3));
        cache.clear();
        assert!(cache.load().is_none());
        assert_eq!(store.get(SCAN_RESULT_KEY).unwrap(), None);
    }
}

//! # Result Store
//!
//! The most recent result plus bookmark reconciliation.
//!
//! ## Bookmark Toggle
//! ```text
//! toggle_bookmark(session, product_id)
//!      │
//!      ▼
//! POST /bookmarks/toggle ──► Err ──► cache untouched, Err returned
//!      │
//!      ▼ Ok({bookmarked})
//! cache.set_bookmarked(product_id, bookmarked)   (only if it holds that product)
//!      │
//!      ▼
//! Ok(bookmarked)
//! ```
//!
//! The cached flag only ever takes a value confirmed by the backend.

use std::sync::Arc;

use ingrid_core::{ScanResult, SessionId};
use ingrid_store::ResultCache;
use tracing::{info, warn};

use crate::backend::ScanBackend;
use crate::error::ClientResult;

pub struct ResultStore {
    cache: ResultCache,
    backend: Arc<dyn ScanBackend>,
}

impl ResultStore {
    pub fn new(cache: ResultCache, backend: Arc<dyn ScanBackend>) -> Self {
        ResultStore { cache, backend }
    }

    /// Replaces the current result.
    pub fn save(&self, result: &ScanResult) {
        self.cache.save(result);
    }

    /// The current result, or `None` if nothing has been resolved yet.
    pub fn load(&self) -> Option<ScanResult> {
        self.cache.load()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Toggles the bookmark on the backend, then records the confirmed state.
    pub async fn toggle_bookmark(
        &self,
        session: &SessionId,
        product_id: &str,
    ) -> ClientResult<bool> {
        let toggle = match self.backend.toggle_bookmark(session, product_id).await {
            Ok(toggle) => toggle,
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Bookmark toggle failed");
                return Err(e);
            }
        };

        self.cache.set_bookmarked(product_id, toggle.bookmarked);
        info!(
            product_id = %product_id,
            bookmarked = toggle.bookmarked,
            message = toggle.message.as_deref().unwrap_or(""),
            "Bookmark updated"
        );
        Ok(toggle.bookmarked)
    }
}

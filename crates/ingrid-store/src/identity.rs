//! # Identity Provider
//!
//! Supplies the anonymous session identity that scopes history and
//! favorites on the backend.
//!
//! ## Lookup Order
//! ```text
//! get_or_create()
//!      │
//!      ├── 1. in-process cache ─────────────────────────► return
//!      │
//!      ├── 2. store["ingrid_session_id"] (non-blank) ───► cache, return
//!      │
//!      └── 3. SessionId::generate() ──► store.set() ────► cache, return
//!                                         │
//!                                         └── failure: warn, keep in memory
//! ```
//!
//! Once a value exists in storage it is never regenerated.

use std::sync::{Arc, Mutex};

use ingrid_core::SessionId;
use tracing::{info, warn};

use crate::kv::KeyValueStore;

/// Storage key of the session identity.
pub const SESSION_ID_KEY: &str = "ingrid_session_id";

/// Provides the per-profile session identity.
pub struct IdentityProvider {
    store: Arc<dyn KeyValueStore>,
    cached: Mutex<Option<SessionId>>,
}

impl IdentityProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        IdentityProvider {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Returns the stored identity, creating and persisting one if needed.
    ///
    /// Never fails: storage errors degrade to an identity that is stable
    /// for the lifetime of this provider.
    pub fn get_or_create(&self) -> SessionId {
        let mut cached = self.cached.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.read_stored() {
            Some(id) => id,
            None => {
                let id = SessionId::generate();
                match self.store.set(SESSION_ID_KEY, id.as_str()) {
                    Ok(()) => info!(session_id = %id, "Created session identity"),
                    Err(e) => warn!(
                        error = %e,
                        session_id = %id,
                        "Could not persist session identity, using it for this run only"
                    ),
                }
                id
            }
        };

        *cached = Some(id.clone());
        id
    }

    fn read_stored(&self) -> Option<SessionId> {
        match self.store.get(SESSION_ID_KEY) {
            Ok(Some(raw)) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return None;
                }
                match SessionId::new(raw) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!(error = %e, "Stored session identity unusable, generating a new one");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    error = %e,
                    backend = self.store.backend_name(),
                    "Could not read session identity"
                );
                None
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FailingStore, FileStore, MemoryStore};

    #[test]
    fn test_fresh_profile_generates_identity() {
        let store = Arc::new(MemoryStore::new());
        let provider = IdentityProvider::new(store.clone());

        let id = provider.get_or_create();
        assert!(SessionId::is_generated_format(id.as_str()));
        assert_eq!(
            store.get(SESSION_ID_KEY).unwrap().as_deref(),
            Some(id.as_str())
        );
    }

    #[test]
    fn test_identity_is_idempotent() {
        let provider = IdentityProvider::new(Arc::new(MemoryStore::new()));
        let first = provider.get_or_create();
        let second = provider.get_or_create();
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_identity_is_reused() {
        let store = Arc::new(MemoryStore::new());
        store.set(SESSION_ID_KEY, "session_legacy01").unwrap();

        let provider = IdentityProvider::new(store);
        assert_eq!(provider.get_or_create().as_str(), "session_legacy01");
    }

    #[test]
    fn test_blank_stored_identity_is_replaced() {
        let store = Arc::new(MemoryStore::new());
        store.set(SESSION_ID_KEY, "   ").unwrap();

        let provider = IdentityProvider::new(store.clone());
        let id = provider.get_or_create();
        assert!(SessionId::is_generated_format(id.as_str()));
        assert_eq!(
            store.get(SESSION_ID_KEY).unwrap().as_deref(),
            Some(id.as_str())
        );
    }

    #[test]
    fn test_identity_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let first = IdentityProvider::new(Arc::new(FileStore::open(dir.path()).unwrap()))
            .get_or_create();
        let second = IdentityProvider::new(Arc::new(FileStore::open(dir.path()).unwrap()))
            .get_or_create();
        assert_eq!(first, second);
    }

    #[test]
    fn test_storage_failure_degrades_to_stable_memory_identity() {
        let provider = IdentityProvider::new(Arc::new(FailingStore));
        let first = provider.get_or_create();
        let second = provider.get_or_create();
        assert!(SessionId::is_generated_format(first.as_str()));
        assert_eq!(first, second);
    }
}

//! # ingrid-store: Client-Local Persistence for the Ingrid Scanner
//!
//! This crate provides the small amount of state the scanner keeps on the
//! client: the anonymous session identity and the most recent scan result.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ingrid Data Flow                                 │
//! │                                                                         │
//! │  Workflow controller (select mode, submit, open result)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   ingrid-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │   Identity    │    │ ResultCache  │  │   │
//! │  │   │   (kv.rs)     │    │ (identity.rs) │    │ (result_     │  │   │
//! │  │   │               │◄───│               │    │  cache.rs)   │  │   │
//! │  │   │ FileStore     │    │ session_xxxx  │    │ scan_result  │  │   │
//! │  │   │ MemoryStore   │◄───┼───────────────┼────│ (one slot)   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  ~/.local/share/ingrid-scanner/{ingrid_session_id,scan_result} │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`kv`] - Key/value store trait, file and memory backends
//! - [`identity`] - Session identity provider
//! - [`result_cache`] - Single most-recent result slot
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ingrid_store::{open_store, IdentityProvider, ResultCache, StoreConfig};
//!
//! let store = open_store(&StoreConfig::default());
//! let identity = IdentityProvider::new(store.clone());
//! let session = identity.get_or_create();
//!
//! let cache = ResultCache::new(store);
//! if let Some(result) = cache.load() {
//!     println!("{} ({})", result.product.name, result.product.rating);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod identity;
pub mod kv;
pub mod result_cache;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use identity::{IdentityProvider, SESSION_ID_KEY};
pub use kv::{default_data_dir, open_store, FileStore, KeyValueStore, MemoryStore, StoreConfig};
pub use result_cache::{ResultCache, SCAN_RESULT_KEY};

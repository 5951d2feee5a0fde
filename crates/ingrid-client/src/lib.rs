//! # ingrid-client: Scan Backend Client for the Ingrid Scanner
//!
//! Everything that talks to the scan backend, plus the client's
//! configuration.
//!
//! ## Module Organization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ingrid-client Modules                             │
//! │                                                                         │
//! │  config.rs       - TOML + env configuration (ClientConfig)             │
//! │  error.rs        - ClientError, FailureKind                            │
//! │  protocol.rs     - Wire DTOs, product normalization, error bodies      │
//! │  backend.rs      - ScanBackend trait, HttpBackend (reqwest)            │
//! │  resolution.rs   - ResolutionClient (submit barcode / photo)           │
//! │  result_store.rs - ResultStore (current result, bookmark toggle)       │
//! │  lists.rs        - ListLoader (history, favorites, with backoff)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ingrid_client::{ClientConfig, HttpBackend, ResolutionClient};
//!
//! let config = ClientConfig::load_or_default(None);
//! let backend = Arc::new(HttpBackend::new(&config.api)?);
//! let resolver = ResolutionClient::new(backend);
//!
//! let result = resolver.submit_barcode(&barcode, &session).await?;
//! println!("{} is {}", result.product.name, result.product.rating.label());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod lists;
pub mod protocol;
pub mod resolution;
pub mod result_store;

pub use backend::{HttpBackend, ScanBackend};
pub use config::{ApiSettings, CaptureSettings, ClientConfig, StorageSettings};
pub use error::{ClientError, ClientResult, FailureKind};
pub use lists::{ListLoader, RetryPolicy};
pub use protocol::BookmarkToggle;
pub use resolution::{
    fallback_message, ResolutionClient, BARCODE_FAILURE_MESSAGE, PHOTO_FAILURE_MESSAGE,
};
pub use result_store::ResultStore;

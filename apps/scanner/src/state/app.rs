//! # Application State
//!
//! Everything a command needs, wired from the configuration.
//!
//! ```text
//! ClientConfig ──► open_store(storage) ──► IdentityProvider ──► SessionId
//!      │                  │
//!      │                  └──► ResultCache ──► ResultStore ─┐
//!      │                                                    │
//!      ├──► HttpBackend ──► ResolutionClient ───────────────┤
//!      │                └─► ListLoader (RetryPolicy) ───────┤
//!      │                                                    ▼
//!      └──► CaptureSettings ────────────────────► WorkflowController
//! ```

use std::sync::Arc;

use ingrid_capture::CaptureDevices;
use ingrid_client::{
    ClientConfig, HttpBackend, ListLoader, ResolutionClient, ResultStore, RetryPolicy,
    ScanBackend,
};
use ingrid_store::{open_store, IdentityProvider, ResultCache};
use tracing::info;

use crate::error::ApiResult;
use crate::state::WorkflowController;

pub struct AppState {
    pub config: ClientConfig,
    pub workflow: WorkflowController,
}

impl AppState {
    /// Wires the app against the HTTP backend named in `config`.
    pub fn connect(config: ClientConfig, devices: CaptureDevices) -> ApiResult<Self> {
        let backend = Arc::new(HttpBackend::new(&config.api)?);
        info!(base_url = %backend.base_url(), "Using scan backend");
        Ok(Self::with_backend(config, devices, backend))
    }

    /// Wires the app against any backend.
    pub fn with_backend(
        config: ClientConfig,
        devices: CaptureDevices,
        backend: Arc<dyn ScanBackend>,
    ) -> Self {
        let store = open_store(&config.store_config());
        let identity = IdentityProvider::new(store.clone()).get_or_create();

        let results = ResultStore::new(ResultCache::new(store), backend.clone());
        let lists = ListLoader::new(backend.clone(), RetryPolicy::from_settings(&config.api));
        let resolver = ResolutionClient::new(backend);

        let workflow = WorkflowController::new(
            identity,
            devices,
            config.capture.clone(),
            resolver,
            results,
            lists,
        );

        AppState { config, workflow }
    }
}

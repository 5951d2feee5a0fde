//! # List Loaders
//!
//! History and favorites for the current identity.
//!
//! Both lists are read-only and idempotent, so transient failures are
//! retried with exponential backoff. When the retry budget is spent the
//! failure is logged and the list reads as empty.

use std::sync::Arc;
use std::time::Duration;

use backoff::{future::retry_notify, ExponentialBackoff};
use ingrid_core::{FavoriteEntry, HistoryEntry, ScanResult, SessionId};
use tracing::{debug, error, warn};

use crate::backend::ScanBackend;
use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};

/// Retry budget for list loads.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &ApiSettings) -> Self {
        RetryPolicy {
            max_retries: settings.list_max_retries,
            initial_interval: Duration::from_millis(settings.initial_backoff_ms),
            max_interval: Duration::from_secs(settings.max_backoff_secs),
        }
    }

    /// No retries.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(1),
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.max_interval.max(self.initial_interval),
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum ListKind {
    History,
    Favorites,
}

impl ListKind {
    fn as_str(self) -> &'static str {
        match self {
            ListKind::History => "history",
            ListKind::Favorites => "favorites",
        }
    }
}

pub struct ListLoader {
    backend: Arc<dyn ScanBackend>,
    policy: RetryPolicy,
}

impl ListLoader {
    pub fn new(backend: Arc<dyn ScanBackend>, policy: RetryPolicy) -> Self {
        ListLoader { backend, policy }
    }

    /// Scan history; empty if it cannot be loaded.
    pub async fn load_history(&self, session: &SessionId) -> Vec<HistoryEntry> {
        self.load_or_empty(ListKind::History, session).await
    }

    /// Bookmarked products; empty if they cannot be loaded.
    pub async fn load_favorites(&self, session: &SessionId) -> Vec<FavoriteEntry> {
        self.load_or_empty(ListKind::Favorites, session).await
    }

    /// Scan history, reporting the final failure.
    pub async fn fetch_history(&self, session: &SessionId) -> ClientResult<Vec<HistoryEntry>> {
        self.fetch(ListKind::History, session).await
    }

    /// Bookmarked products, reporting the final failure.
    pub async fn fetch_favorites(&self, session: &SessionId) -> ClientResult<Vec<FavoriteEntry>> {
        self.fetch(ListKind::Favorites, session).await
    }

    async fn load_or_empty(&self, kind: ListKind, session: &SessionId) -> Vec<ScanResult> {
        match self.fetch(kind, session).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(list = kind.as_str(), error = %e, "Failed to load list");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, kind: ListKind, session: &SessionId) -> ClientResult<Vec<ScanResult>> {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        let entries = retry_notify(
            self.policy.backoff(),
            || {
                attempt += 1;
                let current = attempt;
                async move {
                    let result = match kind {
                        ListKind::History => self.backend.history(session).await,
                        ListKind::Favorites => self.backend.bookmarks(session).await,
                    };
                    result.map_err(|e| {
                        if e.is_retryable() && current <= max_retries {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |err: ClientError, duration: Duration| {
                warn!(
                    list = kind.as_str(),
                    error = %err,
                    retry_after_ms = duration.as_millis() as u64,
                    "Retry scheduled"
                );
            },
        )
        .await?;

        debug!(list = kind.as_str(), count = entries.len(), "List loaded");
        Ok(entries.into_iter().map(ScanResult::normalized).collect())
    }
}

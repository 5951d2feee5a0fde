//! # Scan Backend
//!
//! The [`ScanBackend`] trait and its HTTP implementation.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HttpBackend::execute(op, request)                                      │
//! │       │                                                                 │
//! │       ├── tokio::time::timeout(request_timeout) ──► Timeout(secs)      │
//! │       │                                                                 │
//! │       ├── send()        connect/IO error ─────────► Network            │
//! │       ├── status != 2xx ──► read body, parse detail ► Rejected         │
//! │       └── json::<T>()   bad body ─────────────────► InvalidResponse    │
//! │                                                                         │
//! │  No retries here. Callers that may retry (list loads) decide using     │
//! │  ClientError::is_retryable().                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ingrid_core::validation::validate_identifier;
use ingrid_core::{Barcode, FavoriteEntry, HistoryEntry, ImageBlob, ScanResult, SessionId};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{
    parse_error_detail, BarcodeScanRequest, BookmarkToggle, WireScanResult, OCR_IMAGE_FIELD,
    OCR_SESSION_FIELD,
};

// =============================================================================
// Trait
// =============================================================================

/// Operations offered by the scan backend.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Looks up a product by barcode and records it in the identity's history.
    async fn scan_barcode(&self, barcode: &Barcode, session: &SessionId) -> ClientResult<ScanResult>;

    /// Reads an ingredient label photo and records it in the identity's history.
    async fn scan_photo(&self, image: &ImageBlob, session: &SessionId) -> ClientResult<ScanResult>;

    /// Flips the bookmark of `product_id` and returns the new state.
    async fn toggle_bookmark(
        &self,
        session: &SessionId,
        product_id: &str,
    ) -> ClientResult<BookmarkToggle>;

    /// The identity's scan history, most recent first.
    async fn history(&self, session: &SessionId) -> ClientResult<Vec<HistoryEntry>>;

    /// The identity's bookmarked products.
    async fn bookmarks(&self, session: &SessionId) -> ClientResult<Vec<FavoriteEntry>>;
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// [`ScanBackend`] over HTTP/JSON.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpBackend {
    /// Creates a backend client from API settings.
    pub fn new(settings: &ApiSettings) -> ClientResult<Self> {
        let base_url = settings.parsed_base_url()?;
        let timeout = settings.request_timeout();

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ingrid-scanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        Ok(HttpBackend {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the API root, percent-encoding each.
    pub fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let start = Instant::now();
        let secs = self.timeout.as_secs();

        let outcome = tokio::time::timeout(self.timeout, async {
            let response = request
                .send()
                .await
                .map_err(|e| classify_transport_error(e, secs))?;

            let status = response.status();
            debug!(operation, status = %status, "Received HTTP response");

            if !status.is_success() {
                let body = response.bytes().await.unwrap_or_default();
                return Err(ClientError::Rejected {
                    status: status.as_u16(),
                    detail: parse_error_detail(&body),
                });
            }

            response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(secs)
                } else {
                    ClientError::InvalidResponse(e.to_string())
                }
            })
        })
        .await
        .unwrap_or_else(|_| Err(ClientError::Timeout(secs)));

        let latency_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => debug!(operation, latency_ms, "Request completed"),
            Err(e) => warn!(operation, latency_ms, error = %e, "Request failed"),
        }
        outcome
    }
}

fn classify_transport_error(err: reqwest::Error, timeout_secs: u64) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(timeout_secs)
    } else {
        ClientError::Network(err.to_string())
    }
}

#[async_trait]
impl ScanBackend for HttpBackend {
    async fn scan_barcode(&self, barcode: &Barcode, session: &SessionId) -> ClientResult<ScanResult> {
        let url = self.endpoint(&["scan", "barcode"])?;
        let body = BarcodeScanRequest {
            barcode: barcode.as_str(),
            session_id: session.as_str(),
        };
        let wire: WireScanResult = self
            .execute("scan_barcode", self.client.post(url).json(&body))
            .await?;
        Ok(wire.into_result())
    }

    async fn scan_photo(&self, image: &ImageBlob, session: &SessionId) -> ClientResult<ScanResult> {
        let url = self.endpoint(&["scan", "ocr"])?;
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())
            .map_err(|e| {
                ClientError::Validation(ingrid_core::ValidationError::InvalidFormat {
                    field: "image".into(),
                    reason: e.to_string(),
                })
            })?;
        let form = Form::new()
            .part(OCR_IMAGE_FIELD, part)
            .text(OCR_SESSION_FIELD, session.as_str().to_string());

        let wire: WireScanResult = self
            .execute("scan_photo", self.client.post(url).multipart(form))
            .await?;
        Ok(wire.into_result())
    }

    async fn toggle_bookmark(
        &self,
        session: &SessionId,
        product_id: &str,
    ) -> ClientResult<BookmarkToggle> {
        validate_identifier("product_id", product_id)?;
        let mut url = self.endpoint(&["bookmarks", "toggle"])?;
        url.query_pairs_mut()
            .append_pair("session_id", session.as_str())
            .append_pair("product_id", product_id);

        self.execute("toggle_bookmark", self.client.post(url)).await
    }

    async fn history(&self, session: &SessionId) -> ClientResult<Vec<HistoryEntry>> {
        let url = self.endpoint(&["history", session.as_str()])?;
        let wire: Vec<WireScanResult> = self.execute("history", self.client.get(url)).await?;
        Ok(wire.into_iter().map(WireScanResult::into_result).collect())
    }

    async fn bookmarks(&self, session: &SessionId) -> ClientResult<Vec<FavoriteEntry>> {
        let url = self.endpoint(&["bookmarks", session.as_str()])?;
        let wire: Vec<WireScanResult> = self.execute("bookmarks", self.client.get(url)).await?;
        Ok(wire.into_iter().map(WireScanResult::into_result).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(&ApiSettings {
            base_url: base.into(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_api_root() {
        let b = backend("http://localhost:8001/api");
        assert_eq!(
            b.endpoint(&["scan", "barcode"]).unwrap().as_str(),
            "http://localhost:8001/api/scan/barcode"
        );

        let b = backend("http://localhost:8001/api/");
        assert_eq!(
            b.endpoint(&["history", "session_abc123xyz"]).unwrap().as_str(),
            "http://localhost:8001/api/history/session_abc123xyz"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let b = backend("https://scan.example.com");
        assert_eq!(
            b.endpoint(&["history", "a/b c"]).unwrap().as_str(),
            "https://scan.example.com/history/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        let settings = ApiSettings {
            base_url: "ftp://example.com".into(),
            ..ApiSettings::default()
        };
        assert!(matches!(
            HttpBackend::new(&settings),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}

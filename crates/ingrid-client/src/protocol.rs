//! # Wire Protocol
//!
//! JSON shapes exchanged with the scan backend, and their conversion into
//! domain types.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /scan/barcode          {barcode, session_id}     → ScanResult     │
//! │  POST /scan/ocr              multipart image+session   → ScanResult     │
//! │  POST /bookmarks/toggle      ?session_id&product_id    → {bookmarked}   │
//! │  GET  /history/{session_id}                            → [ScanResult]   │
//! │  GET  /bookmarks/{session_id}                          → [ScanResult]   │
//! │                                                                         │
//! │  Errors: {"detail": "..."}  or  {"detail": [{"msg": "..."}, ...]}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every product read from the wire passes through [`WireProduct::into_record`],
//! which fills gaps and enforces the rating rule.

use chrono::{DateTime, NaiveDateTime, Utc};
use ingrid_core::{ProductRecord, Rating, ScanResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /scan/barcode`.
#[derive(Debug, Serialize)]
pub struct BarcodeScanRequest<'a> {
    pub barcode: &'a str,
    pub session_id: &'a str,
}

/// Multipart field names of `POST /scan/ocr`.
pub const OCR_IMAGE_FIELD: &str = "image";
pub const OCR_SESSION_FIELD: &str = "session_id";

// =============================================================================
// Responses
// =============================================================================

/// A product as the backend sends it. Count and rating may be missing or
/// disagree with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireProduct {
    pub id: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub ingredient_count: Option<u32>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl WireProduct {
    /// Converts to a [`ProductRecord`] whose rating matches its count.
    pub fn into_record(self) -> ProductRecord {
        let ingredient_count = self
            .ingredient_count
            .unwrap_or_else(|| u32::try_from(self.ingredients.len()).unwrap_or(u32::MAX));
        let derived = Rating::from_ingredient_count(ingredient_count);

        if let Some(raw) = self.rating.as_deref() {
            match raw.parse::<Rating>() {
                Ok(reported) if reported != derived => warn!(
                    product_id = %self.id,
                    ingredient_count,
                    reported = %reported,
                    derived = %derived,
                    "Backend rating disagrees with ingredient count, using derived rating"
                ),
                Ok(_) => {}
                Err(_) => warn!(
                    product_id = %self.id,
                    reported = %raw,
                    "Unknown rating from backend, using derived rating"
                ),
            }
        }

        let created_at = self.created_at.as_deref().and_then(parse_timestamp);

        ProductRecord {
            id: self.id,
            barcode: self.barcode,
            name: self.name,
            brand: self.brand,
            rating: derived,
            ingredient_count,
            ingredients: self.ingredients,
            certifications: self.certifications,
            image_url: self.image_url,
            created_at,
        }
        .normalized()
    }
}

/// A scan result as the backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireScanResult {
    pub product: WireProduct,
    #[serde(default)]
    pub is_bookmarked: bool,
}

impl WireScanResult {
    pub fn into_result(self) -> ScanResult {
        ScanResult::new(self.product.into_record(), self.is_bookmarked)
    }
}

/// Response of `POST /bookmarks/toggle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkToggle {
    pub bookmarked: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Error body, e.g. `{"detail": "Product not found"}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

/// `detail` is a plain string for handled errors and a list of items for
/// request validation errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Items(Vec<ErrorItem>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorDetail {
    /// The first human-readable message, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ErrorDetail::Message(m) if !m.trim().is_empty() => Some(m.clone()),
            ErrorDetail::Items(items) => items.iter().find_map(|i| i.msg.clone()),
            _ => None,
        }
    }
}

/// Extracts `detail` from an error response body, if there is one.
pub fn parse_error_detail(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.message())
}

/// Accepts RFC 3339 and zone-less ISO 8601 timestamps (taken as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .ok()
}

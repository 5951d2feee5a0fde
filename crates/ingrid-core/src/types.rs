//! # Domain Types
//!
//! Core domain types used throughout the Ingrid scanner.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CaptureArtifact │   │  ProductRecord  │   │   ScanResult    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Photo(blob)    │──►│  id, name       │──►│  product        │       │
//! │  │  Barcode(code)  │   │  rating         │   │  is_bookmarked  │       │
//! │  └─────────────────┘   │  ingredients    │   └─────────────────┘       │
//! │          ▲             └─────────────────┘            │                 │
//! │          │                                            ▼                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    ScanMode     │   │    SessionId    │   │ History/Favorite│       │
//! │  │  camera|barcode │   │  session_xxxxx  │   │     Entry       │       │
//! │  │  manual|photo   │   │  (per profile)  │   │  (same shape)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::rating::Rating;
use crate::validation::{
    extension_for_mime_type, validate_barcode, validate_identifier, validate_image,
    ValidationResult,
};
use crate::{SESSION_ID_PREFIX, SESSION_TOKEN_LEN};

// =============================================================================
// Session Identity
// =============================================================================

/// Anonymous per-profile identity scoping history and favorites.
///
/// Opaque to the client: any non-blank value read back from storage is used
/// as-is. Newly generated values look like `session_k3j9x0a2b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an existing identifier.
    pub fn new(value: impl Into<String>) -> ValidationResult<Self> {
        let value = value.into();
        validate_identifier("session_id", &value)?;
        Ok(SessionId(value))
    }

    /// Generates a fresh identifier: namespace prefix plus a random
    /// lowercase alphanumeric token.
    pub fn generate() -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        SessionId(format!("{}{}", SESSION_ID_PREFIX, &token[..SESSION_TOKEN_LEN]))
    }

    /// Returns true if `value` has the shape produced by [`SessionId::generate`].
    pub fn is_generated_format(value: &str) -> bool {
        value
            .strip_prefix(SESSION_ID_PREFIX)
            .map(|token| {
                token.len() == SESSION_TOKEN_LEN
                    && token
                        .chars()
                        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
            })
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Barcode
// =============================================================================

/// A validated barcode: 8 to 14 ASCII digits, no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    /// Parses and validates user or decoder input.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        validate_barcode(raw).map(Barcode)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Barcode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Barcode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Barcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Barcode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Barcode::parse(s)
    }
}

// =============================================================================
// Image Blob
// =============================================================================

/// An in-memory image ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: String,
}

impl ImageBlob {
    /// Creates a validated image blob.
    pub fn new(
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> ValidationResult<Self> {
        let mime_type = mime_type.into();
        validate_image(bytes.len(), &mime_type)?;
        Ok(ImageBlob {
            bytes,
            mime_type,
            file_name: file_name.into(),
        })
    }

    /// Wraps a still frame grabbed from the camera. The file name's
    /// extension follows the mime type (`captured_image.png` for PNG,
    /// `captured_image.jpg` when the type has no known extension).
    pub fn captured_frame(bytes: Vec<u8>, mime_type: impl Into<String>) -> ValidationResult<Self> {
        let mime_type = mime_type.into();
        let ext = extension_for_mime_type(&mime_type).unwrap_or("jpg");
        Self::new(bytes, mime_type, format!("captured_image.{ext}"))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

// =============================================================================
// Capture Artifact
// =============================================================================

/// The single unit of captured input handed to the resolution client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureArtifact {
    /// A label photo (camera still or uploaded file).
    Photo(ImageBlob),
    /// A barcode (decoded from video or typed).
    Barcode(Barcode),
}

/// Which variant of [`CaptureArtifact`] a mode produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Photo,
    Barcode,
}

impl CaptureArtifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            CaptureArtifact::Photo(_) => ArtifactKind::Photo,
            CaptureArtifact::Barcode(_) => ArtifactKind::Barcode,
        }
    }
}

// =============================================================================
// Scan Mode
// =============================================================================

/// The capture mode currently selected by the user.
///
/// ## Mode Behavior
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CAMERA   live preview → still frame → confirm/retake → Photo          │
/// │  BARCODE  live video → decode every frame → first hit → Barcode        │
/// │  MANUAL   typed 8-14 digits → Barcode (no device)                      │
/// │  PHOTO    pick an existing image → preview → analyze → Photo           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Photograph the ingredient label with the device camera.
    Camera,
    /// Scan the barcode from live video.
    #[default]
    Barcode,
    /// Type the barcode digits.
    Manual,
    /// Upload an existing photo of the label.
    Photo,
}

impl ScanMode {
    /// All modes, in the order they are offered.
    pub const ALL: [ScanMode; 4] = [
        ScanMode::Camera,
        ScanMode::Barcode,
        ScanMode::Manual,
        ScanMode::Photo,
    ];

    /// Returns true if the mode holds the camera while active.
    pub fn uses_camera(&self) -> bool {
        matches!(self, ScanMode::Camera | ScanMode::Barcode)
    }

    /// The artifact variant this mode yields.
    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            ScanMode::Camera | ScanMode::Photo => ArtifactKind::Photo,
            ScanMode::Barcode | ScanMode::Manual => ArtifactKind::Barcode,
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Camera => write!(f, "camera"),
            ScanMode::Barcode => write!(f, "barcode"),
            ScanMode::Manual => write!(f, "manual"),
            ScanMode::Photo => write!(f, "photo"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "camera" => Ok(ScanMode::Camera),
            "barcode" | "scan" => Ok(ScanMode::Barcode),
            "manual" => Ok(ScanMode::Manual),
            "photo" | "upload" => Ok(ScanMode::Photo),
            _ => Err(ValidationError::NotAllowed {
                field: "scan mode".to_string(),
                allowed: ScanMode::ALL.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// A rated product as resolved by the backend.
///
/// ## Invariant
/// `rating == Rating::from_ingredient_count(ingredient_count)`. Records built
/// with [`ProductRecord::new`] or passed through [`ProductRecord::normalized`]
/// always satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Backend identifier (UUID string).
    pub id: String,

    /// Barcode the product was resolved from (absent for label photos).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    /// Display name.
    pub name: String,

    /// Brand, when the lookup found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Cleanliness rating derived from `ingredient_count`.
    pub rating: Rating,

    /// Number of ingredients (including sub-ingredients).
    pub ingredient_count: u32,

    /// Ingredients in label order.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Certifications such as "Organic" or "Non-GMO", without duplicates.
    #[serde(default)]
    pub certifications: Vec<String>,

    /// Product image, when the lookup found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// When the backend first recorded the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    /// Builds a record whose count and rating come from the ingredient list.
    pub fn new(id: impl Into<String>, name: impl Into<String>, ingredients: Vec<String>) -> Self {
        let ingredient_count = u32::try_from(ingredients.len()).unwrap_or(u32::MAX);
        ProductRecord {
            id: id.into(),
            barcode: None,
            name: name.into(),
            brand: None,
            rating: Rating::from_ingredient_count(ingredient_count),
            ingredient_count,
            ingredients,
            certifications: Vec::new(),
            image_url: None,
            created_at: None,
        }
    }

    /// The rating implied by the ingredient count.
    pub fn expected_rating(&self) -> Rating {
        Rating::from_ingredient_count(self.ingredient_count)
    }

    /// Returns true if the stored rating agrees with the ingredient count.
    pub fn rating_is_consistent(&self) -> bool {
        self.rating == self.expected_rating()
    }

    /// Strict check of the rating invariant.
    pub fn check_rating(&self) -> CoreResult<()> {
        if self.rating_is_consistent() {
            Ok(())
        } else {
            Err(CoreError::RatingMismatch {
                product_id: self.id.clone(),
                ingredient_count: self.ingredient_count,
                expected: self.expected_rating().to_string(),
                actual: self.rating.to_string(),
            })
        }
    }

    /// Re-derives the rating and removes duplicate certifications.
    pub fn normalized(mut self) -> Self {
        self.rating = self.expected_rating();

        let mut seen = std::collections::HashSet::new();
        self.certifications
            .retain(|cert| seen.insert(cert.trim().to_lowercase()));

        self
    }

    /// Returns true if the product carries the named certification
    /// (case-insensitive).
    pub fn has_certification(&self, name: &str) -> bool {
        self.certifications
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// Scan Result
// =============================================================================

/// A resolved product together with the identity's bookmark state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub product: ProductRecord,

    #[serde(default)]
    pub is_bookmarked: bool,
}

impl ScanResult {
    pub fn new(product: ProductRecord, is_bookmarked: bool) -> Self {
        ScanResult {
            product,
            is_bookmarked,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Normalizes the contained product.
    pub fn normalized(self) -> Self {
        ScanResult {
            product: self.product.normalized(),
            is_bookmarked: self.is_bookmarked,
        }
    }
}

/// One entry of the scan history list (same shape as a scan result).
pub type HistoryEntry = ScanResult;

/// One entry of the favorites list (same shape as a scan result).
pub type FavoriteEntry = ScanResult;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_session_id_format() {
        let id = SessionId::generate();
        assert!(id.as_str().starts_with("session_"));
        assert_eq!(id.as_str().len(), "session_".len() + SESSION_TOKEN_LEN);
        assert!(SessionId::is_generated_format(id.as_str()));
    }

    #[test]
    fn test_generated_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_session_id_format_check() {
        assert!(SessionId::is_generated_format("session_abc123xyz"));
        assert!(!SessionId::is_generated_format("session_ABC123XYZ"));
        assert!(!SessionId::is_generated_format("session_abc"));
        assert!(!SessionId::is_generated_format("abc123xyz"));
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("test_session_1a2b3c4d").is_ok());
    }

    #[test]
    fn test_barcode_parse_and_deserialize() {
        let code: Barcode = "3017620422003".parse().unwrap();
        assert_eq!(code.to_string(), "3017620422003");

        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"3017620422003\"");

        let back: Barcode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<Barcode>("\"12\"").is_err());
    }

    #[test]
    fn test_image_blob_validation() {
        assert!(ImageBlob::new(vec![0xFF, 0xD8], "image/jpeg", "a.jpg").is_ok());
        assert!(ImageBlob::new(Vec::new(), "image/jpeg", "a.jpg").is_err());
        assert!(ImageBlob::new(vec![1], "text/plain", "a.txt").is_err());

        let blob = ImageBlob::captured_frame(vec![1, 2, 3], "image/jpeg").unwrap();
        assert_eq!(blob.file_name(), "captured_image.jpg");
        assert!(format!("{:?}", blob).contains("len: 3"));

        let png = ImageBlob::captured_frame(vec![0x89, b'P', b'N', b'G'], "image/png").unwrap();
        assert_eq!(png.file_name(), "captured_image.png");
        assert_eq!(png.mime_type(), "image/png");

        let raw = ImageBlob::captured_frame(vec![1], "image/x-raw").unwrap();
        assert_eq!(raw.file_name(), "captured_image.jpg");
    }

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!("camera".parse::<ScanMode>().unwrap(), ScanMode::Camera);
        assert_eq!("scan".parse::<ScanMode>().unwrap(), ScanMode::Barcode);
        assert_eq!("Manual".parse::<ScanMode>().unwrap(), ScanMode::Manual);
        assert_eq!("upload".parse::<ScanMode>().unwrap(), ScanMode::Photo);
        assert!("video".parse::<ScanMode>().is_err());
    }

    #[test]
    fn test_scan_mode_properties() {
        assert!(ScanMode::Camera.uses_camera());
        assert!(ScanMode::Barcode.uses_camera());
        assert!(!ScanMode::Manual.uses_camera());
        assert!(!ScanMode::Photo.uses_camera());
        assert_eq!(ScanMode::Manual.artifact_kind(), ArtifactKind::Barcode);
        assert_eq!(ScanMode::Camera.artifact_kind(), ArtifactKind::Photo);
        assert_eq!(ScanMode::default(), ScanMode::Barcode);
    }

    #[test]
    fn test_product_new_derives_rating() {
        let product = ProductRecord::new("p1", "Test", vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(product.ingredient_count, 3);
        assert_eq!(product.rating, Rating::Green);
        assert!(product.check_rating().is_ok());
    }

    #[test]
    fn test_normalized_fixes_rating_and_certifications() {
        let mut product = ProductRecord::new("p2", "Cereal", Vec::new());
        product.ingredient_count = 12;
        product.rating = Rating::Green;
        product.certifications = vec!["Organic".into(), "organic".into(), "Non-GMO".into()];

        assert!(product.check_rating().is_err());

        let product = product.normalized();
        assert_eq!(product.rating, Rating::Red);
        assert_eq!(product.certifications, vec!["Organic", "Non-GMO"]);
        assert!(product.has_certification("non-gmo"));
    }

    #[test]
    fn test_scan_result_json_shape() {
        let result = ScanResult::new(ProductRecord::new("p1", "Test", vec!["a".into()]), true);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["is_bookmarked"], true);
        assert_eq!(json["product"]["ingredient_count"], 1);
        assert_eq!(json["product"]["rating"], "green");
        assert!(json["product"].get("brand").is_none());
    }
}

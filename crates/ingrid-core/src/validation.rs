//! # Validation Module
//!
//! Input validation utilities for the Ingrid scanner.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Capture session (ingrid-capture)                             │
//! │  ├── Manual entry: empty input never becomes an artifact               │
//! │  └── Barcode decoder: non-barcode symbols are skipped                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Barcode digit/length rules                                        │
//! │  ├── Image size and mime type                                          │
//! │  └── Identifiers placed in URLs                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Product lookup, OCR                                               │
//! │                                                                         │
//! │  A ValidationError never reaches the network.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ingrid_core::validation::validate_barcode;
//!
//! assert_eq!(validate_barcode(" 3017620422003\n").unwrap(), "3017620422003");
//! assert!(validate_barcode("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_BARCODE_DIGITS, MAX_IMAGE_BYTES, MIN_BARCODE_DIGITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Barcode
// =============================================================================

/// Validates a barcode and returns its trimmed form.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must not be empty
/// - ASCII digits only
/// - 8 to 14 digits (EAN-8, UPC-A, EAN-13, GTIN-14)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Manual entry: "  3017620422003 "                                       │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_barcode() ← THIS FUNCTION                                    │
/// │       │                                                                 │
/// │       ├── blank?          → Error: "barcode is required"               │
/// │       ├── non-digit?      → Error: "must contain only digits"          │
/// │       ├── length ∉ 8..=14 → Error: "between 8 and 14 characters"       │
/// │       │                                                                 │
/// │       └── OK("3017620422003") → artifact, then POST /scan/barcode      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_barcode(raw: &str) -> ValidationResult<String> {
    let value = raw.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    if !(MIN_BARCODE_DIGITS..=MAX_BARCODE_DIGITS).contains(&value.len()) {
        return Err(ValidationError::LengthOutOfRange {
            field: "barcode".to_string(),
            min: MIN_BARCODE_DIGITS,
            max: MAX_BARCODE_DIGITS,
        });
    }

    Ok(value.to_string())
}

/// Cheap check used by decoders to skip frames that hold non-barcode symbols.
pub fn is_barcode(raw: &str) -> bool {
    validate_barcode(raw).is_ok()
}

// =============================================================================
// Images
// =============================================================================

/// Validates an image before it is uploaded for label analysis.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed [`MAX_IMAGE_BYTES`]
/// - Mime type must be `image/*`
pub fn validate_image(len: usize, mime_type: &str) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::Required {
            field: "image".to_string(),
        });
    }

    if len > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLong {
            field: "image".to_string(),
            max: MAX_IMAGE_BYTES,
        });
    }

    if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::InvalidFormat {
            field: "image".to_string(),
            reason: format!("unsupported content type '{}'", mime_type),
        });
    }

    Ok(())
}

/// Guesses an image mime type from a file extension.
///
/// Returns `None` for extensions that are not images.
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// File extension for an image mime type, ignoring parameters
/// (`image/png; q=1` → `png`).
///
/// Returns `None` for mime types [`mime_type_for_extension`] does not know.
pub fn extension_for_mime_type(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next().unwrap_or_default();
    match essence.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates an identifier that is sent as a URL path segment or query value.
///
/// ## Rules
/// - Must not be empty
/// - Must not contain whitespace or control characters
/// - At most 128 bytes
pub fn validate_identifier(field: &str, id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 128 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 128,
        });
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

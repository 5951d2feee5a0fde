//! # Error Types
//!
//! Domain-specific error types for ingrid-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ingrid-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ingrid-store    └── StoreError    - Local persistence failures        │
//! │  ingrid-capture  └── CaptureError  - Device / session failures         │
//! │  ingrid-client   └── ClientError   - Backend request failures          │
//! │                                                                         │
//! │  apps/scanner    └── ApiError      - What the user sees                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → {Capture,Client}Error → ApiError  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product's rating disagrees with its ingredient count.
    ///
    /// ## When This Occurs
    /// - A record was built by hand with a stale rating
    /// - A backend returned a rating computed with different thresholds
    ///
    /// Callers that receive data from the backend normalize it instead of
    /// failing; this variant is for strict checks.
    #[error("Product {product_id} is rated {actual} but {ingredient_count} ingredients rate {expected}")]
    RatingMismatch {
        product_id: String,
        ingredient_count: u32,
        expected: String,
        actual: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// They are raised before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} bytes")]
    TooLong { field: String, max: usize },

    /// Length is outside the accepted range.
    #[error("{field} must be between {min} and {max} characters")]
    LengthOutOfRange {
        field: String,
        min: usize,
        max: usize,
    },

    /// Invalid format (e.g., non-digit barcode, unknown mime type).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RatingMismatch {
            product_id: "p1".to_string(),
            ingredient_count: 3,
            expected: "green".to_string(),
            actual: "red".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Product p1 is rated red but 3 ingredients rate green"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::LengthOutOfRange {
            field: "barcode".to_string(),
            min: 8,
            max: 14,
        };
        assert_eq!(err.to_string(), "barcode must be between 8 and 14 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

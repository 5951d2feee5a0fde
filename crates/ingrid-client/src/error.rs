//! # Client Error Types
//!
//! Error types for backend requests and client configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Network        │  │  Rejected {status,      │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │            detail}      │ │
//! │  │  ConfigLoad/Save│  │                 │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │     Input       │  Validation never reaches the network.            │
//! │  │  Validation     │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ingrid_core::ValidationError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all backend and configuration failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Request input rejected locally.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend answered with a non-success status.
    #[error("Backend returned {status}{}", detail_suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },

    /// The backend answered with a body we could not read.
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Coarse failure category, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Validation,
    Network,
    Timeout,
    Rejected,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

/// HTTP statuses worth retrying for idempotent reads.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::InvalidConfig(_)
            | ClientError::InvalidUrl(_)
            | ClientError::ConfigLoadFailed(_)
            | ClientError::ConfigSaveFailed(_) => FailureKind::Config,
            ClientError::Validation(_) => FailureKind::Validation,
            ClientError::Network(_) => FailureKind::Network,
            ClientError::Timeout(_) => FailureKind::Timeout,
            ClientError::Rejected { .. } | ClientError::InvalidResponse(_) => FailureKind::Rejected,
        }
    }

    /// Returns true if repeating the same idempotent request may succeed.
    ///
    /// ## Retryable Errors
    /// - Connection failures
    /// - Timeouts
    /// - 429, 502, 503, 504
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => true,
            ClientError::Rejected { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        self.kind() == FailureKind::Config
    }

    /// The message to show the user: the backend's own explanation when it
    /// gave one, the validation message for local rejections, otherwise
    /// `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ClientError::Validation(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Network("refused".into()).is_retryable());
        assert!(ClientError::Timeout(30).is_retryable());
        assert!(ClientError::Rejected { status: 503, detail: None }.is_retryable());

        assert!(!ClientError::Rejected { status: 404, detail: None }.is_retryable());
        assert!(!ClientError::Rejected { status: 500, detail: None }.is_retryable());
        assert!(!ClientError::InvalidConfig("bad".into()).is_retryable());
    }

    #[test]
    fn test_user_message_prefers_backend_detail() {
        let fallback = "Failed to scan barcode. Please try again.";

        let err = ClientError::Rejected {
            status: 404,
            detail: Some("Product not found".into()),
        };
        assert_eq!(err.user_message(fallback), "Product not found");

        let err = ClientError::Rejected { status: 500, detail: None };
        assert_eq!(err.user_message(fallback), fallback);

        let err = ClientError::Network("connection refused".into());
        assert_eq!(err.user_message(fallback), fallback);
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Rejected {
            status: 404,
            detail: Some("Product not found".into()),
        };
        assert_eq!(err.to_string(), "Backend returned 404: Product not found");
        assert_eq!(
            ClientError::Rejected { status: 500, detail: None }.to_string(),
            "Backend returned 500"
        );
        assert_eq!(ClientError::Timeout(30).kind(), FailureKind::Timeout);
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
    }
}

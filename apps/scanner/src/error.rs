//! # API Error Type
//!
//! Unified error type for scanner commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Scanner                            │
//! │                                                                         │
//! │  Command Function  ──  Result<T, ApiError>                             │
//! │         │                                                               │
//! │         ├── CaptureError::DeviceUnavailable ──► DEVICE_UNAVAILABLE     │
//! │         ├── ValidationError ──────────────────► VALIDATION_ERROR       │
//! │         ├── ClientError (by FailureKind) ─────► NETWORK_FAILURE /      │
//! │         │                                       TIMEOUT /              │
//! │         │                                       BACKEND_REJECTED /     │
//! │         │                                       CONFIG_ERROR           │
//! │         ├── WorkflowError::Busy ──────────────► BUSY                   │
//! │         └── WorkflowError::ModeDisabled ──────► MODE_DISABLED          │
//! │                                                                         │
//! │  main.rs prints `message` and exits with `exit_code()`.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submission failures carry the backend's own explanation when it sent
//! one, otherwise the generic "Failed to scan ..." message.

use ingrid_capture::CaptureError;
use ingrid_client::{ClientError, FailureKind};
use ingrid_core::ValidationError;
use serde::Serialize;

use crate::exit_codes;
use crate::state::WorkflowError;

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "BACKEND_REJECTED",
///   "message": "Product not found"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No camera, permission denied, camera busy, or open timed out
    DeviceUnavailable,

    /// Input rejected before reaching the network
    ValidationError,

    /// Backend unreachable
    NetworkFailure,

    /// Backend answered with an error
    BackendRejected,

    /// Request or device wait exceeded its bound
    Timeout,

    /// A submission is still in flight
    Busy,

    /// Mode switched off in the configuration
    ModeDisabled,

    /// Operation not valid in the current mode or state
    InvalidState,

    /// A local file could not be read or written
    StorageError,

    /// Configuration could not be loaded, saved, or validated
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DeviceUnavailable => "DEVICE_UNAVAILABLE",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NetworkFailure => "NETWORK_FAILURE",
            ErrorCode::BackendRejected => "BACKEND_REJECTED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Busy => "BUSY",
            ErrorCode::ModeDisabled => "MODE_DISABLED",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    /// Process exit status for this code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::ModeDisabled
            | ErrorCode::InvalidState
            | ErrorCode::ConfigError => exit_codes::USAGE_ERROR,
            ErrorCode::DeviceUnavailable
            | ErrorCode::NetworkFailure
            | ErrorCode::BackendRejected
            | ErrorCode::Timeout => exit_codes::UNAVAILABLE,
            ErrorCode::Busy | ErrorCode::StorageError | ErrorCode::Internal => {
                exit_codes::INTERNAL_ERROR
            }
        }
    }
}

impl From<FailureKind> for ErrorCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Config => ErrorCode::ConfigError,
            FailureKind::Validation => ErrorCode::ValidationError,
            FailureKind::Network => ErrorCode::NetworkFailure,
            FailureKind::Timeout => ErrorCode::Timeout,
            FailureKind::Rejected => ErrorCode::BackendRejected,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidState, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::StorageError, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CaptureError> for ApiError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::DeviceUnavailable(_) => {
                ApiError::new(ErrorCode::DeviceUnavailable, err.to_string())
            }
            CaptureError::Validation(e) => e.into(),
            CaptureError::InvalidState { .. }
            | CaptureError::Unsupported { .. }
            | CaptureError::Cancelled => ApiError::invalid_state(err.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let code = ErrorCode::from(err.kind());
        if code == ErrorCode::ConfigError {
            tracing::error!("Configuration error: {}", err);
        }
        let message = err.user_message(&err.to_string());
        ApiError::new(code, message)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Busy => ApiError::new(ErrorCode::Busy, err.to_string()),
            WorkflowError::ModeDisabled(_) => {
                ApiError::new(ErrorCode::ModeDisabled, err.to_string())
            }
            WorkflowError::NoResult => ApiError::invalid_state(err.to_string()),
            WorkflowError::Capture(e) => e.into(),
            WorkflowError::Client(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use ingrid_capture::DeviceFault;

    #[test]
    fn test_device_errors_are_unavailable() {
        let err: ApiError = CaptureError::DeviceUnavailable(DeviceFault::PermissionDenied).into();
        assert_eq!(err.code, ErrorCode::DeviceUnavailable);
        assert_eq!(err.exit_code(), exit_codes::UNAVAILABLE);
    }

    #[test]
    fn test_rejection_uses_backend_detail() {
        let err: ApiError = ClientError::Rejected {
            status: 404,
            detail: Some("Product not found".into()),
        }
        .into();
        assert_eq!(err.code, ErrorCode::BackendRejected);
        assert_eq!(err.message, "Product not found");
    }

    #[test]
    fn test_workflow_errors() {
        let busy: ApiError = WorkflowError::Busy.into();
        assert_eq!(busy.code, ErrorCode::Busy);

        let disabled: ApiError = WorkflowError::ModeDisabled(ingrid_core::ScanMode::Manual).into();
        assert_eq!(disabled.code, ErrorCode::ModeDisabled);
        assert_eq!(disabled.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_serializes_screaming_codes() {
        let err = ApiError::new(ErrorCode::NetworkFailure, "offline");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NETWORK_FAILURE");
        assert_eq!(json["message"], "offline");
        assert_eq!(err.to_string(), "[NETWORK_FAILURE] offline");
    }
}

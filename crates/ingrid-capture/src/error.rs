//! # Capture Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DEVICE         DeviceUnavailable   terminal for this attempt          │
//! │  INPUT          Validation          nothing produced, stay active      │
//! │  LIFECYCLE      InvalidState        operation not valid right now      │
//! │                 Unsupported         operation belongs to another mode  │
//! │  USER           Cancelled           session ended by the user          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A frame without a symbol is not an error and has no variant here.

use ingrid_core::{ScanMode, ValidationError};
use thiserror::Error;

use crate::session::SessionState;

/// Why a camera could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceFault {
    #[error("no camera found")]
    NotFound,

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera is in use by another application")]
    Busy,

    #[error("camera did not open within {secs}s")]
    Timeout { secs: u64 },

    #[error("camera stream ended")]
    StreamEnded,

    #[error("{0}")]
    Failed(String),
}

/// Capture session errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera could not be opened or stopped delivering frames.
    ///
    /// ## When This Occurs
    /// - No camera attached, or permission denied
    /// - Camera held by another process
    /// - Open exceeded the device timeout
    ///
    /// Never retried automatically.
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceFault),

    /// Input was rejected before it became an artifact.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Operation not valid in the session's current state.
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Operation belongs to a different capture mode.
    #[error("{operation} is not available in {mode} mode")]
    Unsupported {
        operation: &'static str,
        mode: ScanMode,
    },

    /// The user cancelled the session.
    #[error("Capture cancelled")]
    Cancelled,
}

impl CaptureError {
    /// Returns true if this is a device failure.
    pub fn is_device_error(&self) -> bool {
        matches!(self, CaptureError::DeviceUnavailable(_))
    }
}

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

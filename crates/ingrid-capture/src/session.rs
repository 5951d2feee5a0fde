//! # Capture Session
//!
//! Shared lifecycle for every capture mode, and the sum type the workflow
//! controller holds.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │              start()                 artifact produced                  │
//! │   ┌──────┐ ─────────► ┌────────┐ ─────────────────────► ┌──────────┐   │
//! │   │ IDLE │            │ ACTIVE │                        │ RESOLVED │   │
//! │   └──────┘ ◄───────┐  └────────┘ ─────────┐             └──────────┘   │
//! │      ▲             │      │   cancel()    ▼                   │         │
//! │      │             │      │         ┌───────────┐             │         │
//! │      │   device    │      │         │ CANCELLED │             │         │
//! │      │   failure ──┘      │         └───────────┘             │         │
//! │      │                    │               │                   │         │
//! │      └────────────────────┴─── reset() ───┴───────────────────┘         │
//! │                                                                         │
//! │  One artifact per pass: take_artifact() yields Some exactly once.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ingrid_core::{CaptureArtifact, ScanMode};

use crate::barcode::BarcodeSession;
use crate::camera::CameraSession;
use crate::device::CaptureDevices;
use crate::error::{CaptureError, CaptureResult};
use crate::manual::ManualSession;
use crate::photo::PhotoSession;

// =============================================================================
// Session State
// =============================================================================

/// Lifecycle state shared by all modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Resolved,
    Cancelled,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Active => write!(f, "active"),
            SessionState::Resolved => write!(f, "resolved"),
            SessionState::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// One-Shot Lifecycle
// =============================================================================

/// Lifecycle bookkeeping that guarantees one artifact per pass.
#[derive(Debug)]
pub struct OneShot {
    state: SessionState,
    artifact: Option<CaptureArtifact>,
}

impl Default for OneShot {
    fn default() -> Self {
        Self::new()
    }
}

impl OneShot {
    pub fn new() -> Self {
        OneShot {
            state: SessionState::Idle,
            artifact: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Fails unless the session is idle.
    pub fn ensure_idle(&self, operation: &'static str) -> CaptureResult<()> {
        self.expect(SessionState::Idle, operation)
    }

    /// Fails unless the session is active.
    pub fn ensure_active(&self, operation: &'static str) -> CaptureResult<()> {
        self.expect(SessionState::Active, operation)
    }

    /// idle → active
    pub fn activate(&mut self, operation: &'static str) -> CaptureResult<()> {
        self.ensure_idle(operation)?;
        self.state = SessionState::Active;
        Ok(())
    }

    /// active → resolved, holding `artifact` for a single take.
    pub fn resolve(&mut self, artifact: CaptureArtifact) -> CaptureResult<()> {
        self.ensure_active("resolve")?;
        self.artifact = Some(artifact);
        self.state = SessionState::Resolved;
        Ok(())
    }

    /// active → cancelled. Cancelling an idle session is a no-op.
    pub fn cancel(&mut self) -> CaptureResult<()> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Active => {
                self.state = SessionState::Cancelled;
                Ok(())
            }
            state => Err(CaptureError::InvalidState {
                operation: "cancel",
                state,
            }),
        }
    }

    /// Yields the artifact of a resolved session, once.
    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.artifact.take()
    }

    /// any → idle. Drops an untaken artifact.
    pub fn reset(&mut self) {
        self.artifact = None;
        self.state = SessionState::Idle;
    }

    fn expect(&self, wanted: SessionState, operation: &'static str) -> CaptureResult<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(CaptureError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

// =============================================================================
// Capture Session (sum type)
// =============================================================================

/// The session of whichever mode is selected.
pub enum CaptureSession {
    Camera(CameraSession),
    Barcode(BarcodeSession),
    Manual(ManualSession),
    Photo(PhotoSession),
}

impl CaptureSession {
    /// Creates an idle session for `mode`. No device is touched until
    /// `start()`.
    pub fn new(mode: ScanMode, devices: &CaptureDevices) -> Self {
        match mode {
            ScanMode::Camera => CaptureSession::Camera(CameraSession::new(
                devices.camera.clone(),
                devices.open_timeout,
            )),
            ScanMode::Barcode => CaptureSession::Barcode(BarcodeSession::new(
                devices.camera.clone(),
                devices.decoder.clone(),
                devices.open_timeout,
            )),
            ScanMode::Manual => CaptureSession::Manual(ManualSession::new()),
            ScanMode::Photo => CaptureSession::Photo(PhotoSession::new()),
        }
    }

    pub fn mode(&self) -> ScanMode {
        match self {
            CaptureSession::Camera(_) => ScanMode::Camera,
            CaptureSession::Barcode(_) => ScanMode::Barcode,
            CaptureSession::Manual(_) => ScanMode::Manual,
            CaptureSession::Photo(_) => ScanMode::Photo,
        }
    }

    fn lifecycle(&self) -> &OneShot {
        match self {
            CaptureSession::Camera(s) => s.lifecycle(),
            CaptureSession::Barcode(s) => s.lifecycle(),
            CaptureSession::Manual(s) => s.lifecycle(),
            CaptureSession::Photo(s) => s.lifecycle(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle().state()
    }

    /// idle → active (acquires the camera in camera and barcode modes).
    pub async fn start(&mut self) -> CaptureResult<()> {
        match self {
            CaptureSession::Camera(s) => s.start().await,
            CaptureSession::Barcode(s) => s.start().await,
            CaptureSession::Manual(s) => s.start(),
            CaptureSession::Photo(s) => s.start(),
        }
    }

    /// Ends the session and releases any device.
    pub fn cancel(&mut self) -> CaptureResult<()> {
        match self {
            CaptureSession::Camera(s) => s.cancel(),
            CaptureSession::Barcode(s) => s.cancel(),
            CaptureSession::Manual(s) => s.cancel(),
            CaptureSession::Photo(s) => s.cancel(),
        }
    }

    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        match self {
            CaptureSession::Camera(s) => s.take_artifact(),
            CaptureSession::Barcode(s) => s.take_artifact(),
            CaptureSession::Manual(s) => s.take_artifact(),
            CaptureSession::Photo(s) => s.take_artifact(),
        }
    }

    /// Back to idle in the same mode, releasing any device.
    pub fn reset(&mut self) {
        match self {
            CaptureSession::Camera(s) => s.reset(),
            CaptureSession::Barcode(s) => s.reset(),
            CaptureSession::Manual(s) => s.reset(),
            CaptureSession::Photo(s) => s.reset(),
        }
    }

    pub fn as_camera(&mut self, operation: &'static str) -> CaptureResult<&mut CameraSession> {
        match self {
            CaptureSession::Camera(s) => Ok(s),
            other => Err(other.unsupported(operation)),
        }
    }

    pub fn as_barcode(&mut self, operation: &'static str) -> CaptureResult<&mut BarcodeSession> {
        match self {
            CaptureSession::Barcode(s) => Ok(s),
            other => Err(other.unsupported(operation)),
        }
    }

    pub fn as_manual(&mut self, operation: &'static str) -> CaptureResult<&mut ManualSession> {
        match self {
            CaptureSession::Manual(s) => Ok(s),
            other => Err(other.unsupported(operation)),
        }
    }

    pub fn as_photo(&mut self, operation: &'static str) -> CaptureResult<&mut PhotoSession> {
        match self {
            CaptureSession::Photo(s) => Ok(s),
            other => Err(other.unsupported(operation)),
        }
    }

    fn unsupported(&self, operation: &'static str) -> CaptureError {
        CaptureError::Unsupported {
            operation,
            mode: self.mode(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ingrid_core::Barcode;

    fn artifact() -> CaptureArtifact {
        CaptureArtifact::Barcode(Barcode::parse("3017620422003").unwrap())
    }

    #[test]
    fn test_one_shot_lifecycle() {
        let mut life = OneShot::new();
        assert_eq!(life.state(), SessionState::Idle);
        assert!(life.resolve(artifact()).is_err());

        life.activate("start").unwrap();
        life.resolve(artifact()).unwrap();
        assert_eq!(life.state(), SessionState::Resolved);

        assert!(life.take_artifact().is_some());
        assert!(life.take_artifact().is_none());
    }

    #[test]
    fn test_second_artifact_requires_reset() {
        let mut life = OneShot::new();
        life.activate("start").unwrap();
        life.resolve(artifact()).unwrap();

        assert!(life.activate("start").is_err());
        assert!(matches!(
            life.resolve(artifact()),
            Err(CaptureError::InvalidState {
                state: SessionState::Resolved,
                ..
            })
        ));

        life.reset();
        life.activate("start").unwrap();
        life.resolve(artifact()).unwrap();
        assert!(life.take_artifact().is_some());
    }

    #[test]
    fn test_cancel_transitions() {
        let mut life = OneShot::new();
        life.cancel().unwrap();
        assert_eq!(life.state(), SessionState::Idle);

        life.activate("start").unwrap();
        life.cancel().unwrap();
        assert_eq!(life.state(), SessionState::Cancelled);
        assert!(life.activate("start").is_err());

        life.reset();
        assert_eq!(life.state(), SessionState::Idle);
    }

    #[test]
    fn test_reset_drops_untaken_artifact() {
        let mut life = OneShot::new();
        life.activate("start").unwrap();
        life.resolve(artifact()).unwrap();
        life.reset();
        assert!(life.take_artifact().is_none());
    }
}

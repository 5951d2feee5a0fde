//! # Camera Mode
//!
//! Photograph the ingredient label.
//!
//! ```text
//!  start() ──► LIVE ──capture()──► PREVIEW ──confirm()──► resolved(Photo)
//!               ▲                     │
//!               └──── retake() ───────┘
//! ```
//!
//! The camera is held only while live. Capturing a still releases it, and
//! retaking acquires it again.

use std::sync::Arc;
use std::time::Duration;

use ingrid_core::{CaptureArtifact, ImageBlob};
use tracing::{debug, info};

use crate::device::{CameraDevice, CameraGuard};
use crate::error::{CaptureError, CaptureResult};
use crate::session::{OneShot, SessionState};

/// Where an active camera session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStage {
    /// Not active.
    Off,
    /// Camera open, waiting for `capture()`.
    Live,
    /// Still taken, camera released, waiting for confirm or retake.
    Preview,
}

pub struct CameraSession {
    lifecycle: OneShot,
    camera: Arc<dyn CameraDevice>,
    open_timeout: Duration,
    guard: Option<CameraGuard>,
    still: Option<ImageBlob>,
}

impl CameraSession {
    pub fn new(camera: Arc<dyn CameraDevice>, open_timeout: Duration) -> Self {
        CameraSession {
            lifecycle: OneShot::new(),
            camera,
            open_timeout,
            guard: None,
            still: None,
        }
    }

    pub(crate) fn lifecycle(&self) -> &OneShot {
        &self.lifecycle
    }

    pub fn stage(&self) -> CameraStage {
        if self.guard.is_some() {
            CameraStage::Live
        } else if self.still.is_some() {
            CameraStage::Preview
        } else {
            CameraStage::Off
        }
    }

    /// The still awaiting confirmation.
    pub fn preview(&self) -> Option<&ImageBlob> {
        self.still.as_ref()
    }

    /// Opens the camera. A device failure leaves the session idle.
    pub async fn start(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_idle("start camera")?;
        let guard = CameraGuard::acquire(self.camera.as_ref(), self.open_timeout).await?;
        self.guard = Some(guard);
        self.lifecycle.activate("start camera")?;
        info!(device = %self.camera.name(), "Camera live");
        Ok(())
    }

    /// Grabs a still and releases the camera.
    pub async fn capture(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_active("capture")?;
        let Some(guard) = self.guard.as_mut() else {
            return Err(CaptureError::InvalidState {
                operation: "capture",
                state: SessionState::Active,
            });
        };

        let grabbed = guard.grab_still().await;
        self.guard = None;

        let frame = match grabbed {
            Ok(frame) => frame,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        match ImageBlob::captured_frame(frame.bytes, frame.mime_type) {
            Ok(still) => {
                debug!(bytes = still.len(), "Captured still");
                self.still = Some(still);
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e.into())
            }
        }
    }

    /// Discards the still and opens the camera again.
    pub async fn retake(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_active("retake")?;
        if self.still.take().is_none() {
            return Err(CaptureError::InvalidState {
                operation: "retake",
                state: SessionState::Active,
            });
        }

        match CameraGuard::acquire(self.camera.as_ref(), self.open_timeout).await {
            Ok(guard) => {
                self.guard = Some(guard);
                debug!("Retaking photo");
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Accepts the still as the session's artifact.
    pub fn confirm(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_active("confirm")?;
        let Some(still) = self.still.take() else {
            return Err(CaptureError::InvalidState {
                operation: "confirm",
                state: SessionState::Active,
            });
        };
        self.lifecycle.resolve(CaptureArtifact::Photo(still))
    }

    pub fn cancel(&mut self) -> CaptureResult<()> {
        self.guard = None;
        self.still = None;
        self.lifecycle.cancel()
    }

    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.lifecycle.take_artifact()
    }

    pub fn reset(&mut self) {
        self.guard = None;
        self.still = None;
        self.lifecycle.reset();
    }
}

//! # Barcode Mode
//!
//! Decode barcodes from live video.
//!
//! ## Scan Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan()                                                                 │
//! │    loop {                                                               │
//! │      cancelled?            ──► release camera, Err(Cancelled)          │
//! │      frame = next_frame()                                              │
//! │        stream error/end    ──► release camera, back to idle, Err       │
//! │      decoder.decode(frame)                                             │
//! │        None                ──► next frame (not an error)               │
//! │        Some(not 8-14 digit)──► debug log, next frame                   │
//! │        Some(valid)         ──► release camera, resolved(Barcode)       │
//! │    }                                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use ingrid_core::{Barcode, CaptureArtifact};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::device::{BarcodeDecoder, CameraDevice, CameraGuard, Frame};
use crate::error::{CaptureError, CaptureResult, DeviceFault};
use crate::session::{OneShot, SessionState};

// =============================================================================
// Cancel Handle
// =============================================================================

/// Cancels a pending [`BarcodeSession::scan`] from outside the session.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

// =============================================================================
// Barcode Session
// =============================================================================

enum Step {
    Cancelled,
    Frame(CaptureResult<Option<Frame>>),
}

pub struct BarcodeSession {
    lifecycle: OneShot,
    camera: Arc<dyn CameraDevice>,
    decoder: Arc<dyn BarcodeDecoder>,
    open_timeout: Duration,
    guard: Option<CameraGuard>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl BarcodeSession {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        decoder: Arc<dyn BarcodeDecoder>,
        open_timeout: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(false);
        BarcodeSession {
            lifecycle: OneShot::new(),
            camera,
            decoder,
            open_timeout,
            guard: None,
            cancel_tx: Arc::new(tx),
            cancel_rx: rx,
        }
    }

    pub(crate) fn lifecycle(&self) -> &OneShot {
        &self.lifecycle
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Returns true while the camera is held.
    pub fn is_live(&self) -> bool {
        self.guard.is_some()
    }

    /// Opens the camera. A device failure leaves the session idle.
    ///
    /// A cancel raised while the open is pending drops the open and fails
    /// with [`CaptureError::Cancelled`]; the session stays idle.
    pub async fn start(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_idle("start scanner")?;
        self.cancel_tx.send_replace(false);

        let rx = &mut self.cancel_rx;
        let opened = tokio::select! {
            biased;
            _ = rx.wait_for(|cancelled| *cancelled) => None,
            guard = CameraGuard::acquire(self.camera.as_ref(), self.open_timeout) => Some(guard),
        };
        let Some(guard) = opened else {
            info!(device = %self.camera.name(), "Scanner start cancelled");
            return Err(CaptureError::Cancelled);
        };

        self.guard = Some(guard?);
        self.lifecycle.activate("start scanner")?;
        info!(device = %self.camera.name(), "Barcode scanner live");
        Ok(())
    }

    /// Reads frames until a valid barcode is decoded, the stream fails, or
    /// the session is cancelled.
    pub async fn scan(&mut self) -> CaptureResult<Barcode> {
        self.lifecycle.ensure_active("scan")?;
        if self.guard.is_none() {
            return Err(CaptureError::InvalidState {
                operation: "scan",
                state: SessionState::Active,
            });
        }

        let mut frames_seen: u64 = 0;
        loop {
            let step = match self.guard.as_mut() {
                Some(guard) => {
                    let rx = &mut self.cancel_rx;
                    tokio::select! {
                        biased;
                        _ = rx.wait_for(|cancelled| *cancelled) => Step::Cancelled,
                        frame = guard.next_frame() => Step::Frame(frame),
                    }
                }
                None => Step::Cancelled,
            };

            let frame = match step {
                Step::Cancelled => {
                    self.guard = None;
                    if self.lifecycle.state() == SessionState::Active {
                        self.lifecycle.cancel()?;
                    }
                    info!(frames = frames_seen, "Barcode scan cancelled");
                    return Err(CaptureError::Cancelled);
                }
                Step::Frame(Ok(Some(frame))) => frame,
                Step::Frame(Ok(None)) => {
                    self.reset();
                    return Err(DeviceFault::StreamEnded.into());
                }
                Step::Frame(Err(e)) => {
                    self.reset();
                    return Err(e);
                }
            };
            frames_seen += 1;

            let Some(text) = self.decoder.decode(&frame) else {
                continue;
            };

            match Barcode::parse(&text) {
                Ok(code) => {
                    self.guard = None;
                    self.lifecycle
                        .resolve(CaptureArtifact::Barcode(code.clone()))?;
                    info!(barcode = %code, frames = frames_seen, "Barcode decoded");
                    return Ok(code);
                }
                Err(e) => {
                    debug!(decoded = %text, reason = %e, "Skipping non-product symbol");
                }
            }
        }
    }

    /// Stops scanning and releases the camera. Also wakes a pending `scan()`.
    pub fn cancel(&mut self) -> CaptureResult<()> {
        self.cancel_tx.send_replace(true);
        self.guard = None;
        self.lifecycle.cancel()
    }

    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.lifecycle.take_artifact()
    }

    pub fn reset(&mut self) {
        self.guard = None;
        self.cancel_tx.send_replace(false);
        self.lifecycle.reset();
    }
}

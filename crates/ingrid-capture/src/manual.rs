//! # Manual Mode
//!
//! Typed barcode entry. No device is involved.

use ingrid_core::{Barcode, CaptureArtifact};
use tracing::debug;

use crate::error::CaptureResult;
use crate::session::OneShot;

#[derive(Debug, Default)]
pub struct ManualSession {
    lifecycle: OneShot,
}

impl ManualSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lifecycle(&self) -> &OneShot {
        &self.lifecycle
    }

    /// Opens the input.
    pub fn start(&mut self) -> CaptureResult<()> {
        self.lifecycle.activate("open manual entry")
    }

    /// Submits typed text. Blank or malformed input is rejected and the
    /// session stays active so the user can correct it.
    pub fn submit(&mut self, text: &str) -> CaptureResult<Barcode> {
        self.lifecycle.ensure_active("submit barcode")?;
        let code = Barcode::parse(text).inspect_err(|e| {
            debug!(reason = %e, "Rejected manual entry");
        })?;
        self.lifecycle
            .resolve(CaptureArtifact::Barcode(code.clone()))?;
        Ok(code)
    }

    pub fn cancel(&mut self) -> CaptureResult<()> {
        self.lifecycle.cancel()
    }

    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.lifecycle.take_artifact()
    }

    pub fn reset(&mut self) {
        self.lifecycle.reset();
    }
}

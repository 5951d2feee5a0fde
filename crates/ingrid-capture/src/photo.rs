//! # Photo Mode
//!
//! Upload an existing picture of the label.
//!
//! ```text
//!  start() ──► CHOOSING ──choose(image)──► PREVIEW ──analyze()──► resolved(Photo)
//!                 ▲                           │
//!                 └───────── clear() ─────────┘
//! ```

use ingrid_core::{CaptureArtifact, ImageBlob};
use tracing::debug;

use crate::error::{CaptureError, CaptureResult};
use crate::session::{OneShot, SessionState};

#[derive(Debug, Default)]
pub struct PhotoSession {
    lifecycle: OneShot,
    chosen: Option<ImageBlob>,
}

impl PhotoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lifecycle(&self) -> &OneShot {
        &self.lifecycle
    }

    /// The chosen image awaiting analysis.
    pub fn preview(&self) -> Option<&ImageBlob> {
        self.chosen.as_ref()
    }

    /// Opens the picker.
    pub fn start(&mut self) -> CaptureResult<()> {
        self.lifecycle.activate("open photo picker")
    }

    /// Selects an image, replacing any earlier choice.
    pub fn choose(&mut self, image: ImageBlob) -> CaptureResult<()> {
        self.lifecycle.ensure_active("choose photo")?;
        debug!(file = %image.file_name(), bytes = image.len(), "Photo chosen");
        self.chosen = Some(image);
        Ok(())
    }

    /// Drops the chosen image and goes back to choosing.
    pub fn clear(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_active("clear photo")?;
        self.chosen = None;
        Ok(())
    }

    /// Accepts the chosen image as the session's artifact.
    pub fn analyze(&mut self) -> CaptureResult<()> {
        self.lifecycle.ensure_active("analyze photo")?;
        let Some(image) = self.chosen.take() else {
            return Err(CaptureError::InvalidState {
                operation: "analyze photo",
                state: SessionState::Active,
            });
        };
        self.lifecycle.resolve(CaptureArtifact::Photo(image))
    }

    pub fn cancel(&mut self) -> CaptureResult<()> {
        self.chosen = None;
        self.lifecycle.cancel()
    }

    pub fn take_artifact(&mut self) -> Option<CaptureArtifact> {
        self.lifecycle.take_artifact()
    }

    pub fn reset(&mut self) {
        self.chosen = None;
        self.lifecycle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageBlob {
        ImageBlob::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", name).unwrap()
    }

    #[test]
    fn test_choose_clear_analyze() {
        let mut session = PhotoSession::new();
        session.start().unwrap();

        assert!(session.analyze().is_err());

        session.choose(image("first.jpg")).unwrap();
        session.clear().unwrap();
        assert!(session.preview().is_none());

        session.choose(image("label.jpg")).unwrap();
        session.analyze().unwrap();

        match session.take_artifact() {
            Some(CaptureArtifact::Photo(blob)) => assert_eq!(blob.file_name(), "label.jpg"),
            other => panic!("unexpected artifact: {other:?}"),
        }
        assert!(session.take_artifact().is_none());
    }

    #[test]
    fn test_cancel_discards_choice() {
        let mut session = PhotoSession::new();
        session.start().unwrap();
        session.choose(image("label.jpg")).unwrap();
        session.cancel().unwrap();
        assert!(session.preview().is_none());
        assert_eq!(session.lifecycle().state(), SessionState::Cancelled);
    }
}

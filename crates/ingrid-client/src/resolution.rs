//! # Resolution Client
//!
//! Submits a captured artifact and returns the rated product.
//!
//! Submissions are single-shot: a failed scan is reported to the user, who
//! decides whether to try again. Each request is bounded by the configured
//! timeout inside the backend.

use std::sync::Arc;

use ingrid_core::{ArtifactKind, Barcode, CaptureArtifact, ImageBlob, ScanResult, SessionId};
use tracing::{error, info};

use crate::backend::ScanBackend;
use crate::error::{ClientError, ClientResult};

/// Shown when a barcode submission fails without a backend explanation.
pub const BARCODE_FAILURE_MESSAGE: &str = "Failed to scan barcode. Please try again.";

/// Shown when a photo submission fails without a backend explanation.
pub const PHOTO_FAILURE_MESSAGE: &str = "Failed to scan photo. Please try again.";

/// The generic failure message for an artifact kind.
pub fn fallback_message(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Barcode => BARCODE_FAILURE_MESSAGE,
        ArtifactKind::Photo => PHOTO_FAILURE_MESSAGE,
    }
}

#[derive(Clone)]
pub struct ResolutionClient {
    backend: Arc<dyn ScanBackend>,
}

impl ResolutionClient {
    pub fn new(backend: Arc<dyn ScanBackend>) -> Self {
        ResolutionClient { backend }
    }

    pub async fn submit_barcode(
        &self,
        barcode: &Barcode,
        session: &SessionId,
    ) -> ClientResult<ScanResult> {
        info!(barcode = %barcode, "Submitting barcode");
        match self.backend.scan_barcode(barcode, session).await {
            Ok(result) => Ok(Self::resolved(result)),
            Err(e) => {
                error!(barcode = %barcode, error = %e, "Barcode scan failed");
                Err(e)
            }
        }
    }

    pub async fn submit_photo(
        &self,
        image: &ImageBlob,
        session: &SessionId,
    ) -> ClientResult<ScanResult> {
        info!(file = %image.file_name(), bytes = image.len(), "Submitting label photo");
        match self.backend.scan_photo(image, session).await {
            Ok(result) => Ok(Self::resolved(result)),
            Err(e) => {
                error!(file = %image.file_name(), error = %e, "Photo scan failed");
                Err(e)
            }
        }
    }

    /// Submits whichever artifact a capture session produced.
    pub async fn submit(
        &self,
        artifact: &CaptureArtifact,
        session: &SessionId,
    ) -> ClientResult<ScanResult> {
        match artifact {
            CaptureArtifact::Barcode(code) => self.submit_barcode(code, session).await,
            CaptureArtifact::Photo(image) => self.submit_photo(image, session).await,
        }
    }

    /// The message to show for a failed submission of `kind`.
    pub fn failure_message(kind: ArtifactKind, err: &ClientError) -> String {
        err.user_message(fallback_message(kind))
    }

    fn resolved(result: ScanResult) -> ScanResult {
        let result = result.normalized();
        info!(
            product_id = %result.product.id,
            name = %result.product.name,
            rating = %result.product.rating,
            ingredient_count = result.product.ingredient_count,
            "Product resolved"
        );
        result
    }
}

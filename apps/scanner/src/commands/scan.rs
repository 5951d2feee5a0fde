//! # Scan Commands
//!
//! One command per capture mode.
//!
//! ## Camera Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  start_camera() ──► Preview ──► camera_step(Analyze) ──► Done(result)  │
//! │                        ▲   │                                            │
//! │                        │   ├──► camera_step(Retake) ──► Preview         │
//! │                        └───┘                                            │
//! │                            └──► camera_step(Cancel) ──► Done(cancelled) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ingrid_core::{ImageBlob, ScanMode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, warn};

use crate::commands::ProductView;
use crate::devices::mime_type_for_path;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, ScanOutcome};

/// How a scan ended.
#[derive(Debug, Clone)]
pub enum ScanReport {
    Resolved(ProductView),
    Cancelled,
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReport::Resolved(product) => write!(f, "{product}"),
            ScanReport::Cancelled => write!(f, "Scan cancelled."),
        }
    }
}

/// A still waiting for the user's decision.
#[derive(Debug, Clone)]
pub struct PreviewInfo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: usize,
}

impl From<&ImageBlob> for PreviewInfo {
    fn from(image: &ImageBlob) -> Self {
        PreviewInfo {
            file_name: image.file_name().to_string(),
            mime_type: image.mime_type().to_string(),
            bytes: image.len(),
        }
    }
}

impl fmt::Display for PreviewInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Captured {} ({}, {} bytes)",
            self.file_name, self.mime_type, self.bytes
        )
    }
}

/// What to do with a captured still.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraChoice {
    Analyze,
    Retake,
    Cancel,
}

impl FromStr for CameraChoice {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "a" | "analyze" | "y" | "yes" => Ok(CameraChoice::Analyze),
            "r" | "retake" => Ok(CameraChoice::Retake),
            "c" | "cancel" | "n" | "no" => Ok(CameraChoice::Cancel),
            other => Err(ApiError::validation(format!(
                "Unknown choice '{other}': expected analyze, retake or cancel"
            ))),
        }
    }
}

/// Prompts on `out` and reads lines from `input` until one parses as a
/// choice. End of input cancels.
///
/// Reuse one `input` across prompts: lines it has buffered belong to the
/// prompts that follow.
pub async fn ask_choice<R, W>(
    input: &mut Lines<R>,
    out: &mut W,
    preview: &PreviewInfo,
) -> CameraChoice
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let prompt = format!("{preview}. [a]nalyze, [r]etake or [c]ancel? ");
        if let Err(e) = write_prompt(out, &prompt).await {
            warn!(error = %e, "Failed to write prompt");
        }

        match input.next_line().await {
            Ok(Some(line)) => match line.parse::<CameraChoice>() {
                Ok(choice) => return choice,
                Err(e) => {
                    if let Err(e) = write_prompt(out, &format!("{}\n", e.message)).await {
                        warn!(error = %e, "Failed to write prompt");
                    }
                }
            },
            Ok(None) => return CameraChoice::Cancel,
            Err(e) => {
                warn!(error = %e, "Failed to read choice, cancelling");
                return CameraChoice::Cancel;
            }
        }
    }
}

async fn write_prompt<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

/// Result of one camera decision.
#[derive(Debug, Clone)]
pub enum CameraStep {
    Preview(PreviewInfo),
    Done(ScanReport),
}

fn report(outcome: ScanOutcome) -> ApiResult<ScanReport> {
    match outcome {
        ScanOutcome::Resolved(result) => Ok(ScanReport::Resolved(ProductView::from(&result))),
        ScanOutcome::Cancelled => Ok(ScanReport::Cancelled),
        ScanOutcome::Failed { kind, message } => Err(ApiError::new(kind.into(), message)),
        ScanOutcome::Pending(state) => Err(ApiError::invalid_state(format!(
            "Capture is still {state}"
        ))),
    }
}

/// Submits a typed barcode.
pub async fn enter_barcode(app: &AppState, digits: &str) -> ApiResult<ScanReport> {
    debug!("enter_barcode command");
    app.workflow.select_mode(ScanMode::Manual).await?;
    report(app.workflow.enter_barcode(digits).await?)
}

/// Reads frames until a barcode is decoded, then submits it.
pub async fn scan_barcode(app: &AppState) -> ApiResult<ScanReport> {
    debug!("scan_barcode command");
    app.workflow.select_mode(ScanMode::Barcode).await?;
    report(app.workflow.scan_barcode().await?)
}

/// Opens the camera and captures a still for preview.
pub async fn start_camera(app: &AppState) -> ApiResult<PreviewInfo> {
    debug!("start_camera command");
    app.workflow.select_mode(ScanMode::Camera).await?;
    app.workflow.start().await?;
    capture(app).await
}

/// Applies the user's decision about the current still.
pub async fn camera_step(app: &AppState, choice: CameraChoice) -> ApiResult<CameraStep> {
    debug!(?choice, "camera_step command");
    match choice {
        CameraChoice::Analyze => Ok(CameraStep::Done(report(app.workflow.confirm().await?)?)),
        CameraChoice::Retake => {
            app.workflow.retake().await?;
            Ok(CameraStep::Preview(capture(app).await?))
        }
        CameraChoice::Cancel => {
            app.workflow.cancel().await?;
            Ok(CameraStep::Done(ScanReport::Cancelled))
        }
    }
}

async fn capture(app: &AppState) -> ApiResult<PreviewInfo> {
    let still = app
        .workflow
        .capture_still()
        .await?
        .ok_or_else(|| ApiError::invalid_state("Camera produced no still"))?;
    Ok(PreviewInfo::from(&still))
}

/// Uploads a label photo from disk.
pub async fn upload_photo(app: &AppState, path: &Path) -> ApiResult<ScanReport> {
    debug!(path = %path.display(), "upload_photo command");
    let mime_type = mime_type_for_path(path).ok_or_else(|| {
        ApiError::validation(format!("Unsupported image type: {}", path.display()))
    })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::storage(format!("Cannot read {}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let image = ImageBlob::new(bytes, mime_type, file_name)?;

    app.workflow.select_mode(ScanMode::Photo).await?;
    app.workflow.choose_photo(image).await?;
    report(app.workflow.analyze().await?)
}

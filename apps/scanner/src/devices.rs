//! # Terminal Devices
//!
//! Frame sources for running the scanner without a camera driver.
//!
//! ```text
//! FrameSource::None      ──► every open fails with DeviceFault::NotFound
//! FrameSource::Terminal  ──► one frame per stdin line, EOF ends the stream
//! FrameSource::File(p)   ──► every frame and still is the file at p
//! ```
//!
//! The decoder treats a text frame consisting only of digits as a decoded
//! symbol. Barcode validation happens in the capture session, so short or
//! long digit runs are still skipped there.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ingrid_capture::{
    BarcodeDecoder, CameraDevice, CaptureDevices, CaptureResult, DeviceFault, Frame, VideoStream,
};
use ingrid_core::validation::mime_type_for_extension;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

/// Where camera frames come from.
#[derive(Debug, Clone)]
pub enum FrameSource {
    None,
    Terminal,
    File(PathBuf),
}

impl FrameSource {
    pub fn into_devices(self, open_timeout: Duration) -> CaptureDevices {
        let camera: Arc<dyn CameraDevice> = match self {
            FrameSource::None => Arc::new(NoCamera),
            FrameSource::Terminal => Arc::new(TerminalCamera),
            FrameSource::File(path) => Arc::new(FileCamera::new(path)),
        };
        CaptureDevices::new(camera, Arc::new(TextDecoder), open_timeout)
    }
}

/// MIME type for an image path, from its extension.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_type_for_extension)
}

fn device_fault(err: std::io::Error) -> DeviceFault {
    match err.kind() {
        ErrorKind::NotFound => DeviceFault::NotFound,
        ErrorKind::PermissionDenied => DeviceFault::PermissionDenied,
        _ => DeviceFault::Failed(err.to_string()),
    }
}

// =============================================================================
// No Camera
// =============================================================================

pub struct NoCamera;

#[async_trait]
impl CameraDevice for NoCamera {
    async fn open(&self) -> CaptureResult<Box<dyn VideoStream>> {
        Err(DeviceFault::NotFound.into())
    }

    fn name(&self) -> &str {
        "none"
    }
}

// =============================================================================
// File Camera
// =============================================================================

pub struct FileCamera {
    path: PathBuf,
    name: String,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        FileCamera { path, name }
    }
}

#[async_trait]
impl CameraDevice for FileCamera {
    async fn open(&self) -> CaptureResult<Box<dyn VideoStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(device_fault)?;
        let mime_type = mime_type_for_path(&self.path).ok_or_else(|| {
            DeviceFault::Failed(format!("unsupported image type: {}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Opened file camera");
        Ok(Box::new(FileStream {
            frame: Frame::new(bytes, mime_type),
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct FileStream {
    frame: Frame,
}

#[async_trait]
impl VideoStream for FileStream {
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>> {
        Ok(Some(self.frame.clone()))
    }

    async fn grab_still(&mut self) -> CaptureResult<Frame> {
        Ok(self.frame.clone())
    }
}

// =============================================================================
// Terminal Camera
// =============================================================================

/// Reads frames from stdin, one per line.
pub struct TerminalCamera;

#[async_trait]
impl CameraDevice for TerminalCamera {
    async fn open(&self) -> CaptureResult<Box<dyn VideoStream>> {
        Ok(Box::new(TerminalStream {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }))
    }

    fn name(&self) -> &str {
        "stdin"
    }
}

struct TerminalStream {
    lines: Lines<BufReader<Stdin>>,
}

#[async_trait]
impl VideoStream for TerminalStream {
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(Some(Frame::text(&line))),
            Ok(None) => Ok(None),
            Err(e) => Err(device_fault(e).into()),
        }
    }

    async fn grab_still(&mut self) -> CaptureResult<Frame> {
        Err(DeviceFault::Failed("terminal source cannot take stills".into()).into())
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Decodes text frames made only of digits.
pub struct TextDecoder;

impl BarcodeDecoder for TextDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        if !frame.mime_type.starts_with("text/") {
            return None;
        }
        let text = std::str::from_utf8(&frame.bytes).ok()?.trim();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            Some(text.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_reads_digit_lines() {
        assert_eq!(
            TextDecoder.decode(&Frame::text(" 3017620422003 ")),
            Some("3017620422003".to_string())
        );
        assert_eq!(TextDecoder.decode(&Frame::text("hello")), None);
        assert_eq!(TextDecoder.decode(&Frame::text("")), None);
        assert_eq!(TextDecoder.decode(&Frame::new(b"123".to_vec(), "image/jpeg")), None);
    }

    #[tokio::test]
    async fn test_file_camera_serves_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let camera = FileCamera::new(&path);
        let mut stream = camera.open().await.unwrap();
        let still = stream.grab_still().await.unwrap();
        assert_eq!(still.mime_type, "image/png");
        assert_eq!(still.bytes.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let camera = FileCamera::new("/definitely/not/here.jpg");
        let err = camera.open().await.err().unwrap();
        assert!(err.is_device_error());
        assert!(err.to_string().contains("no camera found"));
    }
}

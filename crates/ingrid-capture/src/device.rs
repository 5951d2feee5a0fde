//! # Devices
//!
//! Seams between capture sessions and the hardware.
//!
//! ## Camera Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CameraDevice::open() ──► Box<dyn VideoStream> ──► CameraGuard          │
//! │   (bounded by timeout)     (live handle)           (owned by session)   │
//! │                                                          │              │
//! │        capture / decode / cancel / error / mode switch   │              │
//! │                                                          ▼              │
//! │                                               drop(guard) = release     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Streams release the underlying camera when dropped, so whoever drops the
//! guard releases the camera. Sessions never hold a bare stream.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CaptureResult, DeviceFault};

// =============================================================================
// Frames
// =============================================================================

/// One encoded video frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Frame {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Frame {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Convenience for text-encoded frames (terminal sources, tests).
    pub fn text(text: &str) -> Self {
        Frame::new(text.as_bytes().to_vec(), "text/plain")
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// =============================================================================
// Traits
// =============================================================================

/// A camera that can be opened for streaming.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Opens the camera. The returned stream holds it until dropped.
    async fn open(&self) -> CaptureResult<Box<dyn VideoStream>>;

    /// Human-readable device name for logs.
    fn name(&self) -> &str;
}

/// A live camera stream.
#[async_trait]
pub trait VideoStream: Send {
    /// Next preview frame. `Ok(None)` means the stream ended.
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>>;

    /// A single full-quality still.
    async fn grab_still(&mut self) -> CaptureResult<Frame>;
}

/// Finds a barcode symbol in a frame.
pub trait BarcodeDecoder: Send + Sync {
    /// Returns the decoded text, or `None` if the frame holds no symbol.
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// The devices a capture session may use.
#[derive(Clone)]
pub struct CaptureDevices {
    pub camera: Arc<dyn CameraDevice>,
    pub decoder: Arc<dyn BarcodeDecoder>,
    pub open_timeout: Duration,
}

impl CaptureDevices {
    pub fn new(
        camera: Arc<dyn CameraDevice>,
        decoder: Arc<dyn BarcodeDecoder>,
        open_timeout: Duration,
    ) -> Self {
        CaptureDevices {
            camera,
            decoder,
            open_timeout,
        }
    }
}

// =============================================================================
// Camera Guard
// =============================================================================

/// Exclusive ownership of an open camera. Dropping it releases the camera.
pub struct CameraGuard {
    stream: Box<dyn VideoStream>,
    device: String,
}

impl CameraGuard {
    /// Opens `camera`, failing with [`DeviceFault::Timeout`] if it takes
    /// longer than `timeout`.
    pub async fn acquire(camera: &dyn CameraDevice, timeout: Duration) -> CaptureResult<Self> {
        let stream = match tokio::time::timeout(timeout, camera.open()).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(device = %camera.name(), error = %e, "Camera open failed");
                return Err(e);
            }
            Err(_) => {
                warn!(device = %camera.name(), timeout_secs = timeout.as_secs(), "Camera open timed out");
                return Err(DeviceFault::Timeout {
                    secs: timeout.as_secs(),
                }
                .into());
            }
        };

        debug!(device = %camera.name(), "Acquired camera");
        Ok(CameraGuard {
            stream,
            device: camera.name().to_string(),
        })
    }

    pub async fn next_frame(&mut self) -> CaptureResult<Option<Frame>> {
        self.stream.next_frame().await
    }

    pub async fn grab_still(&mut self) -> CaptureResult<Frame> {
        self.stream.grab_still().await
    }
}

impl Drop for CameraGuard {
    fn drop(&mut self) {
        debug!(device = %self.device, "Released camera");
    }
}

//! # ingrid-capture: Capture Sessions for the Ingrid Scanner
//!
//! Each capture mode is a small state machine that turns user input into
//! exactly one [`CaptureArtifact`](ingrid_core::CaptureArtifact).
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CaptureSession (sum type)                         │
//! │                                                                         │
//! │  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌─────────────┐ │
//! │  │ CameraSession │ │BarcodeSession │ │ ManualSession │ │PhotoSession │ │
//! │  │ live/preview  │ │ decode loop   │ │ typed digits  │ │ file upload │ │
//! │  │ CameraGuard   │ │ CameraGuard   │ │               │ │             │ │
//! │  └───────┬───────┘ └───────┬───────┘ └───────┬───────┘ └──────┬──────┘ │
//! │          └─────────────────┴────────┬────────┴────────────────┘        │
//! │                                     ▼                                   │
//! │                          OneShot lifecycle                              │
//! │               idle → active → resolved | cancelled                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Shared lifecycle and the `CaptureSession` sum type
//! - [`device`] - Camera, stream and decoder traits; `CameraGuard`
//! - [`camera`], [`barcode`], [`manual`], [`photo`] - One module per mode
//! - [`mock`] - Scriptable camera and decoder for tests
//! - [`error`] - Capture error types

pub mod barcode;
pub mod camera;
pub mod device;
pub mod error;
pub mod manual;
pub mod mock;
pub mod photo;
pub mod session;

pub use barcode::{BarcodeSession, CancelHandle};
pub use camera::{CameraSession, CameraStage};
pub use device::{BarcodeDecoder, CameraDevice, CameraGuard, CaptureDevices, Frame, VideoStream};
pub use error::{CaptureError, CaptureResult, DeviceFault};
pub use manual::ManualSession;
pub use photo::PhotoSession;
pub use session::{CaptureSession, OneShot, SessionState};

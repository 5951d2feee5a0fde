//! # State Module
//!
//! Application state for the scanner.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppState                                │   │
//! │  │  config: ClientConfig          (read-only after startup)        │   │
//! │  │  workflow: WorkflowController                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │CaptureSession│  │ ResultStore  │  │ View / in-flight │              │
//! │  │ async Mutex  │  │ (one slot)   │  │ std Mutex/Atomic │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod workflow;

pub use app::AppState;
pub use workflow::{
    ScanOutcome, View, WorkflowController, WorkflowError, WorkflowResult, WorkflowStatus,
};

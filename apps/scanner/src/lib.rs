//! # Ingrid Scanner Library
//!
//! The capture-and-resolution workflow behind the `ingrid` command.
//!
//! ## Module Organization
//! ```text
//! ingrid_scanner/
//! ├── lib.rs          ◄─── You are here (logging setup, re-exports)
//! ├── state/
//! │   ├── app.rs      ◄─── AppState wiring (store, identity, backend)
//! │   └── workflow.rs ◄─── WorkflowController (modes, views, submission)
//! ├── commands/       ◄─── One function per user action
//! ├── devices.rs      ◄─── Terminal frame sources and text decoder
//! ├── error.rs        ◄─── ApiError / ErrorCode
//! └── exit_codes.rs   ◄─── sysexits-style process status
//! ```
//!
//! ## Runtime Model
//! A single-threaded tokio runtime. Camera opens, frame reads and network
//! calls are the only suspension points.

pub mod commands;
pub mod devices;
pub mod error;
pub mod exit_codes;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, ScanOutcome, View, WorkflowController, WorkflowError};

/// Initializes the tracing subscriber, writing to stderr.
///
/// ## Log Levels
/// - Default: INFO
/// - `RUST_LOG=ingrid_capture=debug` - per-frame detail for one crate
/// - `--verbose` - DEBUG everywhere, ignoring `RUST_LOG`
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,hyper_util=info,reqwest=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

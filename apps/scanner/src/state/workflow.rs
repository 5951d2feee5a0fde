//! # Workflow Controller
//!
//! Owns the capture session of the selected mode, the current view, and
//! the in-flight flag for outstanding submissions.
//!
//! ## Scan Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Capture → Result                                 │
//! │                                                                         │
//! │  select_mode(mode) ──► old session reset (device released)             │
//! │         │              new idle session created                         │
//! │         ▼                                                               │
//! │  start / capture_still / retake / scan_barcode / enter_barcode /       │
//! │  choose_photo / clear_photo                                             │
//! │         │                                                               │
//! │         ▼  session resolved                                             │
//! │  confirm / analyze / (barcode decoded) / (manual entry accepted)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  take artifact ──► in-flight raised ──► ResolutionClient::submit       │
//! │                                              │                          │
//! │                    ┌─────────────────────────┴──────────┐               │
//! │                    ▼ Ok                                  ▼ Err          │
//! │        ResultStore::save(result)            message recorded            │
//! │        view = Result                        session back to idle        │
//! │        ScanOutcome::Resolved                ScanOutcome::Failed         │
//! │                                                                         │
//! │  While in flight every capture operation fails with Busy.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The session sits behind an async mutex because device waits happen
//! while it is held. Everything else is behind short-lived std mutexes that
//! are never held across an await. A running barcode scan is woken through
//! its [`CancelHandle`], which is kept outside the session lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ingrid_capture::{CancelHandle, CaptureDevices, CaptureError, CaptureSession, SessionState};
use ingrid_client::{
    CaptureSettings, ClientError, FailureKind, ListLoader, ResolutionClient, ResultStore,
};
use ingrid_core::{FavoriteEntry, HistoryEntry, ImageBlob, ScanMode, ScanResult, SessionId};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

// =============================================================================
// Types
// =============================================================================

/// The screen the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Scan,
    Result,
    History,
    Favorites,
}

/// Workflow errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A submission is outstanding.
    #[error("A scan is already being processed")]
    Busy,

    /// The mode is switched off in the configuration.
    #[error("{0} mode is disabled")]
    ModeDisabled(ScanMode),

    /// There is no current result to act on.
    #[error("No scan result yet")]
    NoResult,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// What a capture operation led to.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The session moved on but has not produced an artifact yet.
    Pending(SessionState),

    /// The artifact was resolved and the result is now current.
    Resolved(ScanResult),

    /// Submission failed; the session is idle again in the same mode.
    Failed { kind: FailureKind, message: String },

    /// The user cancelled a running scan.
    Cancelled,
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone)]
pub struct WorkflowStatus {
    pub mode: ScanMode,
    pub state: SessionState,
    pub view: View,
    pub busy: bool,
    pub last_error: Option<String>,
}

/// The selected mode and, in barcode mode, the handle that wakes a running
/// scan. Kept outside the session lock.
struct Selected {
    mode: ScanMode,
    scan_cancel: Option<CancelHandle>,
}

/// Raised for the duration of a submission; lowered on drop.
struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        InFlight { flag: flag.clone() }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn scan_cancel_handle(session: &mut CaptureSession) -> Option<CancelHandle> {
    session
        .as_barcode("cancel scan")
        .ok()
        .map(|scanner| scanner.cancel_handle())
}

// =============================================================================
// Controller
// =============================================================================

pub struct WorkflowController {
    identity: SessionId,
    devices: CaptureDevices,
    settings: CaptureSettings,
    resolver: ResolutionClient,
    results: ResultStore,
    lists: ListLoader,
    session: AsyncMutex<CaptureSession>,
    selected: Mutex<Selected>,
    view: Mutex<View>,
    last_error: Mutex<Option<String>>,
    in_flight: Arc<AtomicBool>,
}

impl WorkflowController {
    /// Creates a controller with an idle session in the configured default
    /// mode.
    pub fn new(
        identity: SessionId,
        devices: CaptureDevices,
        settings: CaptureSettings,
        resolver: ResolutionClient,
        results: ResultStore,
        lists: ListLoader,
    ) -> Self {
        let mode = if settings.is_mode_enabled(settings.default_mode) {
            settings.default_mode
        } else {
            warn!(mode = %settings.default_mode, "Default mode is disabled, using barcode");
            ScanMode::Barcode
        };

        let mut session = CaptureSession::new(mode, &devices);
        let scan_cancel = scan_cancel_handle(&mut session);

        WorkflowController {
            identity,
            devices,
            settings,
            resolver,
            results,
            lists,
            session: AsyncMutex::new(session),
            selected: Mutex::new(Selected { mode, scan_cancel }),
            view: Mutex::new(View::Scan),
            last_error: Mutex::new(None),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn identity(&self) -> &SessionId {
        &self.identity
    }

    pub fn view(&self) -> View {
        *lock(&self.view)
    }

    /// True while a submission is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The message of the last failed submission, cleared by a success.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    /// Wakes a running barcode scan from outside the controller
    /// (e.g. a Ctrl-C handler).
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        lock(&self.selected).scan_cancel.clone()
    }

    pub fn mode(&self) -> ScanMode {
        lock(&self.selected).mode
    }

    pub async fn status(&self) -> WorkflowStatus {
        let session = self.session.lock().await;
        WorkflowStatus {
            mode: session.mode(),
            state: session.state(),
            view: self.view(),
            busy: self.is_busy(),
            last_error: self.last_error(),
        }
    }

    // =========================================================================
    // Mode Selection
    // =========================================================================

    /// Switches capture mode. The previous session is torn down, releasing
    /// its device, before the new session exists. Selecting the current
    /// mode keeps its session.
    pub async fn select_mode(&self, mode: ScanMode) -> WorkflowResult<()> {
        self.ensure_not_busy()?;
        if !self.settings.is_mode_enabled(mode) {
            warn!(mode = %mode, "Rejected disabled scan mode");
            return Err(WorkflowError::ModeDisabled(mode));
        }
        self.set_view(View::Scan);
        if self.mode() == mode {
            return Ok(());
        }

        self.wake_scan();
        let mut session = self.session.lock().await;
        let previous = session.mode();

        session.reset();
        *session = CaptureSession::new(mode, &self.devices);
        *lock(&self.selected) = Selected {
            mode,
            scan_cancel: scan_cancel_handle(&mut session),
        };

        info!(from = %previous, to = %mode, "Scan mode selected");
        Ok(())
    }

    // =========================================================================
    // Capture Operations
    // =========================================================================

    /// Starts the current session (opens the camera in camera and barcode
    /// modes).
    pub async fn start(&self) -> WorkflowResult<SessionState> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.start().await?;
        Ok(session.state())
    }

    /// Camera mode: grabs a still for preview and releases the camera.
    pub async fn capture_still(&self) -> WorkflowResult<Option<ImageBlob>> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        let camera = session.as_camera("capture")?;
        camera.capture().await?;
        Ok(camera.preview().cloned())
    }

    /// Camera mode: discards the preview and reopens the camera.
    pub async fn retake(&self) -> WorkflowResult<()> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_camera("retake")?.retake().await?;
        Ok(())
    }

    /// Camera mode: accepts the preview and submits it.
    pub async fn confirm(&self) -> WorkflowResult<ScanOutcome> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_camera("confirm")?.confirm()?;
        Ok(self.settle(&mut session).await)
    }

    /// Barcode mode: starts the scanner if needed, reads frames until a
    /// product barcode is decoded, and submits it.
    pub async fn scan_barcode(&self) -> WorkflowResult<ScanOutcome> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_barcode("scan")?;
        let started = if session.state() == SessionState::Idle {
            session.start().await
        } else {
            Ok(())
        };

        let scanned = match started {
            Ok(()) => session.as_barcode("scan")?.scan().await.map(drop),
            Err(e) => Err(e),
        };

        match scanned {
            Ok(()) => Ok(self.settle(&mut session).await),
            Err(CaptureError::Cancelled) => {
                session.reset();
                Ok(ScanOutcome::Cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Manual mode: validates typed digits and submits them. Invalid input
    /// is rejected locally and the entry stays open.
    pub async fn enter_barcode(&self, text: &str) -> WorkflowResult<ScanOutcome> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_manual("enter barcode")?;
        if session.state() == SessionState::Idle {
            session.start().await?;
        }

        session.as_manual("enter barcode")?.submit(text)?;
        Ok(self.settle(&mut session).await)
    }

    /// Photo mode: selects the image to analyze.
    pub async fn choose_photo(&self, image: ImageBlob) -> WorkflowResult<()> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_photo("choose photo")?;
        if session.state() == SessionState::Idle {
            session.start().await?;
        }

        session.as_photo("choose photo")?.choose(image)?;
        Ok(())
    }

    /// Photo mode: drops the chosen image.
    pub async fn clear_photo(&self) -> WorkflowResult<()> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_photo("clear photo")?.clear()?;
        Ok(())
    }

    /// Photo mode: submits the chosen image.
    pub async fn analyze(&self) -> WorkflowResult<ScanOutcome> {
        self.ensure_not_busy()?;
        let mut session = self.session.lock().await;
        session.as_photo("analyze photo")?.analyze()?;
        Ok(self.settle(&mut session).await)
    }

    /// Abandons the current capture and returns to idle. No-op when idle.
    pub async fn cancel(&self) -> WorkflowResult<()> {
        self.ensure_not_busy()?;
        self.wake_scan();
        let mut session = self.session.lock().await;
        if session.state() == SessionState::Active {
            session.cancel()?;
        }
        session.reset();
        debug!(mode = %session.mode(), "Capture cancelled");
        Ok(())
    }

    // =========================================================================
    // Results & Lists
    // =========================================================================

    /// The current result. With nothing resolved yet the view falls back
    /// to scanning.
    pub fn open_result(&self) -> Option<ScanResult> {
        match self.results.load() {
            Some(result) => {
                self.set_view(View::Result);
                Some(result)
            }
            None => {
                debug!("No current result, redirecting to scan");
                self.set_view(View::Scan);
                None
            }
        }
    }

    pub async fn open_history(&self) -> Vec<HistoryEntry> {
        self.set_view(View::History);
        self.lists.load_history(&self.identity).await
    }

    pub async fn open_favorites(&self) -> Vec<FavoriteEntry> {
        self.set_view(View::Favorites);
        self.lists.load_favorites(&self.identity).await
    }

    /// Makes a list entry the current result and opens it.
    pub fn view_entry(&self, entry: ScanResult) -> ScanResult {
        let entry = entry.normalized();
        self.results.save(&entry);
        self.set_view(View::Result);
        entry
    }

    /// Toggles the bookmark of the current result and returns it with the
    /// confirmed state.
    pub async fn toggle_bookmark(&self) -> WorkflowResult<ScanResult> {
        let current = self.results.load().ok_or(WorkflowError::NoResult)?;
        let bookmarked = self
            .results
            .toggle_bookmark(&self.identity, current.product_id())
            .await?;

        Ok(self.results.load().unwrap_or(ScanResult {
            is_bookmarked: bookmarked,
            ..current
        }))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_not_busy(&self) -> WorkflowResult<()> {
        if self.is_busy() {
            debug!("Rejected operation while a submission is in flight");
            return Err(WorkflowError::Busy);
        }
        Ok(())
    }

    fn set_view(&self, view: View) {
        *lock(&self.view) = view;
    }

    fn wake_scan(&self) {
        if let Some(handle) = lock(&self.selected).scan_cancel.as_ref() {
            handle.cancel();
        }
    }

    /// Submits the artifact of a resolved session and returns the session
    /// to idle.
    async fn settle(&self, session: &mut CaptureSession) -> ScanOutcome {
        let Some(artifact) = session.take_artifact() else {
            return ScanOutcome::Pending(session.state());
        };

        let _in_flight = InFlight::raise(&self.in_flight);
        let kind = artifact.kind();

        let outcome = match self.resolver.submit(&artifact, &self.identity).await {
            Ok(result) => {
                self.results.save(&result);
                self.set_view(View::Result);
                *lock(&self.last_error) = None;
                ScanOutcome::Resolved(result)
            }
            Err(e) => {
                let message = ResolutionClient::failure_message(kind, &e);
                warn!(mode = %session.mode(), error = %e, "Submission failed, session back to idle");
                *lock(&self.last_error) = Some(message.clone());
                ScanOutcome::Failed {
                    kind: e.kind(),
                    message,
                }
            }
        };

        session.reset();
        outcome
    }
}

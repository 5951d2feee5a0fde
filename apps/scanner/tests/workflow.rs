//! Workflow controller tests against a recording in-process backend.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ingrid_capture::mock::{MockCamera, ScriptedDecoder};
use ingrid_capture::{BarcodeDecoder, CaptureDevices, CaptureError, Frame, SessionState};
use ingrid_client::{
    BookmarkToggle, ClientConfig, ClientError, ClientResult, FailureKind, ScanBackend,
    BARCODE_FAILURE_MESSAGE,
};
use ingrid_core::{
    Barcode, FavoriteEntry, HistoryEntry, ImageBlob, ProductRecord, Rating, ScanMode, ScanResult,
    SessionId, ValidationError,
};
use ingrid_scanner::devices::TextDecoder;
use ingrid_scanner::{AppState, ScanOutcome, View, WorkflowError};
use tokio::sync::Notify;
use tokio::time::timeout;

// =============================================================================
// Recording Backend
// =============================================================================

#[derive(Clone)]
enum Failure {
    Unreachable,
    Detail(&'static str),
}

#[derive(Default)]
struct RecordingBackend {
    barcodes: Mutex<Vec<String>>,
    photos: Mutex<Vec<String>>,
    sessions: Mutex<Vec<String>>,
    bookmarked: Mutex<HashSet<String>>,
    failure: Mutex<Option<Failure>>,
    toggle_fails: AtomicBool,
    gate: Option<Arc<Notify>>,
}

impl RecordingBackend {
    fn gated(gate: Arc<Notify>) -> Self {
        RecordingBackend {
            gate: Some(gate),
            ..Default::default()
        }
    }

    fn fail_with(&self, failure: Failure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    fn barcodes(&self) -> Vec<String> {
        self.barcodes.lock().unwrap().clone()
    }

    fn photos(&self) -> Vec<String> {
        self.photos.lock().unwrap().clone()
    }

    async fn respond(&self, id: String, name: &str) -> ClientResult<ScanResult> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.failure.lock().unwrap().clone() {
            Some(Failure::Unreachable) => Err(ClientError::Network("connection refused".into())),
            Some(Failure::Detail(detail)) => Err(ClientError::Rejected {
                status: 404,
                detail: Some(detail.into()),
            }),
            None => {
                let ingredients = vec!["hazelnuts".into(), "cocoa".into(), "sugar".into()];
                Ok(ScanResult::new(ProductRecord::new(id, name, ingredients), false))
            }
        }
    }

    fn entry(id: &str, bookmarked: bool) -> ScanResult {
        ScanResult::new(ProductRecord::new(id, "Saved", vec!["a".into()]), bookmarked)
    }
}

#[async_trait]
impl ScanBackend for RecordingBackend {
    async fn scan_barcode(&self, barcode: &Barcode, session: &SessionId) -> ClientResult<ScanResult> {
        self.barcodes.lock().unwrap().push(barcode.as_str().to_string());
        self.sessions.lock().unwrap().push(session.as_str().to_string());
        self.respond(format!("p-{barcode}"), "Hazelnut Spread").await
    }

    async fn scan_photo(&self, image: &ImageBlob, session: &SessionId) -> ClientResult<ScanResult> {
        self.photos.lock().unwrap().push(image.file_name().to_string());
        self.sessions.lock().unwrap().push(session.as_str().to_string());
        self.respond("label-1".into(), "Label Scan").await
    }

    async fn toggle_bookmark(
        &self,
        _session: &SessionId,
        product_id: &str,
    ) -> ClientResult<BookmarkToggle> {
        if self.toggle_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 503,
                detail: None,
            });
        }
        let mut bookmarked = self.bookmarked.lock().unwrap();
        let now = if bookmarked.remove(product_id) {
            false
        } else {
            bookmarked.insert(product_id.to_string());
            true
        };
        Ok(BookmarkToggle {
            bookmarked: now,
            message: None,
        })
    }

    async fn history(&self, _session: &SessionId) -> ClientResult<Vec<HistoryEntry>> {
        Ok(vec![Self::entry("h1", false), Self::entry("h2", true)])
    }

    async fn bookmarks(&self, _session: &SessionId) -> ClientResult<Vec<FavoriteEntry>> {
        let bookmarked = self.bookmarked.lock().unwrap();
        Ok(bookmarked.iter().map(|id| Self::entry(id, true)).collect())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.storage.persist = false;
    config
}

fn app_with(
    config: ClientConfig,
    camera: Arc<MockCamera>,
    decoder: Arc<dyn BarcodeDecoder>,
    backend: Arc<RecordingBackend>,
) -> AppState {
    let devices = CaptureDevices::new(camera, decoder, config.device_timeout());
    AppState::with_backend(config, devices, backend)
}

fn app(backend: Arc<RecordingBackend>) -> AppState {
    app_with(
        config(),
        Arc::new(MockCamera::new()),
        Arc::new(ScriptedDecoder::empty()),
        backend,
    )
}

async fn manual(app: &AppState) {
    app.workflow.select_mode(ScanMode::Manual).await.unwrap();
}

// =============================================================================
// Mode Selection
// =============================================================================

#[tokio::test]
async fn mode_switch_releases_camera_before_next_acquire() {
    let camera = Arc::new(MockCamera::new());
    let app = app_with(
        config(),
        camera.clone(),
        Arc::new(ScriptedDecoder::empty()),
        Arc::new(RecordingBackend::default()),
    );

    app.workflow.select_mode(ScanMode::Camera).await.unwrap();
    app.workflow.start().await.unwrap();
    assert_eq!(camera.live_handles(), 1);

    app.workflow.select_mode(ScanMode::Barcode).await.unwrap();
    assert_eq!(camera.live_handles(), 0);

    app.workflow.start().await.unwrap();
    assert_eq!(camera.live_handles(), 1);
    assert_eq!(camera.max_live_handles(), 1);
    assert_eq!(camera.open_count(), 2);
}

#[tokio::test]
async fn disabled_manual_mode_is_rejected() {
    let mut config = config();
    config.capture.manual_entry_enabled = false;
    let app = app_with(
        config,
        Arc::new(MockCamera::new()),
        Arc::new(ScriptedDecoder::empty()),
        Arc::new(RecordingBackend::default()),
    );

    let err = app.workflow.select_mode(ScanMode::Manual).await.unwrap_err();
    assert!(matches!(err, WorkflowError::ModeDisabled(ScanMode::Manual)));
    assert_eq!(app.workflow.mode(), ScanMode::Barcode);
}

#[tokio::test]
async fn operations_of_other_modes_are_unsupported() {
    let backend = Arc::new(RecordingBackend::default());
    let app = app(backend.clone());
    manual(&app).await;

    let err = app.workflow.capture_still().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Capture(CaptureError::Unsupported {
            mode: ScanMode::Manual,
            ..
        })
    ));
}

// =============================================================================
// Manual Entry
// =============================================================================

#[tokio::test]
async fn manual_entry_submits_the_literal_value_once() {
    let backend = Arc::new(RecordingBackend::default());
    let app = app(backend.clone());
    manual(&app).await;

    let outcome = app.workflow.enter_barcode("3017620422003").await.unwrap();

    let result = match outcome {
        ScanOutcome::Resolved(result) => result,
        other => panic!("expected a resolved scan, got {other:?}"),
    };
    assert_eq!(result.product.id, "p-3017620422003");
    assert_eq!(result.product.rating, Rating::Green);
    assert_eq!(backend.barcodes(), vec!["3017620422003".to_string()]);
    assert_eq!(
        backend.sessions.lock().unwrap().as_slice(),
        &[app.workflow.identity().as_str().to_string()]
    );
    assert_eq!(app.workflow.view(), View::Result);

    let status = app.workflow.status().await;
    assert_eq!(status.state, SessionState::Idle);
    assert_eq!(status.mode, ScanMode::Manual);
}

#[tokio::test]
async fn blank_manual_entry_never_submits() {
    let backend = Arc::new(RecordingBackend::default());
    let app = app(backend.clone());
    manual(&app).await;

    let err = app.workflow.enter_barcode("   ").await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Capture(CaptureError::Validation(ValidationError::Required { .. }))
    ));

    let err = app.workflow.enter_barcode("12ab").await.unwrap_err();
    assert!(matches!(err, WorkflowError::Capture(CaptureError::Validation(_))));

    assert!(backend.barcodes().is_empty());
    assert_eq!(app.workflow.status().await.state, SessionState::Active);
    assert_eq!(app.workflow.view(), View::Scan);
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn capture_operations_are_busy_while_a_submission_is_outstanding() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(RecordingBackend::gated(gate.clone()));
    let app = app(backend.clone());
    manual(&app).await;

    let workflow = &app.workflow;
    let (outcome, ()) = tokio::join!(workflow.enter_barcode("3017620422003"), async {
        while !workflow.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            workflow.enter_barcode("0000000000000").await,
            Err(WorkflowError::Busy)
        ));
        assert!(matches!(
            workflow.select_mode(ScanMode::Photo).await,
            Err(WorkflowError::Busy)
        ));
        assert!(matches!(workflow.cancel().await, Err(WorkflowError::Busy)));
        gate.notify_one();
    });

    assert!(matches!(outcome.unwrap(), ScanOutcome::Resolved(_)));
    assert!(!workflow.is_busy());
    assert_eq!(backend.barcodes(), vec!["3017620422003".to_string()]);
}

#[tokio::test]
async fn failed_submission_returns_to_idle_with_fallback_message() {
    let backend = Arc::new(RecordingBackend::default());
    backend.fail_with(Failure::Unreachable);
    let app = app(backend.clone());
    manual(&app).await;

    let outcome = app.workflow.enter_barcode("3017620422003").await.unwrap();
    let (kind, message) = match outcome {
        ScanOutcome::Failed { kind, message } => (kind, message),
        other => panic!("expected a failed scan, got {other:?}"),
    };
    assert_eq!(kind, FailureKind::Network);
    assert_eq!(message, BARCODE_FAILURE_MESSAGE);
    assert_eq!(app.workflow.last_error().as_deref(), Some(BARCODE_FAILURE_MESSAGE));

    let status = app.workflow.status().await;
    assert_eq!(status.state, SessionState::Idle);
    assert_eq!(status.mode, ScanMode::Manual);
    assert!(app.workflow.open_result().is_none());

    backend.fail_with(Failure::Detail("Product not found"));
    let outcome = app.workflow.enter_barcode("3017620422003").await.unwrap();
    assert!(matches!(
        outcome,
        ScanOutcome::Failed { kind: FailureKind::Rejected, ref message } if message == "Product not found"
    ));
}

#[tokio::test]
async fn open_result_redirects_to_scan_when_empty() {
    let app = app(Arc::new(RecordingBackend::default()));
    app.workflow.open_history().await;
    assert_eq!(app.workflow.view(), View::History);

    assert!(app.workflow.open_result().is_none());
    assert_eq!(app.workflow.view(), View::Scan);
}

// =============================================================================
// Camera, Barcode & Photo Modes
// =============================================================================

#[tokio::test]
async fn barcode_scan_skips_noise_and_releases_camera() {
    let camera = Arc::new(
        MockCamera::new()
            .with_frames(vec![
                Frame::text("hello"),
                Frame::text("123"),
                Frame::text("0000000000000"),
            ])
            .finite(),
    );
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(config(), camera.clone(), Arc::new(TextDecoder), backend.clone());

    let outcome = app.workflow.scan_barcode().await.unwrap();

    assert!(matches!(outcome, ScanOutcome::Resolved(_)));
    assert_eq!(backend.barcodes(), vec!["0000000000000".to_string()]);
    assert_eq!(camera.live_handles(), 0);
    assert_eq!(app.workflow.open_result().unwrap().product.id, "p-0000000000000");
}

#[tokio::test]
async fn cancel_wakes_a_running_scan() {
    let camera = Arc::new(MockCamera::new());
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(
        config(),
        camera.clone(),
        Arc::new(ScriptedDecoder::empty()),
        backend.clone(),
    );

    let workflow = &app.workflow;
    let (outcome, ()) = tokio::join!(workflow.scan_barcode(), async {
        while camera.live_handles() == 0 {
            tokio::task::yield_now().await;
        }
        workflow.cancel().await.unwrap();
    });

    assert!(matches!(outcome.unwrap(), ScanOutcome::Cancelled));
    assert_eq!(camera.live_handles(), 0);
    assert!(backend.barcodes().is_empty());
    assert_eq!(workflow.status().await.state, SessionState::Idle);
}

const SETTLE: Duration = Duration::from_secs(2);

fn late_barcode_decoder() -> Arc<ScriptedDecoder> {
    let mut script = vec![None; 50];
    script.push(Some("3017620422003"));
    Arc::new(ScriptedDecoder::new(script))
}

#[tokio::test]
async fn cancel_while_camera_is_opening_ends_the_scan() {
    let camera = Arc::new(MockCamera::new().hanging());
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(
        config(),
        camera.clone(),
        Arc::new(ScriptedDecoder::empty()),
        backend.clone(),
    );

    let workflow = &app.workflow;
    let joined = timeout(SETTLE, async {
        tokio::join!(workflow.scan_barcode(), async {
            while camera.open_attempts() == 0 {
                tokio::task::yield_now().await;
            }
            workflow.cancel().await.unwrap();
        })
    })
    .await;

    let (outcome, ()) = joined.expect("scan did not end after cancel");
    assert!(matches!(outcome.unwrap(), ScanOutcome::Cancelled));
    assert_eq!(camera.live_handles(), 0);
    assert!(backend.barcodes().is_empty());
    assert_eq!(workflow.status().await.state, SessionState::Idle);
}

#[tokio::test]
async fn mode_switch_while_camera_is_opening_releases_it() {
    let camera = Arc::new(MockCamera::new().hanging());
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(
        config(),
        camera.clone(),
        Arc::new(ScriptedDecoder::empty()),
        backend.clone(),
    );

    let workflow = &app.workflow;
    let joined = timeout(SETTLE, async {
        tokio::join!(workflow.scan_barcode(), async {
            while camera.open_attempts() == 0 {
                tokio::task::yield_now().await;
            }
            workflow.select_mode(ScanMode::Manual).await.unwrap();
        })
    })
    .await;

    let (outcome, ()) = joined.expect("scan did not end after mode switch");
    assert!(matches!(outcome.unwrap(), ScanOutcome::Cancelled));
    assert_eq!(camera.live_handles(), 0);
    assert!(backend.barcodes().is_empty());

    let status = workflow.status().await;
    assert_eq!(status.mode, ScanMode::Manual);
    assert_eq!(status.state, SessionState::Idle);
}

#[tokio::test]
async fn mode_switch_during_scan_releases_camera_without_submitting() {
    let camera = Arc::new(MockCamera::new());
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(config(), camera.clone(), late_barcode_decoder(), backend.clone());

    let workflow = &app.workflow;
    let joined = timeout(SETTLE, async {
        tokio::join!(workflow.scan_barcode(), async {
            while camera.live_handles() == 0 {
                tokio::task::yield_now().await;
            }
            workflow.select_mode(ScanMode::Manual).await.unwrap();
        })
    })
    .await;

    let (outcome, ()) = joined.expect("scan did not end after mode switch");
    assert!(matches!(outcome.unwrap(), ScanOutcome::Cancelled));
    assert_eq!(camera.live_handles(), 0);
    assert_eq!(camera.max_live_handles(), 1);
    assert!(backend.barcodes().is_empty());
    assert_eq!(workflow.mode(), ScanMode::Manual);
}

#[tokio::test]
async fn camera_capture_confirm_submits_the_still() {
    let camera = Arc::new(MockCamera::new());
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(
        config(),
        camera.clone(),
        Arc::new(ScriptedDecoder::empty()),
        backend.clone(),
    );

    app.workflow.select_mode(ScanMode::Camera).await.unwrap();
    app.workflow.start().await.unwrap();
    let preview = app.workflow.capture_still().await.unwrap().unwrap();
    assert_eq!(preview.file_name(), "captured_image.jpg");
    assert_eq!(camera.live_handles(), 0);

    app.workflow.retake().await.unwrap();
    assert_eq!(camera.live_handles(), 1);
    app.workflow.capture_still().await.unwrap();

    let outcome = app.workflow.confirm().await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Resolved(_)));
    assert_eq!(backend.photos(), vec!["captured_image.jpg".to_string()]);
    assert_eq!(camera.max_live_handles(), 1);
}

#[tokio::test]
async fn captured_png_is_uploaded_under_a_png_name() {
    let camera = Arc::new(
        MockCamera::new().with_still(Frame::new(vec![0x89, b'P', b'N', b'G'], "image/png")),
    );
    let backend = Arc::new(RecordingBackend::default());
    let app = app_with(
        config(),
        camera,
        Arc::new(ScriptedDecoder::empty()),
        backend.clone(),
    );

    app.workflow.select_mode(ScanMode::Camera).await.unwrap();
    app.workflow.start().await.unwrap();
    let preview = app.workflow.capture_still().await.unwrap().unwrap();
    assert_eq!(preview.mime_type(), "image/png");

    app.workflow.confirm().await.unwrap();
    assert_eq!(backend.photos(), vec!["captured_image.png".to_string()]);
}

#[tokio::test]
async fn photo_upload_requires_a_chosen_image() {
    let backend = Arc::new(RecordingBackend::default());
    let app = app(backend.clone());
    app.workflow.select_mode(ScanMode::Photo).await.unwrap();

    let image = ImageBlob::new(vec![0x89, b'P', b'N', b'G'], "image/png", "label.png").unwrap();
    app.workflow.choose_photo(image).await.unwrap();
    app.workflow.clear_photo().await.unwrap();
    assert!(matches!(
        app.workflow.analyze().await,
        Err(WorkflowError::Capture(CaptureError::InvalidState { .. }))
    ));

    let image = ImageBlob::new(vec![0x89, b'P', b'N', b'G'], "image/png", "label.png").unwrap();
    app.workflow.choose_photo(image).await.unwrap();
    let outcome = app.workflow.analyze().await.unwrap();

    assert!(matches!(outcome, ScanOutcome::Resolved(_)));
    assert_eq!(backend.photos(), vec!["label.png".to_string()]);
}

// =============================================================================
// Results & Lists
// =============================================================================

#[tokio::test]
async fn bookmark_toggle_tracks_confirmed_state() {
    let backend = Arc::new(RecordingBackend::default());
    let app = app(backend.clone());
    manual(&app).await;
    app.workflow.enter_barcode("3017620422003").await.unwrap();

    let toggled = app.workflow.toggle_bookmark().await.unwrap();
    assert!(toggled.is_bookmarked);
    assert!(app.workflow.open_result().unwrap().is_bookmarked);

    backend.toggle_fails.store(true, Ordering::SeqCst);
    let err = app.workflow.toggle_bookmark().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Client(ClientError::Rejected { status: 503, .. })));
    assert!(app.workflow.open_result().unwrap().is_bookmarked);

    let favorites = app.workflow.open_favorites().await;
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].product_id(), "p-3017620422003");
    assert_eq!(app.workflow.view(), View::Favorites);
}

#[tokio::test]
async fn bookmark_without_result_fails() {
    let app = app(Arc::new(RecordingBackend::default()));
    assert!(matches!(
        app.workflow.toggle_bookmark().await,
        Err(WorkflowError::NoResult)
    ));
}

#[tokio::test]
async fn history_entry_becomes_current_result() {
    let app = app(Arc::new(RecordingBackend::default()));

    let history = app.workflow.open_history().await;
    assert_eq!(history.len(), 2);

    let opened = app.workflow.view_entry(history[1].clone());
    assert_eq!(opened.product.id, "h2");
    assert_eq!(app.workflow.view(), View::Result);

    let current = app.workflow.open_result().unwrap();
    assert_eq!(current.product.id, "h2");
    assert!(current.is_bookmarked);
}

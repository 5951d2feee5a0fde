//! # Test Doubles
//!
//! Scriptable camera and decoder used by this workspace's tests.
//!
//! [`MockCamera`] counts live stream handles so tests can assert that the
//! camera is released on every exit path and that two handles never
//! coexist.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::device::{BarcodeDecoder, CameraDevice, Frame, VideoStream};
use crate::error::{CaptureResult, DeviceFault};

// =============================================================================
// Mock Camera
// =============================================================================

#[derive(Default)]
struct Counters {
    live: AtomicUsize,
    max_live: AtomicUsize,
    opens: AtomicUsize,
    attempts: AtomicUsize,
}

/// A camera that replays scripted frames.
pub struct MockCamera {
    frames: Vec<Frame>,
    still: Frame,
    endless: bool,
    fault: Option<DeviceFault>,
    hang: bool,
    counters: Arc<Counters>,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCamera {
    /// A working camera that streams blank frames forever.
    pub fn new() -> Self {
        MockCamera {
            frames: Vec::new(),
            still: Frame::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg"),
            endless: true,
            fault: None,
            hang: false,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Frames delivered before the blank ones.
    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = frames;
        self
    }

    /// End the stream after the scripted frames.
    pub fn finite(mut self) -> Self {
        self.endless = false;
        self
    }

    /// Frame returned by `grab_still`.
    pub fn with_still(mut self, still: Frame) -> Self {
        self.still = still;
        self
    }

    /// Every open fails with `fault`.
    pub fn failing(mut self, fault: DeviceFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Every open waits forever.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Streams currently open.
    pub fn live_handles(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Most streams ever open at once.
    pub fn max_live_handles(&self) -> usize {
        self.counters.max_live.load(Ordering::SeqCst)
    }

    /// Opens begun so far, including failed and pending ones.
    pub fn open_attempts(&self) -> usize {
        self.counters.attempts.load(Ordering::SeqCst)
    }

    /// Successful opens so far.
    pub fn open_count(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn open(&self) -> CaptureResult<Box<dyn VideoStream>> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(fault) = &self.fault {
            return Err(fault.clone().into());
        }

        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_live.fetch_max(live, Ordering::SeqCst);
        self.counters.opens.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockStream {
            frames: self.frames.iter().cloned().collect(),
            still: self.still.clone(),
            endless: self.endless,
            counters: self.counters.clone(),
        }))
    }

    fn name(&self) -> &str {
        "mock-camera"
    }
}

struct MockStream {
    frames: VecDeque<Frame>,
    still: Frame,
    endless: bool,
    counters: Arc<Counters>,
}

#[async_trait]
impl VideoStream for MockStream {
    async fn next_frame(&mut self) -> CaptureResult<Option<Frame>> {
        tokio::task::yield_now().await;
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.endless => Ok(Some(Frame::new(Vec::new(), "image/jpeg"))),
            None => Ok(None),
        }
    }

    async fn grab_still(&mut self) -> CaptureResult<Frame> {
        Ok(self.still.clone())
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Scripted Decoder
// =============================================================================

/// Returns scripted results, one per decoded frame, then `None` forever.
#[derive(Default)]
pub struct ScriptedDecoder {
    script: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        ScriptedDecoder {
            script: Mutex::new(script.into_iter().map(|s| s.map(Into::into)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A decoder that never finds a symbol.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BarcodeDecoder for ScriptedDecoder {
    fn decode(&self, _frame: &Frame) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap_or_else(|p| p.into_inner());
        script.pop_front().flatten()
    }
}

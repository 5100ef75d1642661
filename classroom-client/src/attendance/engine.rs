/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! The capture state machine.
//!
//! [`AttendanceEngine`] drives a bounded, timed capture → recognize →
//! verify-liveness → persist sequence. All loop state lives in explicit
//! struct fields rather than closure captures; network I/O and frame capture
//! are injected so the machine runs under plain `cargo test` without a
//! browser.
//!
//! On the browser target the engine arms its own 2-second repeating timer;
//! elsewhere the host (a test, typically) calls [`tick()`](AttendanceEngine::tick)
//! directly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use classroom_types::requests::MarkAttendanceRequest;
use classroom_types::responses::UserSummary;
use classroom_types::{MarkAttendanceResponse, RecognizeResponse};
use futures::future::LocalBoxFuture;
use log::{debug, info, warn};

use crate::constants::{
    CAMERA_RELEASE_DELAY_MS, CAPTURE_INTERVAL_MS, MAX_CAPTURE_ATTEMPTS, RECOGNITION_THRESHOLD,
};
use crate::error::ApiError;

/// Supplies still frames from the live camera preview.
pub trait FrameSource {
    /// One frame as base64 JPEG without the `data:image/jpeg;base64,`
    /// prefix, or `None` when the preview has not delivered a frame yet.
    fn grab_frame(&self) -> Option<String>;
}

/// Submits one frame to the recognition service: `(image, session_id, threshold)`.
pub type RecognizeFn =
    Box<dyn Fn(String, i64, f64) -> LocalBoxFuture<'static, Result<RecognizeResponse, ApiError>>>;

/// Persists one attendance record after a successful recognition.
pub type MarkFn = Box<
    dyn Fn(MarkAttendanceRequest) -> LocalBoxFuture<'static, Result<MarkAttendanceResponse, ApiError>>,
>;

/// Where the capture loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    /// Camera stream acquired, polling not started.
    CameraReady,
    /// Polling is active.
    Scanning,
    Succeeded,
    FailedLiveness,
    FailedNoMatch,
    FailedBackend,
    StoppedByUser,
}

impl CaptureState {
    /// Terminal states exit the loop and give up the timer.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaptureState::Succeeded
                | CaptureState::FailedLiveness
                | CaptureState::FailedNoMatch
                | CaptureState::FailedBackend
                | CaptureState::StoppedByUser
        )
    }
}

/// Progress surfaced to the UI while scanning.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    /// The preview produced no frame this tick.
    Capturing { attempt: u32, max_attempts: u32 },
    /// A frame went out to the recognition service.
    Recognizing { attempt: u32, max_attempts: u32 },
    /// The tick ended without a match; the loop keeps going.
    Searching { attempt: u32, max_attempts: u32 },
    /// A live face matched; attendance is being persisted.
    Recognized { user_id: i64, confidence: f64 },
    /// Attendance is on record.
    Marked,
}

/// Payload of the success callback.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSuccess {
    pub user: Option<UserSummary>,
    pub joined_time: Option<String>,
    pub confidence: f64,
}

/// Terminal failures of the capture loop. Each maps to exactly one
/// user-facing message, distinct per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureFailure {
    /// The liveness check decided the frame is a photo or replay.
    FakeFace,
    /// No match after the full attempt budget.
    AttemptsExhausted { attempts: u32 },
    /// The backend refused or failed to persist the attendance.
    Backend { message: String },
}

impl fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureFailure::FakeFace => {
                write!(f, "Fake face detected. Please use your real face.")
            }
            CaptureFailure::AttemptsExhausted { attempts } => {
                write!(f, "No face recognized after {attempts} attempts. Please try again.")
            }
            CaptureFailure::Backend { message } => write!(f, "{message}"),
        }
    }
}

/// Tuning of one capture run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// The class session being attended.
    pub session_id: i64,
    /// Similarity cutoff forwarded to the recognition service.
    pub threshold: f64,
    /// Polling ticks before giving up.
    pub max_attempts: u32,
    /// Polling period.
    pub interval_ms: u32,
    /// How long the success state stays visible before the camera is released.
    pub release_delay_ms: u32,
}

impl CaptureConfig {
    /// Reference tuning: 2 s ticks, 20 attempts, 0.30 threshold.
    pub fn for_session(session_id: i64) -> Self {
        Self {
            session_id,
            threshold: RECOGNITION_THRESHOLD,
            max_attempts: MAX_CAPTURE_ATTEMPTS,
            interval_ms: CAPTURE_INTERVAL_MS,
            release_delay_ms: CAMERA_RELEASE_DELAY_MS,
        }
    }
}

/// Construction options for [`AttendanceEngine::new`].
pub struct AttendanceEngineOptions {
    pub config: CaptureConfig,

    /// Frame supplier, usually a [`CameraDriver`](crate::CameraDriver).
    pub frames: Box<dyn FrameSource>,

    /// Recognition call; see [`RecognizeFn`].
    pub recognize: RecognizeFn,

    /// Persistence call; see [`MarkFn`].
    pub mark: MarkFn,

    /// Stops the camera tracks. Called once after success, delayed by
    /// `release_delay_ms` so the user sees the success state first.
    pub release_camera: Rc<dyn Fn()>,

    /// Progress updates while scanning.
    pub on_status: Rc<dyn Fn(CaptureStatus)>,

    /// Called exactly once when attendance is on record.
    pub on_success: Rc<dyn Fn(AttendanceSuccess)>,

    /// Called exactly once per failed run. Never fires for a user stop.
    pub on_error: Rc<dyn Fn(CaptureFailure)>,
}

struct EngineInner {
    state: CaptureState,
    attempt_count: u32,
    /// Bumped on every start/stop/reset; async continuations from an older
    /// generation discard their results instead of mutating current state.
    generation: u64,
    /// Serializes ticks: an interval firing while the previous tick's async
    /// work is unresolved is skipped.
    tick_busy: bool,
    #[cfg(target_arch = "wasm32")]
    timer: Option<crate::platform::IntervalHandle>,
}

/// The capture loop. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AttendanceEngine {
    inner: Rc<RefCell<EngineInner>>,
    deps: Rc<AttendanceEngineOptions>,
}

impl AttendanceEngine {
    pub fn new(options: AttendanceEngineOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                state: CaptureState::Idle,
                attempt_count: 0,
                generation: 0,
                tick_busy: false,
                #[cfg(target_arch = "wasm32")]
                timer: None,
            })),
            deps: Rc::new(options),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.inner.borrow().state
    }

    pub fn attempt_count(&self) -> u32 {
        self.inner.borrow().attempt_count
    }

    /// The camera stream is bound to the preview; capture may begin.
    pub fn camera_ready(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == CaptureState::Idle {
            inner.state = CaptureState::CameraReady;
        }
    }

    /// Begin polling. Valid from `CameraReady` and from any terminal state
    /// whose camera is still bound (the user may simply try again).
    pub fn start(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, CaptureState::Idle | CaptureState::Scanning) {
                warn!("start() ignored in state {:?}", inner.state);
                return;
            }
            inner.state = CaptureState::Scanning;
            inner.attempt_count = 0;
            inner.tick_busy = false;
            inner.generation += 1;
        }
        info!(
            "attendance capture started for session {}",
            self.deps.config.session_id
        );
        #[cfg(target_arch = "wasm32")]
        self.arm_timer();
    }

    /// User cancellation: halt polling immediately. No callback fires and
    /// any in-flight tick result is discarded.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != CaptureState::Scanning {
            return;
        }
        inner.state = CaptureState::StoppedByUser;
        inner.generation += 1;
        inner.tick_busy = false;
        Self::clear_timer(&mut inner);
        info!("attendance capture stopped by user");
    }

    /// Back to `Idle` (camera released by the caller). Cancels any polling.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = CaptureState::Idle;
        inner.attempt_count = 0;
        inner.generation += 1;
        inner.tick_busy = false;
        Self::clear_timer(&mut inner);
    }

    #[cfg(target_arch = "wasm32")]
    fn arm_timer(&self) {
        let engine = self.clone();
        let handle =
            crate::platform::IntervalHandle::new(self.deps.config.interval_ms, move || {
                let engine = engine.clone();
                crate::platform::spawn_local(async move {
                    engine.tick().await;
                });
            });
        self.inner.borrow_mut().timer = Some(handle);
    }

    #[cfg(target_arch = "wasm32")]
    fn clear_timer(inner: &mut EngineInner) {
        inner.timer = None;
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn clear_timer(_inner: &mut EngineInner) {}

    fn still_scanning(&self, generation: u64) -> bool {
        let inner = self.inner.borrow();
        inner.state == CaptureState::Scanning && inner.generation == generation
    }

    /// One polling tick. Skipped entirely unless the engine is `Scanning`
    /// and the previous tick has resolved.
    pub async fn tick(&self) {
        let (generation, attempt) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != CaptureState::Scanning || inner.tick_busy {
                return;
            }
            inner.tick_busy = true;
            inner.attempt_count += 1;
            (inner.generation, inner.attempt_count)
        };

        self.run_tick(generation, attempt).await;

        let mut inner = self.inner.borrow_mut();
        if inner.generation == generation {
            inner.tick_busy = false;
        }
    }

    async fn run_tick(&self, generation: u64, attempt: u32) {
        let config = self.deps.config;
        let max_attempts = config.max_attempts;

        let Some(frame) = self.deps.frames.grab_frame() else {
            if attempt >= max_attempts {
                self.fail(CaptureFailure::AttemptsExhausted { attempts: attempt });
            } else {
                (self.deps.on_status)(CaptureStatus::Capturing {
                    attempt,
                    max_attempts,
                });
            }
            return;
        };

        (self.deps.on_status)(CaptureStatus::Recognizing {
            attempt,
            max_attempts,
        });

        let recognition =
            (self.deps.recognize)(frame, config.session_id, config.threshold).await;
        if !self.still_scanning(generation) {
            debug!("discarding recognition result from a cancelled tick");
            return;
        }

        let recognition = match recognition {
            Ok(recognition) => recognition,
            Err(err) => {
                // A flaky network tick is a no-match, not an abort.
                debug!("recognition call failed: {err}");
                self.no_match(attempt, max_attempts);
                return;
            }
        };

        if !recognition.is_match() {
            self.no_match(attempt, max_attempts);
            return;
        }

        if recognition.liveness_failed() {
            warn!("liveness check rejected the frame");
            self.fail(CaptureFailure::FakeFace);
            return;
        }

        let (Some(user_id), Some(confidence), Some(distance)) = (
            recognition.user_id,
            recognition.confidence,
            recognition.distance,
        ) else {
            // Matched but incomplete payload; do not persist garbage.
            warn!("recognition match missing user_id/confidence/distance");
            self.no_match(attempt, max_attempts);
            return;
        };

        (self.deps.on_status)(CaptureStatus::Recognized {
            user_id,
            confidence,
        });
        info!("face recognized: user {user_id} at {confidence:.1}%");

        // Persistence happens at most once per run: the loop halts on this
        // call's outcome, success or not.
        let request = MarkAttendanceRequest {
            session_id: config.session_id,
            user_id,
            confidence,
            distance,
        };
        let marked = (self.deps.mark)(request).await;
        if !self.still_scanning(generation) {
            debug!("discarding mark result from a cancelled tick");
            return;
        }

        match marked {
            Ok(marked) if marked.success => {
                self.transition(CaptureState::Succeeded);
                (self.deps.on_status)(CaptureStatus::Marked);
                (self.deps.on_success)(AttendanceSuccess {
                    user: marked.user,
                    joined_time: marked.joined_time,
                    confidence,
                });
                self.schedule_camera_release();
            }
            Ok(marked) => {
                let message = marked
                    .error
                    .unwrap_or_else(|| "Could not mark attendance".to_string());
                self.fail(CaptureFailure::Backend { message });
            }
            Err(err) => {
                self.fail(CaptureFailure::Backend {
                    message: err.to_string(),
                });
            }
        }
    }

    fn no_match(&self, attempt: u32, max_attempts: u32) {
        if attempt >= max_attempts {
            self.fail(CaptureFailure::AttemptsExhausted { attempts: attempt });
        } else {
            (self.deps.on_status)(CaptureStatus::Searching {
                attempt,
                max_attempts,
            });
        }
    }

    fn fail(&self, failure: CaptureFailure) {
        let state = match &failure {
            CaptureFailure::FakeFace => CaptureState::FailedLiveness,
            CaptureFailure::AttemptsExhausted { .. } => CaptureState::FailedNoMatch,
            CaptureFailure::Backend { .. } => CaptureState::FailedBackend,
        };
        self.transition(state);
        (self.deps.on_error)(failure);
    }

    fn transition(&self, state: CaptureState) {
        let mut inner = self.inner.borrow_mut();
        debug!("capture state {:?} -> {:?}", inner.state, state);
        inner.state = state;
        if state.is_terminal() {
            Self::clear_timer(&mut inner);
        }
    }

    fn schedule_camera_release(&self) {
        let release = Rc::clone(&self.deps.release_camera);
        #[cfg(target_arch = "wasm32")]
        crate::platform::delay(self.deps.config.release_delay_ms, move || release());
        #[cfg(not(target_arch = "wasm32"))]
        release();
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::Cell;
    use std::collections::VecDeque;

    struct StaticFrames(Option<String>);

    impl FrameSource for StaticFrames {
        fn grab_frame(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn no_match_response() -> RecognizeResponse {
        serde_json::from_str(r#"{ "success": true, "recognized": false }"#).unwrap()
    }

    fn match_response(is_real: bool) -> RecognizeResponse {
        serde_json::from_str(&format!(
            r#"{{
                "success": true, "recognized": true, "user_id": 42,
                "confidence": 91.2, "distance": 0.18, "is_real": {is_real}
            }}"#
        ))
        .unwrap()
    }

    fn marked_ok() -> MarkAttendanceResponse {
        serde_json::from_str(
            r#"{
                "success": true,
                "user": { "id": 42, "username": "alice", "email": "alice@uni.edu", "role": "student" },
                "joined_time": "2025-01-01T10:00:00Z"
            }"#,
        )
        .unwrap()
    }

    fn marked_rejected(message: &str) -> MarkAttendanceResponse {
        serde_json::from_str(&format!(
            r#"{{ "success": false, "error": "{message}" }}"#
        ))
        .unwrap()
    }

    /// Everything the harness observes about one engine under test.
    struct Harness {
        engine: AttendanceEngine,
        recognize_calls: Rc<Cell<u32>>,
        mark_calls: Rc<Cell<u32>>,
        successes: Rc<RefCell<Vec<AttendanceSuccess>>>,
        failures: Rc<RefCell<Vec<CaptureFailure>>>,
        releases: Rc<Cell<u32>>,
    }

    fn harness(
        recognitions: VecDeque<Result<RecognizeResponse, ApiError>>,
        mark_result: Result<MarkAttendanceResponse, ApiError>,
    ) -> Harness {
        let recognize_calls = Rc::new(Cell::new(0));
        let mark_calls = Rc::new(Cell::new(0));
        let successes = Rc::new(RefCell::new(Vec::new()));
        let failures = Rc::new(RefCell::new(Vec::new()));
        let releases = Rc::new(Cell::new(0));

        let queue = Rc::new(RefCell::new(recognitions));
        let recognize_count = recognize_calls.clone();
        let recognize: RecognizeFn = Box::new(move |_frame, _session, _threshold| {
            recognize_count.set(recognize_count.get() + 1);
            let next = queue
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(no_match_response()));
            async move { next }.boxed_local()
        });

        let mark_result = Rc::new(RefCell::new(Some(mark_result)));
        let mark_count = mark_calls.clone();
        let mark: MarkFn = Box::new(move |_request| {
            mark_count.set(mark_count.get() + 1);
            let result = mark_result
                .borrow_mut()
                .take()
                .expect("persistence called more than once");
            async move { result }.boxed_local()
        });

        let success_log = successes.clone();
        let failure_log = failures.clone();
        let release_count = releases.clone();

        let engine = AttendanceEngine::new(AttendanceEngineOptions {
            config: CaptureConfig::for_session(7),
            frames: Box::new(StaticFrames(Some("ZnJhbWU=".to_string()))),
            recognize,
            mark,
            release_camera: Rc::new(move || release_count.set(release_count.get() + 1)),
            on_status: Rc::new(|_| {}),
            on_success: Rc::new(move |s| success_log.borrow_mut().push(s)),
            on_error: Rc::new(move |f| failure_log.borrow_mut().push(f)),
        });

        Harness {
            engine,
            recognize_calls,
            mark_calls,
            successes,
            failures,
            releases,
        }
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            body: "unreachable".to_string(),
        }
    }

    #[tokio::test]
    async fn exhausts_attempts_then_fails_no_match() {
        let h = harness(VecDeque::new(), Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();

        // A few extra ticks past the budget must be inert.
        for _ in 0..25 {
            h.engine.tick().await;
        }

        assert_eq!(h.engine.state(), CaptureState::FailedNoMatch);
        assert_eq!(h.engine.attempt_count(), 20);
        assert_eq!(h.recognize_calls.get(), 20);
        assert_eq!(h.mark_calls.get(), 0);
        assert_eq!(
            *h.failures.borrow(),
            [CaptureFailure::AttemptsExhausted { attempts: 20 }]
        );
        assert!(h.successes.borrow().is_empty());
    }

    #[tokio::test]
    async fn spoofed_face_short_circuits_before_persistence() {
        let mut queue = VecDeque::new();
        queue.push_back(Ok(no_match_response()));
        queue.push_back(Ok(no_match_response()));
        queue.push_back(Ok(match_response(false)));

        let h = harness(queue, Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();

        for _ in 0..5 {
            h.engine.tick().await;
        }

        assert_eq!(h.engine.state(), CaptureState::FailedLiveness);
        assert_eq!(h.engine.attempt_count(), 3);
        assert_eq!(h.mark_calls.get(), 0);
        assert_eq!(*h.failures.borrow(), [CaptureFailure::FakeFace]);
    }

    #[tokio::test]
    async fn live_match_persists_once_and_succeeds() {
        let mut queue = VecDeque::new();
        queue.push_back(Ok(match_response(true)));

        let h = harness(queue, Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();

        for _ in 0..3 {
            h.engine.tick().await;
        }

        assert_eq!(h.engine.state(), CaptureState::Succeeded);
        assert_eq!(h.recognize_calls.get(), 1);
        assert_eq!(h.mark_calls.get(), 1);
        assert_eq!(h.releases.get(), 1);

        let successes = h.successes.borrow();
        assert_eq!(successes.len(), 1);
        assert_eq!(successes[0].confidence, 91.2);
        assert_eq!(successes[0].joined_time.as_deref(), Some("2025-01-01T10:00:00Z"));
        assert_eq!(successes[0].user.as_ref().map(|u| u.id), Some(42));
        assert!(h.failures.borrow().is_empty());
    }

    #[tokio::test]
    async fn backend_rejection_fails_after_single_persistence_call() {
        let mut queue = VecDeque::new();
        queue.push_back(Ok(match_response(true)));

        let h = harness(queue, Ok(marked_rejected("Already marked")));
        h.engine.camera_ready();
        h.engine.start();

        for _ in 0..3 {
            h.engine.tick().await;
        }

        assert_eq!(h.engine.state(), CaptureState::FailedBackend);
        assert_eq!(h.mark_calls.get(), 1);
        assert_eq!(
            *h.failures.borrow(),
            [CaptureFailure::Backend {
                message: "Already marked".to_string()
            }]
        );
        assert!(h.successes.borrow().is_empty());
    }

    #[tokio::test]
    async fn transient_recognition_failure_counts_as_no_match() {
        let mut queue = VecDeque::new();
        queue.push_back(Err(server_error()));
        queue.push_back(Ok(match_response(true)));

        let h = harness(queue, Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();

        h.engine.tick().await;
        assert_eq!(h.engine.state(), CaptureState::Scanning);

        h.engine.tick().await;
        assert_eq!(h.engine.state(), CaptureState::Succeeded);
        assert_eq!(h.recognize_calls.get(), 2);
    }

    #[tokio::test]
    async fn stop_halts_polling_without_callbacks() {
        let mut queue = VecDeque::new();
        queue.push_back(Ok(no_match_response()));

        let h = harness(queue, Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();

        h.engine.tick().await;
        h.engine.stop();
        assert_eq!(h.engine.state(), CaptureState::StoppedByUser);

        // No tick may do anything after cancellation.
        h.engine.tick().await;
        h.engine.tick().await;

        assert_eq!(h.recognize_calls.get(), 1);
        assert_eq!(h.engine.attempt_count(), 1);
        assert!(h.successes.borrow().is_empty());
        assert!(h.failures.borrow().is_empty());
    }

    #[tokio::test]
    async fn overlapping_tick_is_skipped_while_previous_is_unresolved() {
        use futures::channel::oneshot;

        let recognize_calls = Rc::new(Cell::new(0));
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let gate_rx = Rc::new(RefCell::new(Some(gate_rx)));

        let recognize_count = recognize_calls.clone();
        let recognize: RecognizeFn = Box::new(move |_frame, _session, _threshold| {
            recognize_count.set(recognize_count.get() + 1);
            let gate = gate_rx.borrow_mut().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(no_match_response())
            }
            .boxed_local()
        });

        let mark: MarkFn = Box::new(|_| async { Ok(marked_ok()) }.boxed_local());
        let engine = AttendanceEngine::new(AttendanceEngineOptions {
            config: CaptureConfig::for_session(7),
            frames: Box::new(StaticFrames(Some("ZnJhbWU=".to_string()))),
            recognize,
            mark,
            release_camera: Rc::new(|| {}),
            on_status: Rc::new(|_| {}),
            on_success: Rc::new(|_| {}),
            on_error: Rc::new(|_| {}),
        });

        engine.camera_ready();
        engine.start();

        let slow_tick = engine.tick();
        let second = async {
            tokio::task::yield_now().await;
            // Fires while the first tick awaits recognition: must be skipped.
            engine.tick().await;
            gate_tx.send(()).unwrap();
        };
        futures::join!(slow_tick, second);

        assert_eq!(recognize_calls.get(), 1);
        assert_eq!(engine.attempt_count(), 1);
        assert_eq!(engine.state(), CaptureState::Scanning);
    }

    #[tokio::test]
    async fn late_result_after_stop_is_discarded() {
        use futures::channel::oneshot;

        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let gate_rx = Rc::new(RefCell::new(Some(gate_rx)));
        let mark_calls = Rc::new(Cell::new(0));

        let recognize: RecognizeFn = Box::new(move |_frame, _session, _threshold| {
            let gate = gate_rx.borrow_mut().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(match_response(true))
            }
            .boxed_local()
        });
        let mark_count = mark_calls.clone();
        let mark: MarkFn = Box::new(move |_| {
            mark_count.set(mark_count.get() + 1);
            async { Ok(marked_ok()) }.boxed_local()
        });

        let failures = Rc::new(RefCell::new(Vec::new()));
        let failure_log = failures.clone();
        let engine = AttendanceEngine::new(AttendanceEngineOptions {
            config: CaptureConfig::for_session(7),
            frames: Box::new(StaticFrames(Some("ZnJhbWU=".to_string()))),
            recognize,
            mark,
            release_camera: Rc::new(|| {}),
            on_status: Rc::new(|_| {}),
            on_success: Rc::new(|_| {}),
            on_error: Rc::new(move |f| failure_log.borrow_mut().push(f)),
        });

        engine.camera_ready();
        engine.start();

        let slow_tick = engine.tick();
        let cancel = async {
            tokio::task::yield_now().await;
            engine.stop();
            // The recognition resolves *after* the user stopped.
            gate_tx.send(()).unwrap();
        };
        futures::join!(slow_tick, cancel);

        assert_eq!(engine.state(), CaptureState::StoppedByUser);
        assert_eq!(mark_calls.get(), 0);
        assert!(failures.borrow().is_empty());
    }

    #[tokio::test]
    async fn missing_frames_count_against_the_attempt_budget() {
        let recognize: RecognizeFn =
            Box::new(|_, _, _| async { panic!("no frame, no recognition call") }.boxed_local());
        let mark: MarkFn = Box::new(|_| async { Ok(marked_ok()) }.boxed_local());

        let failures = Rc::new(RefCell::new(Vec::new()));
        let failure_log = failures.clone();
        let engine = AttendanceEngine::new(AttendanceEngineOptions {
            config: CaptureConfig::for_session(7),
            frames: Box::new(StaticFrames(None)),
            recognize,
            mark,
            release_camera: Rc::new(|| {}),
            on_status: Rc::new(|_| {}),
            on_success: Rc::new(|_| {}),
            on_error: Rc::new(move |f| failure_log.borrow_mut().push(f)),
        });

        engine.camera_ready();
        engine.start();
        for _ in 0..25 {
            engine.tick().await;
        }

        assert_eq!(engine.state(), CaptureState::FailedNoMatch);
        assert_eq!(
            *failures.borrow(),
            [CaptureFailure::AttemptsExhausted { attempts: 20 }]
        );
    }

    #[tokio::test]
    async fn restart_after_failure_runs_a_fresh_attempt_budget() {
        let mut queue = VecDeque::new();
        for _ in 0..20 {
            queue.push_back(Ok(no_match_response()));
        }
        queue.push_back(Ok(match_response(true)));

        let h = harness(queue, Ok(marked_ok()));
        h.engine.camera_ready();
        h.engine.start();
        for _ in 0..20 {
            h.engine.tick().await;
        }
        assert_eq!(h.engine.state(), CaptureState::FailedNoMatch);

        // Camera is still bound; the user tries again.
        h.engine.start();
        assert_eq!(h.engine.attempt_count(), 0);
        h.engine.tick().await;

        assert_eq!(h.engine.state(), CaptureState::Succeeded);
        assert_eq!(h.successes.borrow().len(), 1);
    }
}

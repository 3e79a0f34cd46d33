//! Session controller for the capture pipeline
//!
//! Owns the stream manager, the detector singleton, and the per-session
//! worker loops, and drives the Idle -> Capturing -> Detecting state
//! machine. Every stop path releases its handles exactly once, so repeated
//! stops are no-ops and restarts never double-register loops.

use crate::capture::{CaptureKind, StreamSourceManager, VideoSource};
use crate::captions::{Caption, CaptionLog, PredictionLabel};
use crate::detect::{DetectionResult, DetectorHandle, DetectorLoader};
use crate::overlay::{DrawLoop, OverlayFrame};
use crate::predict::{HttpClassifier, PredictLoop, SignClassifier};
use crate::session::config::SessionConfig;
use crate::speech::{SpeechAnnouncer, SpeechSynthesizer};
use crate::utils::{LatestCell, MetricsSnapshot, SessionMetrics};
use crate::{Result, SignspeakError};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle states of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream, no loops
    Idle,

    /// A stream is live; detection is off
    Capturing,

    /// Stream live, draw and predict loops running
    Detecting,
}

/// Events emitted by the session controller and its workers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A stream was acquired and is publishing frames
    StreamReady { kind: CaptureKind },

    /// Stream acquisition failed; `message` is the banner text
    CaptureFailed { message: String },

    /// Detection loops started
    DetectionStarted { session_id: Uuid },

    /// Detection loops stopped and were joined
    DetectionStopped,

    /// A new subtitle was published
    SubtitleChanged { caption: Caption },

    /// The subtitle was reset to the empty sentinel
    SubtitleCleared,

    /// A prediction attempt failed; the previous subtitle is retained
    PredictionFailed { message: String },
}

/// Live worker handles for one detection session
///
/// Invariant: released exactly once; the controller holds `None` whenever
/// detection is off.
pub struct LoopHandles {
    session_id: Uuid,
    draw_stop: Sender<()>,
    draw_handle: JoinHandle<()>,
    predict_stop: Sender<()>,
    predict_cancel: Arc<AtomicBool>,
    predict_handle: JoinHandle<()>,
}

impl LoopHandles {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Stop both loops and join them
    ///
    /// The cancel flag is raised before the stop senders drop, so a
    /// classifier response that was in flight when we stopped is discarded
    /// by the worker instead of surfacing late. Joining is bounded by the
    /// classifier's request timeout.
    fn release(self) {
        self.predict_cancel.store(true, Ordering::SeqCst);
        drop(self.draw_stop);
        drop(self.predict_stop);

        if self.draw_handle.join().is_err() {
            warn!("Draw loop worker panicked");
        }
        if self.predict_handle.join().is_err() {
            warn!("Prediction loop worker panicked");
        }
    }
}

/// Coordinates stream, detector, overlay, prediction, and speech
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    sources: StreamSourceManager,
    detector: Arc<DetectorHandle>,
    classifier: Arc<dyn SignClassifier>,
    announcer: Arc<Mutex<SpeechAnnouncer>>,
    captions: CaptionLog,
    detections: LatestCell<DetectionResult>,
    overlay: LatestCell<OverlayFrame>,
    metrics: SessionMetrics,
    loops: Option<LoopHandles>,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
}

impl SessionController {
    /// Create a controller and kick off the one-time detector load
    ///
    /// The load runs in the background; the controller is usable right away
    /// and detection simply reports no landmarks until the engine is ready.
    pub fn new(
        config: SessionConfig,
        source: Box<dyn VideoSource>,
        classifier: Arc<dyn SignClassifier>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
        detector_loader: DetectorLoader,
    ) -> Result<Self> {
        config.validate().map_err(SignspeakError::ConfigError)?;

        let (event_tx, event_rx) = bounded(config.event_capacity);

        let detector = Arc::new(DetectorHandle::new(config.detector.clone()));
        let _ = detector.initialize(detector_loader);

        let mut announcer = SpeechAnnouncer::new(config.speech.clone());
        if let Some(synthesizer) = synthesizer {
            announcer = announcer.with_synthesizer(synthesizer);
        }

        let captions = CaptionLog::new(config.caption_history);

        Ok(Self {
            sources: StreamSourceManager::new(source),
            detector,
            classifier,
            announcer: Arc::new(Mutex::new(announcer)),
            captions,
            detections: LatestCell::new(),
            overlay: LatestCell::new(),
            metrics: SessionMetrics::new(),
            loops: None,
            state: SessionState::Idle,
            event_tx,
            event_rx,
            config,
        })
    }

    /// Create a controller classifying against the config's HTTP endpoint
    pub fn with_http_classifier(
        config: SessionConfig,
        source: Box<dyn VideoSource>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
        detector_loader: DetectorLoader,
    ) -> Result<Self> {
        let classifier = Arc::new(HttpClassifier::new(
            config.classifier_endpoint.clone(),
            config.classifier_timeout,
        )?);
        Self::new(config, source, classifier, synthesizer, detector_loader)
    }

    /// Acquire (or replace) the capture stream
    ///
    /// The previous stream is always stopped first; if detection was
    /// running, its loops are torn down before the new stream is requested.
    pub fn acquire_stream(&mut self, kind: CaptureKind) -> Result<()> {
        if self.state == SessionState::Detecting {
            self.disable_detection();
        }

        match self.sources.acquire(kind) {
            Ok(()) => {
                self.state = SessionState::Capturing;
                self.send_event(SessionEvent::StreamReady { kind });
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                let message = self
                    .sources
                    .last_error()
                    .unwrap_or_else(|| e.user_message());
                self.send_event(SessionEvent::CaptureFailed { message });
                Err(e)
            }
        }
    }

    /// Spawn the draw and predict loops for the active stream
    ///
    /// A no-op while already detecting; an error without a stream.
    pub fn enable_detection(&mut self) -> Result<()> {
        match self.state {
            SessionState::Detecting => {
                warn!("Detection already enabled");
                return Ok(());
            }
            SessionState::Idle => {
                return Err(SignspeakError::SessionError(
                    "No active stream to run detection on".into(),
                ));
            }
            SessionState::Capturing => {}
        }

        let session_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));

        let (draw_stop, draw_handle) = DrawLoop {
            interval: self.config.draw_interval,
            surface: self.sources.surface(),
            detector: Arc::clone(&self.detector),
            detections: self.detections.clone(),
            overlay: self.overlay.clone(),
            metrics: self.metrics.clone(),
        }
        .start();

        let (predict_stop, predict_handle) = PredictLoop {
            interval: self.config.predict_interval,
            empty_backoff: self.config.empty_backoff,
            detections: self.detections.clone(),
            classifier: Arc::clone(&self.classifier),
            captions: self.captions.clone(),
            announcer: Arc::clone(&self.announcer),
            banner: self.sources.banner(),
            events: self.event_tx.clone(),
            cancel: Arc::clone(&cancel),
            metrics: self.metrics.clone(),
        }
        .start();

        self.loops = Some(LoopHandles {
            session_id,
            draw_stop,
            draw_handle,
            predict_stop,
            predict_cancel: cancel,
            predict_handle,
        });
        self.state = SessionState::Detecting;
        self.send_event(SessionEvent::DetectionStarted { session_id });
        info!("Detection enabled (session {})", session_id);
        Ok(())
    }

    /// Stop the detection loops and clear the detection surfaces
    ///
    /// Safe to call repeatedly; only the first call after an enable does
    /// any work.
    pub fn disable_detection(&mut self) {
        if let Some(handles) = self.loops.take() {
            let session_id = handles.session_id();
            handles.release();

            self.detections.clear();
            self.overlay.clear();
            self.captions.clear_current();
            self.send_event(SessionEvent::SubtitleCleared);
            self.send_event(SessionEvent::DetectionStopped);
            info!("Detection disabled (session {})", session_id);
        }

        if self.state == SessionState::Detecting {
            self.state = SessionState::Capturing;
        }
    }

    /// Flip detection on or off, as a detection toggle button would
    pub fn toggle_detection(&mut self) -> Result<()> {
        if self.is_detecting() {
            self.disable_detection();
            Ok(())
        } else {
            self.enable_detection()
        }
    }

    /// Stop everything: detection loops, then the stream
    pub fn teardown(&mut self) {
        self.disable_detection();
        self.sources.release();
        if self.state != SessionState::Idle {
            self.state = SessionState::Idle;
            info!("Session torn down");
        }
    }

    /// Receiver for subtitle and lifecycle events
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_detecting(&self) -> bool {
        self.state == SessionState::Detecting
    }

    pub fn is_stream_ready(&self) -> bool {
        self.sources.is_ready()
    }

    pub fn active_kind(&self) -> Option<CaptureKind> {
        self.sources.active_kind()
    }

    pub fn detector_ready(&self) -> bool {
        self.detector.is_ready()
    }

    /// The subtitle currently on screen
    pub fn subtitle(&self) -> PredictionLabel {
        self.captions.current()
    }

    /// Shared caption log (current subtitle plus transcript)
    pub fn captions(&self) -> CaptionLog {
        self.captions.clone()
    }

    /// Shared cell holding the latest composed overlay frame
    pub fn overlay(&self) -> LatestCell<OverlayFrame> {
        self.overlay.clone()
    }

    /// Banner text of the last capture failure, if unresolved
    pub fn banner(&self) -> Option<String> {
        self.sources.last_error()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn send_event(&self, event: SessionEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            debug!("Failed to send session event: {}", e);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{VideoFrame, VideoStream};
    use crate::detect::{HandLandmarks, LandmarkDetector};
    use std::time::Duration;

    struct StubStream;

    impl VideoStream for StubStream {
        fn stop(&mut self) {}

        fn is_active(&self) -> bool {
            true
        }
    }

    struct StubSource;

    impl VideoSource for StubSource {
        fn open(
            &self,
            _kind: CaptureKind,
            surface: LatestCell<VideoFrame>,
        ) -> Result<Box<dyn VideoStream>> {
            surface.publish(VideoFrame::new(vec![0u8; 16 * 12 * 4], 16, 12));
            Ok(Box::new(StubStream))
        }
    }

    struct EmptyDetector;

    impl LandmarkDetector for EmptyDetector {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<HandLandmarks>> {
            Ok(Vec::new())
        }
    }

    struct StubClassifier;

    impl SignClassifier for StubClassifier {
        fn classify(&self, _features: &[f32]) -> Result<String> {
            Ok("STUB".to_string())
        }
    }

    fn test_config() -> SessionConfig {
        SessionConfig::default()
            .with_draw_interval(Duration::from_millis(10))
            .with_predict_interval(Duration::from_millis(50))
            .with_empty_backoff(Duration::from_millis(10))
    }

    fn test_controller() -> SessionController {
        SessionController::new(
            test_config(),
            Box::new(StubSource),
            Arc::new(StubClassifier),
            None,
            Box::new(|_config| Ok(Box::new(EmptyDetector) as Box<dyn LandmarkDetector>)),
        )
        .unwrap()
    }

    #[test]
    fn test_controller_starts_idle() {
        let controller = test_controller();
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(!controller.is_detecting());
        assert!(!controller.is_stream_ready());
        assert!(controller.subtitle().is_empty());
        assert!(controller.banner().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = SessionController::new(
            test_config().with_draw_interval(Duration::ZERO),
            Box::new(StubSource),
            Arc::new(StubClassifier),
            None,
            Box::new(|_config| Ok(Box::new(EmptyDetector) as Box<dyn LandmarkDetector>)),
        );

        assert!(matches!(result, Err(SignspeakError::ConfigError(_))));
    }

    #[test]
    fn test_enable_detection_requires_a_stream() {
        let mut controller = test_controller();

        let result = controller.enable_detection();

        assert!(matches!(result, Err(SignspeakError::SessionError(_))));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_enable_while_detecting_is_a_noop() {
        let mut controller = test_controller();
        controller.acquire_stream(CaptureKind::Camera).unwrap();
        assert_eq!(controller.state(), SessionState::Capturing);

        controller.enable_detection().unwrap();
        assert!(controller.is_detecting());

        // Second enable must not spawn a second pair of loops
        controller.enable_detection().unwrap();
        assert!(controller.is_detecting());

        controller.disable_detection();
        assert_eq!(controller.state(), SessionState::Capturing);

        controller.disable_detection();
        assert_eq!(controller.state(), SessionState::Capturing);
    }

    #[test]
    fn test_toggle_cycles_detection() {
        let mut controller = test_controller();
        controller.acquire_stream(CaptureKind::Camera).unwrap();

        controller.toggle_detection().unwrap();
        assert!(controller.is_detecting());

        controller.toggle_detection().unwrap();
        assert!(!controller.is_detecting());
        assert_eq!(controller.state(), SessionState::Capturing);
    }

    #[test]
    fn test_teardown_is_idempotent_from_any_state() {
        let mut controller = test_controller();
        controller.acquire_stream(CaptureKind::Screen).unwrap();
        controller.enable_detection().unwrap();

        controller.teardown();
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(!controller.is_stream_ready());

        controller.teardown();
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_with_http_classifier_builds() {
        let controller = SessionController::with_http_classifier(
            test_config().with_endpoint("http://localhost:8000/predict"),
            Box::new(StubSource),
            None,
            Box::new(|_config| Ok(Box::new(EmptyDetector) as Box<dyn LandmarkDetector>)),
        );

        assert!(controller.is_ok());
    }
}

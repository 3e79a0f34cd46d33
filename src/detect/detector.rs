//! Landmark detector adapter
//!
//! Wraps the third-party hand-landmark engine behind a singleton handle with
//! one-time background initialization. The capture pipeline never blocks on
//! the load: until the engine is ready, detection reports no landmarks.

use crate::capture::VideoFrame;
use crate::detect::landmarks::HandLandmarks;
use crate::Result;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Default remote location of the detector's runtime assets
pub const DEFAULT_RUNTIME_ASSET_URL: &str =
    "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@0.10.3/wasm";

/// Default remote location of the hand-landmark model
pub const DEFAULT_MODEL_ASSET_URL: &str =
    "https://storage.googleapis.com/mediapipe-models/gesture_recognizer/gesture_recognizer/float16/1/gesture_recognizer.task";

/// Single-image hand-landmark engine
pub trait LandmarkDetector: Send {
    /// Run one detection pass over a frame
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<HandLandmarks>>;
}

/// Loader invoked once, on a background thread, to build the engine
pub type DetectorLoader = Box<dyn FnOnce(&DetectorConfig) -> Result<Box<dyn LandmarkDetector>> + Send>;

/// Configuration for the landmark detector
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Where the engine's runtime assets are fetched from
    pub runtime_asset_url: String,

    /// Where the model file is fetched from
    pub model_asset_url: String,

    /// Prefer the GPU delegate when the platform offers one
    pub prefer_gpu: bool,

    /// Minimum confidence for a hand to be reported at all
    pub min_detection_confidence: f32,

    /// Minimum confidence for tracking a hand across frames
    pub min_tracking_confidence: f32,

    /// Maximum number of hands reported per frame
    pub max_hands: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            runtime_asset_url: DEFAULT_RUNTIME_ASSET_URL.to_string(),
            model_asset_url: DEFAULT_MODEL_ASSET_URL.to_string(),
            prefer_gpu: true,
            min_detection_confidence: 0.1,
            min_tracking_confidence: 0.1,
            max_hands: 2,
        }
    }
}

impl DetectorConfig {
    /// Set the model asset location
    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_asset_url = url.into();
        self
    }

    /// Set both confidence thresholds
    pub fn with_confidence(mut self, detection: f32, tracking: f32) -> Self {
        self.min_detection_confidence = detection;
        self.min_tracking_confidence = tracking;
        self
    }

    /// Set the maximum hands reported per frame
    pub fn with_max_hands(mut self, max_hands: usize) -> Self {
        self.max_hands = max_hands;
        self
    }

    /// Disable the GPU delegate preference
    pub fn without_gpu(mut self) -> Self {
        self.prefer_gpu = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.runtime_asset_url.is_empty() {
            return Err("Runtime asset URL is required".to_string());
        }
        if self.model_asset_url.is_empty() {
            return Err("Model asset URL is required".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(format!(
                "Detection confidence out of range: {}",
                self.min_detection_confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.min_tracking_confidence) {
            return Err(format!(
                "Tracking confidence out of range: {}",
                self.min_tracking_confidence
            ));
        }
        if self.max_hands == 0 {
            return Err("At least one hand must be allowed".to_string());
        }
        Ok(())
    }
}

enum DetectorState {
    Pending,
    Ready(Box<dyn LandmarkDetector>),
    Failed(String),
}

/// Shared handle to the singleton detector
///
/// `initialize` is fire-and-forget: callers keep running while the engine
/// loads. `detect` degrades to an empty result before the load completes and
/// after a failed load.
pub struct DetectorHandle {
    config: DetectorConfig,
    state: Arc<Mutex<DetectorState>>,
    started: AtomicBool,
}

impl DetectorHandle {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(DetectorState::Pending)),
            started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Kick off the one-time engine load on a background thread
    ///
    /// Returns the load thread's handle on the first call, `None` on repeats.
    pub fn initialize(&self, loader: DetectorLoader) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Detector initialization already started");
            return None;
        }

        let state = Arc::clone(&self.state);
        let config = self.config.clone();

        Some(thread::spawn(move || {
            info!("Loading landmark detector from {}", config.model_asset_url);
            match loader(&config) {
                Ok(detector) => {
                    *state.lock() = DetectorState::Ready(detector);
                    info!("Landmark detector ready");
                }
                Err(e) => {
                    error!("Landmark detector failed to load: {}", e);
                    *state.lock() = DetectorState::Failed(e.to_string());
                }
            }
        }))
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock(), DetectorState::Ready(_))
    }

    pub fn init_error(&self) -> Option<String> {
        match &*self.state.lock() {
            DetectorState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Detect hands on one frame
    ///
    /// Reports no landmarks while the engine is still loading or failed to
    /// load, and on per-frame detection errors.
    pub fn detect(&self, frame: &VideoFrame) -> Vec<HandLandmarks> {
        let mut state = self.state.lock();
        match &mut *state {
            DetectorState::Ready(detector) => match detector.detect(frame) {
                Ok(hands) => hands,
                Err(e) => {
                    debug!("Landmark detection failed: {}", e);
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }
}

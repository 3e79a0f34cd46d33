//! Configuration for a capture session
//!
//! Centralizes the timing, endpoint, and collaborator settings the session
//! controller wires together.

use crate::captions::DEFAULT_HISTORY_LIMIT;
use crate::detect::DetectorConfig;
use crate::predict::classifier::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::speech::SpeechConfig;
use std::time::Duration;

/// Configuration for the complete capture session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Cadence of the overlay draw loop
    pub draw_interval: Duration,

    /// Delay between completed prediction passes
    pub predict_interval: Duration,

    /// Delay before retrying after an empty-handed prediction pass
    pub empty_backoff: Duration,

    /// Remote classifier endpoint
    pub classifier_endpoint: String,

    /// Per-request classifier timeout; also bounds how long a stop can wait
    /// on an in-flight request
    pub classifier_timeout: Duration,

    /// Landmark detector configuration
    pub detector: DetectorConfig,

    /// Speech announcement configuration
    pub speech: SpeechConfig,

    /// Number of caption transcript entries retained
    pub caption_history: usize,

    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            draw_interval: Duration::from_millis(100),
            predict_interval: Duration::from_secs(3),
            empty_backoff: Duration::from_secs(1),
            classifier_endpoint: DEFAULT_ENDPOINT.to_string(),
            classifier_timeout: DEFAULT_TIMEOUT,
            detector: DetectorConfig::default(),
            speech: SpeechConfig::default(),
            caption_history: DEFAULT_HISTORY_LIMIT,
            event_capacity: 100,
        }
    }
}

impl SessionConfig {
    /// Set the overlay draw cadence
    pub fn with_draw_interval(mut self, interval: Duration) -> Self {
        self.draw_interval = interval;
        self
    }

    /// Set the delay between prediction passes
    pub fn with_predict_interval(mut self, interval: Duration) -> Self {
        self.predict_interval = interval;
        self
    }

    /// Set the empty-handed retry delay
    pub fn with_empty_backoff(mut self, backoff: Duration) -> Self {
        self.empty_backoff = backoff;
        self
    }

    /// Set the classifier endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.classifier_endpoint = endpoint.into();
        self
    }

    /// Set the detector configuration
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the speech configuration
    pub fn with_speech(mut self, speech: SpeechConfig) -> Self {
        self.speech = speech;
        self
    }

    /// Set the caption transcript length
    pub fn with_caption_history(mut self, entries: usize) -> Self {
        self.caption_history = entries;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.draw_interval.is_zero() {
            return Err("Draw interval must be non-zero".to_string());
        }
        if self.predict_interval.is_zero() {
            return Err("Predict interval must be non-zero".to_string());
        }
        if self.empty_backoff.is_zero() {
            return Err("Empty-hands backoff must be non-zero".to_string());
        }
        if self.classifier_endpoint.is_empty() {
            return Err("Classifier endpoint is required".to_string());
        }
        if self.classifier_timeout.is_zero() {
            return Err("Classifier timeout must be non-zero".to_string());
        }
        if self.caption_history == 0 {
            return Err("Caption history must hold at least one entry".to_string());
        }
        if self.event_capacity == 0 {
            return Err("Event capacity must be at least one".to_string());
        }

        self.detector.validate()?;
        self.speech.validate()?;

        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recognized sign, as published to the subtitle surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Classifier round-trip time for this caption, if measured
    pub latency_ms: Option<u64>,
}

impl Caption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: Utc::now(),
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// The current subtitle value
///
/// The empty string is the designated "no sign recognized" sentinel; it is
/// what the subtitle overlay shows after detection stops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionLabel {
    text: String,
}

impl PredictionLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The "no sign recognized" value
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for PredictionLabel {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

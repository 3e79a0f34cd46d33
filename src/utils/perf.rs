//! Performance monitoring utilities
//!
//! Tracks per-stage timings and counters for the capture pipeline.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Tracks timing metrics over a sliding window
#[derive(Debug)]
pub struct TimingTracker {
    samples: VecDeque<Duration>,
    max_samples: usize,
}

impl TimingTracker {
    /// Create a new timing tracker with the specified window size
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a new timing sample
    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
    }

    /// Get the average duration
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Get the maximum duration
    pub fn max(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or(Duration::ZERO)
    }

    /// Get the 95th percentile duration
    pub fn percentile_95(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.samples.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted
            .get(idx.min(sorted.len() - 1))
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Get the number of samples
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Clear all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug)]
struct MetricsInner {
    draw: TimingTracker,
    classify: TimingTracker,
    frames_drawn: u64,
    predictions_ok: u64,
    predictions_failed: u64,
    empty_skips: u64,
}

/// Shared metrics for one capture session
///
/// Cloned into the draw and predict workers; all clones update the same
/// counters.
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    inner: Arc<Mutex<MetricsInner>>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsInner {
                // ~12s of draw ticks at the default cadence
                draw: TimingTracker::new(120),
                classify: TimingTracker::new(32),
                frames_drawn: 0,
                predictions_ok: 0,
                predictions_failed: 0,
                empty_skips: 0,
            })),
        }
    }

    /// Record one completed draw tick
    pub fn record_draw(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.draw.record(duration);
        inner.frames_drawn += 1;
    }

    /// Record one successful classifier round trip
    pub fn record_classify(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.classify.record(duration);
        inner.predictions_ok += 1;
    }

    /// Record a failed prediction attempt
    pub fn record_prediction_failed(&self) {
        self.inner.lock().predictions_failed += 1;
    }

    /// Record a prediction pass skipped because no hands were visible
    pub fn record_empty_skip(&self) {
        self.inner.lock().empty_skips += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock();
        MetricsSnapshot {
            frames_drawn: inner.frames_drawn,
            predictions_ok: inner.predictions_ok,
            predictions_failed: inner.predictions_failed,
            empty_skips: inner.empty_skips,
            draw_avg: inner.draw.average(),
            draw_p95: inner.draw.percentile_95(),
            classify_avg: inner.classify.average(),
            classify_p95: inner.classify.percentile_95(),
        }
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.draw.clear();
        inner.classify.clear();
        inner.frames_drawn = 0;
        inner.predictions_ok = 0;
        inner.predictions_failed = 0;
        inner.empty_skips = 0;
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the session metrics
#[derive(Debug, Default, Clone)]
pub struct MetricsSnapshot {
    pub frames_drawn: u64,
    pub predictions_ok: u64,
    pub predictions_failed: u64,
    pub empty_skips: u64,
    pub draw_avg: Duration,
    pub draw_p95: Duration,
    pub classify_avg: Duration,
    pub classify_p95: Duration,
}

impl MetricsSnapshot {
    /// Generate a performance summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        parts.push(format!("frames: {}", self.frames_drawn));
        parts.push(format!(
            "draw: {:.1}ms avg / {:.1}ms p95",
            self.draw_avg.as_secs_f64() * 1000.0,
            self.draw_p95.as_secs_f64() * 1000.0
        ));

        if self.predictions_ok > 0 {
            parts.push(format!(
                "classify: {:.0}ms avg over {} ok",
                self.classify_avg.as_secs_f64() * 1000.0,
                self.predictions_ok
            ));
        }
        if self.predictions_failed > 0 {
            parts.push(format!("failed: {}", self.predictions_failed));
        }
        if self.empty_skips > 0 {
            parts.push(format!("idle skips: {}", self.empty_skips));
        }

        parts.join(" | ")
    }
}

//! Overlay renderer worker
//!
//! Fixed-cadence loop that samples the video surface, runs landmark
//! detection, and publishes both the detection snapshot and the composed
//! overlay frame. Never queues frames: a slow tick delays the next one.

use crate::capture::VideoFrame;
use crate::detect::{DetectionResult, DetectorHandle, HandLandmarks};
use crate::overlay::skeleton::draw_hand;
use crate::utils::{LatestCell, SessionMetrics};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::info;

/// Composed output frame: the raw video with hand skeletons drawn on top
#[derive(Debug, Clone)]
pub struct OverlayFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Compose the annotated frame at the video's native resolution
pub fn compose_overlay(frame: &VideoFrame, hands: &[HandLandmarks]) -> OverlayFrame {
    let mut rgba = frame.rgba.clone();
    for hand in hands {
        draw_hand(&mut rgba, frame.width, frame.height, hand);
    }
    OverlayFrame {
        rgba,
        width: frame.width,
        height: frame.height,
    }
}

/// The draw worker for one detection session
pub struct DrawLoop {
    pub interval: Duration,
    pub surface: LatestCell<VideoFrame>,
    pub detector: Arc<DetectorHandle>,
    pub detections: LatestCell<DetectionResult>,
    pub overlay: LatestCell<OverlayFrame>,
    pub metrics: SessionMetrics,
}

impl DrawLoop {
    /// Spawn the worker thread
    ///
    /// Dropping the returned sender (or sending on it) stops the loop; the
    /// pending tick wait wakes immediately.
    pub fn start(self) -> (Sender<()>, JoinHandle<()>) {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::spawn(move || {
            info!(
                "Overlay renderer started ({}ms cadence)",
                self.interval.as_millis()
            );

            loop {
                match stop_rx.recv_timeout(self.interval) {
                    Err(RecvTimeoutError::Timeout) => self.tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            info!("Overlay renderer stopped");
        });

        (stop_tx, handle)
    }

    fn tick(&self) {
        // No drawable frame: skip silently, leaving the previous output in place
        let frame = match self.surface.snapshot() {
            Some(frame) if frame.is_valid() => frame,
            _ => return,
        };

        let started = Instant::now();
        let hands = self.detector.detect(&frame);
        self.detections.publish(DetectionResult::new(hands.clone()));
        self.overlay.publish(compose_overlay(&frame, &hands));
        self.metrics.record_draw(started.elapsed());
    }
}

//! Self-rescheduling prediction loop
//!
//! One pass: snapshot the latest landmarks, classify them remotely, publish
//! the label. The next pass is scheduled only after the current one
//! completes, so at most one classifier request is ever in flight and the
//! outbound rate is capped at one request per interval plus round trip.
//! Empty-handed frames skip the request entirely and retry on a shorter
//! backoff.

use crate::captions::{Caption, CaptionLog};
use crate::detect::{flatten_landmarks, DetectionResult};
use crate::predict::classifier::SignClassifier;
use crate::session::SessionEvent;
use crate::speech::SpeechAnnouncer;
use crate::utils::{LatestCell, SessionMetrics};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The prediction worker for one detection session
pub struct PredictLoop {
    /// Delay between completed passes
    pub interval: Duration,

    /// Shorter delay used after an empty-handed pass
    pub empty_backoff: Duration,

    /// Landmark snapshot written by the overlay renderer
    pub detections: LatestCell<DetectionResult>,

    pub classifier: Arc<dyn SignClassifier>,

    pub captions: CaptionLog,

    pub announcer: Arc<Mutex<SpeechAnnouncer>>,

    /// Capture-error banner; cleared on the first successful prediction
    pub banner: LatestCell<String>,

    pub events: Sender<SessionEvent>,

    /// Checked at loop entry and re-checked after each classifier return,
    /// so a response landing after stop produces no side effects
    pub cancel: Arc<AtomicBool>,

    pub metrics: SessionMetrics,
}

impl PredictLoop {
    /// Spawn the worker thread
    ///
    /// Dropping the returned sender wakes the pending reschedule wait
    /// immediately; set the cancel flag first to also suppress an in-flight
    /// request's side effects.
    pub fn start(self) -> (Sender<()>, JoinHandle<()>) {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::spawn(move || self.run(&stop_rx));
        (stop_tx, handle)
    }

    fn run(self, stop_rx: &Receiver<()>) {
        info!(
            "Prediction loop started ({}ms interval, {}ms idle backoff)",
            self.interval.as_millis(),
            self.empty_backoff.as_millis()
        );

        // First pass runs immediately; only subsequent passes wait
        let mut delay = Duration::ZERO;

        loop {
            if !delay.is_zero() {
                match stop_rx.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            if self.cancel.load(Ordering::SeqCst) {
                break;
            }

            delay = self.attempt();
        }

        info!("Prediction loop stopped");
    }

    /// Run one pass and return the delay before the next one
    fn attempt(&self) -> Duration {
        let snapshot = self.detections.snapshot().unwrap_or_default();
        if !snapshot.has_hands() {
            self.metrics.record_empty_skip();
            return self.empty_backoff;
        }

        let features = flatten_landmarks(&snapshot);
        let started = Instant::now();
        let outcome = self.classifier.classify(&features);
        let elapsed = started.elapsed();

        if self.cancel.load(Ordering::SeqCst) {
            debug!("Discarding prediction that completed after cancellation");
            return self.interval;
        }

        match outcome {
            Ok(label) => {
                self.metrics.record_classify(elapsed);
                self.banner.clear();

                let caption = Caption::new(&label).with_latency(elapsed.as_millis() as u64);
                debug!("Prediction: {} ({}ms)", label, elapsed.as_millis());

                self.captions.publish(caption.clone());
                self.send_event(SessionEvent::SubtitleChanged { caption });
                self.announcer.lock().announce(&label);
            }
            Err(e) => {
                // Non-fatal: the previous subtitle stays up and the loop
                // keeps its cadence
                self.metrics.record_prediction_failed();
                warn!("Prediction request failed: {}", e);
                self.send_event(SessionEvent::PredictionFailed {
                    message: e.to_string(),
                });
            }
        }

        self.interval
    }

    fn send_event(&self, event: SessionEvent) {
        if let Err(e) = self.events.try_send(event) {
            debug!("Failed to send session event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{HandLandmarks, LandmarkPoint};
    use crate::speech::SpeechConfig;
    use crate::{Result, SignspeakError};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    struct FixedClassifier {
        label: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl SignClassifier for FixedClassifier {
        fn classify(&self, _features: &[f32]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label.to_string())
        }
    }

    struct ScriptedClassifier {
        replies: Mutex<VecDeque<Result<String>>>,
    }

    impl SignClassifier for ScriptedClassifier {
        fn classify(&self, _features: &[f32]) -> Result<String> {
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(SignspeakError::ClassifierError("script exhausted".into())))
        }
    }

    /// Blocks inside classify until released, to pin down in-flight timing
    struct GatedClassifier {
        entered_tx: Sender<()>,
        release_rx: Receiver<()>,
    }

    impl SignClassifier for GatedClassifier {
        fn classify(&self, _features: &[f32]) -> Result<String> {
            let _ = self.entered_tx.send(());
            let _ = self.release_rx.recv_timeout(Duration::from_secs(5));
            Ok("LATE".to_string())
        }
    }

    fn one_hand_result() -> DetectionResult {
        DetectionResult::new(vec![HandLandmarks::new(vec![LandmarkPoint::new(
            0.5, 0.5, 0.0,
        )])])
    }

    struct LoopParts {
        detections: LatestCell<DetectionResult>,
        captions: CaptionLog,
        banner: LatestCell<String>,
        events: Receiver<SessionEvent>,
        cancel: Arc<AtomicBool>,
        metrics: SessionMetrics,
    }

    fn build_loop(
        classifier: Arc<dyn SignClassifier>,
        interval: Duration,
        empty_backoff: Duration,
    ) -> (PredictLoop, LoopParts) {
        let detections = LatestCell::new();
        let captions = CaptionLog::default();
        let banner = LatestCell::new();
        let (event_tx, event_rx) = bounded(100);
        let cancel = Arc::new(AtomicBool::new(false));
        let metrics = SessionMetrics::new();

        let predict = PredictLoop {
            interval,
            empty_backoff,
            detections: detections.clone(),
            classifier,
            captions: captions.clone(),
            announcer: Arc::new(Mutex::new(SpeechAnnouncer::new(SpeechConfig::default()))),
            banner: banner.clone(),
            events: event_tx,
            cancel: Arc::clone(&cancel),
            metrics: metrics.clone(),
        };

        (
            predict,
            LoopParts {
                detections,
                captions,
                banner,
                events: event_rx,
                cancel,
                metrics,
            },
        )
    }

    #[test]
    fn test_first_pass_runs_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = Arc::new(FixedClassifier {
            label: "HELLO",
            calls: Arc::clone(&calls),
        });
        let (predict, parts) = build_loop(classifier, Duration::from_secs(30), Duration::from_secs(30));
        parts.detections.publish(one_hand_result());

        let (stop_tx, handle) = predict.start();
        thread::sleep(Duration::from_millis(200));

        // One immediate pass, then a 30s wait: exactly one call
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(parts.captions.current().as_str(), "HELLO");

        drop(stop_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_empty_hands_skip_the_classifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = Arc::new(FixedClassifier {
            label: "NEVER",
            calls: Arc::clone(&calls),
        });
        let (predict, parts) =
            build_loop(classifier, Duration::from_secs(30), Duration::from_millis(5));

        let (stop_tx, handle) = predict.start();
        thread::sleep(Duration::from_millis(150));
        drop(stop_tx);
        handle.join().unwrap();

        // No request went out, and the short backoff cadence kept the loop hot
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(parts.metrics.snapshot().empty_skips >= 3);
        assert!(parts.captions.current().is_empty());
    }

    #[test]
    fn test_hands_reappearing_resume_on_backoff_cadence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = Arc::new(FixedClassifier {
            label: "HELLO",
            calls: Arc::clone(&calls),
        });
        // Steady interval far too long to matter; only the backoff cadence
        // can get a request out within the test window
        let (predict, parts) =
            build_loop(classifier, Duration::from_secs(60), Duration::from_millis(5));

        let (stop_tx, handle) = predict.start();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        parts.detections.publish(one_hand_result());
        thread::sleep(Duration::from_millis(200));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(parts.captions.current().as_str(), "HELLO");

        drop(stop_tx);
        handle.join().unwrap();
    }

    #[test]
    fn test_failure_keeps_previous_subtitle() {
        let classifier = Arc::new(ScriptedClassifier {
            replies: Mutex::new(VecDeque::from([
                Ok("HELLO".to_string()),
                Err(SignspeakError::ClassifierError("boom".into())),
                Ok("WORLD".to_string()),
            ])),
        });
        let (predict, parts) =
            build_loop(classifier, Duration::from_millis(5), Duration::from_millis(5));
        parts.detections.publish(one_hand_result());

        let (stop_tx, handle) = predict.start();

        let deadline = Instant::now() + Duration::from_secs(2);
        while parts.captions.current().as_str() != "WORLD" && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        drop(stop_tx);
        handle.join().unwrap();

        // The failed pass never cleared or replaced the first label
        let history: Vec<String> = parts
            .captions
            .history()
            .into_iter()
            .map(|caption| caption.text)
            .collect();
        assert!(history.starts_with(&["HELLO".to_string(), "WORLD".to_string()]));
        assert!(parts.metrics.snapshot().predictions_failed >= 1);

        let failure_events = parts
            .events
            .try_iter()
            .filter(|event| matches!(event, SessionEvent::PredictionFailed { .. }))
            .count();
        assert!(failure_events >= 1);
    }

    #[test]
    fn test_success_clears_the_capture_banner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = Arc::new(FixedClassifier {
            label: "HELLO",
            calls,
        });
        let (predict, parts) = build_loop(classifier, Duration::from_secs(30), Duration::from_secs(30));
        parts.detections.publish(one_hand_result());
        parts.banner.publish("Screen sharing failed.".to_string());

        let (stop_tx, handle) = predict.start();
        thread::sleep(Duration::from_millis(200));
        drop(stop_tx);
        handle.join().unwrap();

        assert!(parts.banner.is_empty());
    }

    #[test]
    fn test_cancellation_discards_in_flight_result() {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let classifier = Arc::new(GatedClassifier {
            entered_tx,
            release_rx,
        });
        let (predict, parts) = build_loop(classifier, Duration::from_millis(5), Duration::from_millis(5));
        parts.detections.publish(one_hand_result());

        let (stop_tx, handle) = predict.start();

        // Wait for the request to be in flight, then stop the loop
        entered_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        parts.cancel.store(true, Ordering::SeqCst);
        drop(stop_tx);
        release_tx.send(()).unwrap();
        handle.join().unwrap();

        // The late response produced no subtitle, caption, or event
        assert!(parts.captions.current().is_empty());
        assert!(parts.captions.is_empty());
        assert!(parts
            .events
            .try_iter()
            .all(|event| !matches!(event, SessionEvent::SubtitleChanged { .. })));
    }
}

use super::types::{Caption, PredictionLabel};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of history entries retained
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Current subtitle plus a bounded transcript of past captions
///
/// Shared between the prediction worker (writer) and whatever surface renders
/// subtitles (reader). Clones share the same storage.
#[derive(Debug, Clone)]
pub struct CaptionLog {
    current: Arc<RwLock<PredictionLabel>>,
    history: Arc<RwLock<VecDeque<Caption>>>,
    limit: usize,
}

impl CaptionLog {
    pub fn new(limit: usize) -> Self {
        Self {
            current: Arc::new(RwLock::new(PredictionLabel::empty())),
            history: Arc::new(RwLock::new(VecDeque::new())),
            limit,
        }
    }

    /// Set the current subtitle and append the caption to the transcript
    pub fn publish(&self, caption: Caption) {
        *self.current.write() = PredictionLabel::new(&caption.text);

        let mut history = self.history.write();
        if history.len() >= self.limit {
            history.pop_front();
        }
        history.push_back(caption);
    }

    /// The subtitle currently on screen
    pub fn current(&self) -> PredictionLabel {
        self.current.read().clone()
    }

    /// Reset the subtitle to the empty sentinel, keeping the transcript
    pub fn clear_current(&self) {
        *self.current.write() = PredictionLabel::empty();
    }

    pub fn history(&self) -> Vec<Caption> {
        self.history.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    /// Drop the transcript and the current subtitle
    pub fn clear(&self) {
        self.clear_current();
        self.history.write().clear();
    }
}

impl Default for CaptionLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_sets_current_and_history() {
        let log = CaptionLog::default();
        assert!(log.current().is_empty());

        log.publish(Caption::new("HELLO"));
        log.publish(Caption::new("WORLD"));

        assert_eq!(log.current().as_str(), "WORLD");
        assert_eq!(log.len(), 2);
        assert_eq!(log.history()[0].text, "HELLO");
    }

    #[test]
    fn test_clear_current_keeps_history() {
        let log = CaptionLog::default();
        log.publish(Caption::new("HELLO"));

        log.clear_current();

        assert!(log.current().is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let log = CaptionLog::new(3);
        for i in 0..5 {
            log.publish(Caption::new(format!("SIGN {}", i)));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.history()[0].text, "SIGN 2");
        assert_eq!(log.current().as_str(), "SIGN 4");
    }

    #[test]
    fn test_clones_share_storage() {
        let log = CaptionLog::default();
        let writer = log.clone();

        writer.publish(Caption::new("SHARED"));
        assert_eq!(log.current().as_str(), "SHARED");

        log.clear();
        assert!(writer.is_empty());
        assert!(writer.current().is_empty());
    }
}

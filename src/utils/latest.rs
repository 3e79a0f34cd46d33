use parking_lot::Mutex;
use std::sync::Arc;

/// Single-slot cell where every write replaces the previous value.
///
/// Used for the live video surface and the landmark snapshot: readers always
/// see the most recent value, never a backlog. A value may be read zero or
/// many times before it is overwritten.
#[derive(Debug, Default)]
pub struct LatestCell<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for LatestCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> LatestCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the current value
    pub fn publish(&self, value: T) {
        *self.slot.lock() = Some(value);
    }

    /// Drop the current value, if any
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl<T: Clone> LatestCell<T> {
    /// Get a copy of the current value without consuming it
    pub fn snapshot(&self) -> Option<T> {
        self.slot.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_snapshot() {
        let cell = LatestCell::new();
        assert!(cell.is_empty());
        assert_eq!(cell.snapshot(), None::<u32>);

        cell.publish(1u32);
        cell.publish(2u32);
        assert_eq!(cell.snapshot(), Some(2));

        // Snapshot does not consume
        assert_eq!(cell.snapshot(), Some(2));
    }

    #[test]
    fn test_clear() {
        let cell = LatestCell::new();
        cell.publish("hello".to_string());
        assert!(!cell.is_empty());

        cell.clear();
        assert!(cell.is_empty());
        assert_eq!(cell.snapshot(), None);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let writer = LatestCell::new();
        let reader = writer.clone();

        writer.publish(42u32);
        assert_eq!(reader.snapshot(), Some(42));

        reader.clear();
        assert!(writer.is_empty());
    }

    #[test]
    fn test_cross_thread_visibility() {
        let cell = LatestCell::new();
        let writer = cell.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..10u32 {
                writer.publish(i);
            }
        });
        handle.join().unwrap();

        assert_eq!(cell.snapshot(), Some(9));
    }
}

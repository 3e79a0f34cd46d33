use std::time::Instant;

/// One decoded RGBA frame from the active stream
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: Instant,
}

impl VideoFrame {
    pub fn new(rgba: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            rgba,
            width,
            height,
            captured_at: Instant::now(),
        }
    }

    /// A frame is drawable once it has real dimensions and a full pixel buffer.
    /// Streams report zero-sized frames while they warm up.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }

    pub fn age(&self) -> std::time::Duration {
        self.captured_at.elapsed()
    }
}

/// Which capture surface a session records from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Camera,
    Screen,
}

impl CaptureKind {
    /// Banner text shown when acquiring this kind of stream fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            CaptureKind::Camera => "Camera not available. Please check your permissions or device.",
            CaptureKind::Screen => "Screen sharing failed.",
        }
    }
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureKind::Camera => f.write_str("camera"),
            CaptureKind::Screen => f.write_str("screen"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validity() {
        let frame = VideoFrame::new(vec![0u8; 8 * 6 * 4], 8, 6);
        assert!(frame.is_valid());

        // Stream not warmed up yet
        let empty = VideoFrame::new(Vec::new(), 0, 0);
        assert!(!empty.is_valid());

        // Truncated pixel buffer
        let short = VideoFrame::new(vec![0u8; 10], 8, 6);
        assert!(!short.is_valid());
    }

    #[test]
    fn test_failure_messages_per_kind() {
        assert!(CaptureKind::Camera.failure_message().contains("Camera"));
        assert_eq!(CaptureKind::Screen.failure_message(), "Screen sharing failed.");
    }
}

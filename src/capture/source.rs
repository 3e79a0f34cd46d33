//! Stream acquisition and lifecycle
//!
//! Owns the platform capture seam: a `VideoSource` hands out live
//! `VideoStream`s that publish frames to the shared video surface, and the
//! `StreamSourceManager` guarantees at most one stream is live at a time.

use crate::capture::frame::{CaptureKind, VideoFrame};
use crate::utils::LatestCell;
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A live media stream publishing frames to the video surface
pub trait VideoStream: Send {
    /// Stop all tracks. Must be safe to call more than once.
    fn stop(&mut self);

    /// Whether the stream is still producing frames
    fn is_active(&self) -> bool;
}

/// Platform media-capture seam
///
/// Implementations resolve a capture request into a live stream, or fail with
/// a capture error (permission denied, no device, user-cancelled picker).
pub trait VideoSource: Send + Sync {
    fn open(&self, kind: CaptureKind, surface: LatestCell<VideoFrame>) -> Result<Box<dyn VideoStream>>;
}

/// One active media stream with its metadata
///
/// Invariant: the underlying stream is stopped exactly once, on `close` or on
/// drop, whichever comes first.
pub struct CaptureSession {
    id: Uuid,
    kind: CaptureKind,
    stream: Option<Box<dyn VideoStream>>,
    ready: bool,
}

impl CaptureSession {
    pub fn new(kind: CaptureKind, stream: Box<dyn VideoStream>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            stream: Some(stream),
            ready: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Stop the stream's tracks
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            self.ready = false;
            info!("Capture session {} closed ({})", self.id, self.kind);
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Owns stream acquisition and replacement
///
/// `acquire` always stops the previous stream and clears the previous error
/// banner before the new request resolves, so a failed switch never leaves a
/// stale stream or stale banner behind.
pub struct StreamSourceManager {
    source: Box<dyn VideoSource>,
    surface: LatestCell<VideoFrame>,
    banner: LatestCell<String>,
    session: Option<CaptureSession>,
}

impl StreamSourceManager {
    pub fn new(source: Box<dyn VideoSource>) -> Self {
        Self {
            source,
            surface: LatestCell::new(),
            banner: LatestCell::new(),
            session: None,
        }
    }

    /// The shared surface the active stream publishes frames to
    pub fn surface(&self) -> LatestCell<VideoFrame> {
        self.surface.clone()
    }

    /// The shared banner slot holding the last capture failure text
    pub fn banner(&self) -> LatestCell<String> {
        self.banner.clone()
    }

    /// Replace the active stream with a freshly acquired one
    pub fn acquire(&mut self, kind: CaptureKind) -> Result<()> {
        self.release();
        self.banner.clear();

        match self.source.open(kind, self.surface.clone()) {
            Ok(stream) => {
                let session = CaptureSession::new(kind, stream);
                info!("Capture session {} started ({})", session.id(), kind);
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to acquire {} stream: {}", kind, e);
                self.banner.publish(kind.failure_message().to_string());
                Err(e)
            }
        }
    }

    /// Stop and discard the active stream, if any
    pub fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.surface.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.session.as_ref().map(|s| s.is_ready()).unwrap_or(false)
    }

    pub fn active_kind(&self) -> Option<CaptureKind> {
        self.session.as_ref().map(|s| s.kind())
    }

    pub fn last_error(&self) -> Option<String> {
        self.banner.snapshot()
    }
}

/// Built-in source producing a moving test pattern
///
/// Stands in for real capture hardware in demos and tests.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub width: u32,
    pub height: u32,
    pub frame_interval: Duration,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            frame_interval: Duration::from_millis(33),
        }
    }
}

impl VideoSource for SyntheticSource {
    fn open(&self, kind: CaptureKind, surface: LatestCell<VideoFrame>) -> Result<Box<dyn VideoStream>> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_flag = Arc::clone(&stop_flag);
        let (width, height, interval) = (self.width, self.height, self.frame_interval);

        let handle = thread::spawn(move || {
            debug!("Synthetic {} stream started ({}x{})", kind, width, height);
            let mut tick: u32 = 0;

            while !worker_flag.load(Ordering::SeqCst) {
                surface.publish(test_pattern_frame(width, height, tick));
                tick = tick.wrapping_add(1);
                thread::sleep(interval);
            }

            debug!("Synthetic stream stopped after {} frames", tick);
        });

        Ok(Box::new(SyntheticStream {
            stop_flag,
            handle: Some(handle),
        }))
    }
}

struct SyntheticStream {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VideoStream for SyntheticStream {
    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Synthetic stream worker panicked");
            }
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn test_pattern_frame(width: u32, height: u32, tick: u32) -> VideoFrame {
    let mut rgba = vec![0u8; (width as usize) * (height as usize) * 4];
    let phase = (tick % 256) as u8;

    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 4) as usize;
            rgba[idx] = ((x * 255) / width.max(1)) as u8;
            rgba[idx + 1] = ((y * 255) / height.max(1)) as u8;
            rgba[idx + 2] = phase;
            rgba[idx + 3] = 255;
        }
    }

    VideoFrame::new(rgba, width, height)
}

pub mod frame;
pub mod source;

pub use frame::{CaptureKind, VideoFrame};
pub use source::{CaptureSession, StreamSourceManager, SyntheticSource, VideoSource, VideoStream};

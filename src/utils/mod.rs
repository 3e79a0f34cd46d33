pub mod latest;
pub mod perf;

pub use latest::LatestCell;
pub use perf::{MetricsSnapshot, SessionMetrics, TimingTracker};

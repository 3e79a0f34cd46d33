pub mod log;
pub mod types;

pub use log::{CaptionLog, DEFAULT_HISTORY_LIMIT};
pub use types::{Caption, PredictionLabel};

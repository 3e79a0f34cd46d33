pub mod classifier;
pub mod worker;

pub use classifier::{HttpClassifier, SignClassifier, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use worker::PredictLoop;

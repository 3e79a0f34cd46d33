pub mod detector;
pub mod landmarks;

pub use detector::{
    DetectorConfig, DetectorHandle, DetectorLoader, LandmarkDetector, DEFAULT_MODEL_ASSET_URL,
    DEFAULT_RUNTIME_ASSET_URL,
};
pub use landmarks::{
    flatten_landmarks, DetectionResult, HandLandmarks, LandmarkPoint, COORDS_PER_POINT,
    LANDMARKS_PER_HAND,
};

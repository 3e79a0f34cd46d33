pub mod captions;
pub mod capture;
pub mod detect;
pub mod overlay;
pub mod predict;
pub mod session;
pub mod speech;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SignspeakError {
    #[error("Capture permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device not found: {0}")]
    DeviceNotFound(String),

    #[error("Capture cancelled: {0}")]
    CaptureCancelled(String),

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("Detector initialization error: {0}")]
    DetectorInitError(String),

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Speech error: {0}")]
    SpeechError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session error: {0}")]
    SessionError(String),
}

impl From<reqwest::Error> for SignspeakError {
    fn from(e: reqwest::Error) -> Self {
        SignspeakError::ClassifierError(e.to_string())
    }
}

impl SignspeakError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Permission and hardware problems require user intervention
            SignspeakError::PermissionDenied(_) => false,
            SignspeakError::DeviceNotFound(_) => false,
            // The user can simply retry the picker
            SignspeakError::CaptureCancelled(_) => true,
            SignspeakError::CaptureError(_) => true,
            // A failed detector load needs a restart
            SignspeakError::DetectorInitError(_) => false,
            // These are typically transient errors
            SignspeakError::ClassifierError(_) => true,
            SignspeakError::SpeechError(_) => true,
            SignspeakError::ConfigError(_) => false,
            SignspeakError::SessionError(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SignspeakError::PermissionDenied(_) => {
                "Camera not available. Please check your permissions or device.".to_string()
            }
            SignspeakError::DeviceNotFound(_) => {
                "Camera not available. Please check your permissions or device.".to_string()
            }
            SignspeakError::CaptureCancelled(_) => {
                "Screen sharing failed.".to_string()
            }
            SignspeakError::CaptureError(_) => {
                "Could not start the video stream. Please try again.".to_string()
            }
            SignspeakError::DetectorInitError(_) => {
                "Hand tracking is unavailable. Please reload the application.".to_string()
            }
            SignspeakError::ClassifierError(_) => {
                "Sign prediction is temporarily unavailable. Please try again.".to_string()
            }
            SignspeakError::SpeechError(_) => {
                "Speech output failed. Captions will continue.".to_string()
            }
            SignspeakError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            SignspeakError::SessionError(_) => {
                "Session error occurred. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SignspeakError>;

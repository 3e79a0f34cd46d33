//! Remote sign classifier client
//!
//! The inference service is external; this module carries its trait seam and
//! the HTTP implementation: POST a flat landmark vector as a JSON array,
//! read back `{"result": "<label>"}`.

use crate::{Result, SignspeakError};
use serde::Deserialize;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Default inference endpoint
pub const DEFAULT_ENDPOINT: &str = "https://asldetection.onrender.com/predict";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sign classification seam: flat landmark vector in, label out
pub trait SignClassifier: Send + Sync {
    fn classify(&self, features: &[f32]) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    result: String,
}

/// HTTP classifier against the remote inference endpoint
///
/// Owns its tokio runtime; `classify` blocks the calling worker thread for
/// the duration of one request, which is what bounds the prediction loop's
/// outbound rate.
pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::Client,
    runtime: Runtime,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(SignspeakError::ConfigError(
                "Classifier endpoint is required".into(),
            ));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let runtime = Runtime::new().map_err(|e| {
            SignspeakError::ClassifierError(format!("Failed to create tokio runtime: {}", e))
        })?;

        info!("Classifier endpoint: {}", endpoint);

        Ok(Self {
            endpoint,
            client,
            runtime,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SignClassifier for HttpClassifier {
    fn classify(&self, features: &[f32]) -> Result<String> {
        debug!("Classifying {} features", features.len());

        let body = self.runtime.block_on(async {
            self.client
                .post(&self.endpoint)
                .json(&features)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        })?;

        let parsed: PredictResponse = serde_json::from_str(&body).map_err(|e| {
            SignspeakError::ClassifierError(format!("Malformed classifier response: {}", e))
        })?;

        Ok(parsed.result)
    }
}

//! Speech announcement of recognized signs
//!
//! Thin orchestration over a platform speech synthesizer: at most one
//! utterance is in flight, and the most recent label always wins.

use crate::Result;
use tracing::{debug, warn};

/// Configuration for spoken announcements
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    /// BCP 47 language tag for the synthesized voice
    pub language: String,

    /// Speaking rate (1.0 = normal)
    pub rate: f32,

    /// Voice pitch (1.0 = normal)
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl SpeechConfig {
    /// Set the voice language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the speaking rate
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Set the voice pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.language.is_empty() {
            return Err("Speech language is required".to_string());
        }
        if !(0.1..=10.0).contains(&self.rate) {
            return Err(format!("Speech rate out of range: {}", self.rate));
        }
        if !(0.0..=2.0).contains(&self.pitch) {
            return Err(format!("Speech pitch out of range: {}", self.pitch));
        }
        Ok(())
    }
}

/// Platform speech synthesis seam
pub trait SpeechSynthesizer: Send {
    /// Start speaking the given text; returns once the utterance is enqueued
    fn speak(&mut self, text: &str, config: &SpeechConfig) -> Result<()>;

    /// Cancel the in-flight utterance, if any
    fn cancel(&mut self) -> Result<()>;

    /// Whether an utterance is currently playing
    fn is_speaking(&self) -> bool;
}

/// Announces recognized labels through the installed synthesizer
///
/// Without a synthesizer, announcements are logged no-ops; the caption
/// pipeline is unaffected either way.
pub struct SpeechAnnouncer {
    config: SpeechConfig,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
}

impl SpeechAnnouncer {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            synthesizer: None,
        }
    }

    /// Install the platform synthesizer
    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Speak a recognized label, cancelling any utterance already playing
    ///
    /// Speech failures are logged and swallowed: captions must keep flowing
    /// when audio output is unavailable.
    pub fn announce(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let synthesizer = match self.synthesizer.as_mut() {
            Some(synthesizer) => synthesizer,
            None => {
                debug!("No speech synthesizer installed, skipping announcement");
                return;
            }
        };

        if synthesizer.is_speaking() {
            if let Err(e) = synthesizer.cancel() {
                warn!("Failed to cancel in-flight utterance: {}", e);
            }
        }

        if let Err(e) = synthesizer.speak(text, &self.config) {
            warn!("Speech synthesis failed: {}", e);
        } else {
            debug!("Announcing: {}", text);
        }
    }
}

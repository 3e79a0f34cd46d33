//! Speech output for recognized signs
//!
//! The synthesizer itself is an external collaborator; this module carries
//! its trait seam, its configuration, and the cancel-then-speak announcer.

pub mod announcer;

pub use announcer::{SpeechAnnouncer, SpeechConfig, SpeechSynthesizer};

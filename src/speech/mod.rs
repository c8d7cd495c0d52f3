//! Voice input/output around the chat exchange
//!
//! Speech recognition and synthesis are external collaborators. They sit
//! behind the [`capture::SpeechRecognizer`] and [`voice::SpeechSynthesizer`]
//! traits so backends are pluggable and tests can use stubs; the `voice`
//! feature provides subprocess adapters for both.

pub mod capture;
#[cfg(feature = "voice")]
pub mod engines;
pub mod voice;

pub use capture::{
    spawn_capture_worker, CaptureCommand, CaptureEvent, CaptureHandle, SpeechRecognizer,
};
pub use voice::{
    spawn_synthesis_worker, SpeakCommand, SpeakEvent, SpeechSynthesizer, SynthesisHandle,
    Utterance, VoiceInfo, VoicePicker,
};

//! Voice playback worker and voice selection
//!
//! The synthesis worker owns the synthesizer, reports the voice list
//! once it is available (engines may load it slowly), and then speaks
//! utterances one at a time. Voice selection lives in [`VoicePicker`],
//! owned by the UI state and re-evaluated whenever a voice list arrives.

use crate::{MoodchatError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const CHANNEL_BUFFER: usize = 10;

/// One available voice of the synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier passed back to the engine
    pub id: String,
    /// Human-readable name used for preference matching
    pub name: String,
}

/// One piece of text to speak
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    /// Engine voice id; `None` for the engine default
    pub voice: Option<String>,
    /// Rate multiplier (1.0 = engine default)
    pub rate: f32,
    /// Pitch (1.0 = engine default, range 0.0..=2.0)
    pub pitch: f32,
}

/// External speech-synthesis collaborator
pub trait SpeechSynthesizer: Send {
    /// Enumerate available voices; may be slow on first call
    fn voices(&mut self) -> Result<Vec<VoiceInfo>>;

    /// Speak one utterance to completion
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;
}

/// Commands accepted by the synthesis worker
#[derive(Debug, Clone)]
pub enum SpeakCommand {
    Speak(Utterance),
    Shutdown,
}

/// Events emitted by the synthesis worker
#[derive(Debug, Clone)]
pub enum SpeakEvent {
    /// The engine's voice list became available
    VoicesLoaded(Vec<VoiceInfo>),

    /// Synthesis failed for one utterance
    Error(String),

    /// The worker has shut down
    Shutdown,
}

/// Handle for the UI side of the synthesis worker
pub struct SynthesisHandle {
    pub command_tx: Sender<SpeakCommand>,
    pub event_rx: Receiver<SpeakEvent>,
    handle: Option<JoinHandle<()>>,
}

impl SynthesisHandle {
    /// Request shutdown and join the worker thread
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(SpeakCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the synthesis worker around a synthesizer
pub fn spawn_synthesis_worker(synthesizer: Box<dyn SpeechSynthesizer>) -> Result<SynthesisHandle> {
    let (command_tx, command_rx) = bounded::<SpeakCommand>(CHANNEL_BUFFER);
    let (event_tx, event_rx) = bounded::<SpeakEvent>(CHANNEL_BUFFER);

    let handle = thread::Builder::new()
        .name("moodchat-synthesis".to_string())
        .spawn(move || run_worker(synthesizer, command_rx, event_tx))
        .map_err(|e| MoodchatError::ChannelError(format!("spawn synthesis worker: {e}")))?;

    Ok(SynthesisHandle {
        command_tx,
        event_rx,
        handle: Some(handle),
    })
}

fn run_worker(
    mut synthesizer: Box<dyn SpeechSynthesizer>,
    command_rx: Receiver<SpeakCommand>,
    event_tx: Sender<SpeakEvent>,
) {
    info!("synthesis worker started");

    // The voice list loads asynchronously from the UI's point of view
    match synthesizer.voices() {
        Ok(voices) => {
            debug!("{} voices available", voices.len());
            if event_tx.send(SpeakEvent::VoicesLoaded(voices)).is_err() {
                return;
            }
        }
        Err(e) => {
            warn!("voice enumeration failed: {e}");
            let _ = event_tx.send(SpeakEvent::Error(e.to_string()));
        }
    }

    while let Ok(command) = command_rx.recv() {
        match command {
            SpeakCommand::Speak(utterance) => {
                if let Err(e) = synthesizer.speak(&utterance) {
                    warn!("synthesis failed: {e}");
                    if event_tx.send(SpeakEvent::Error(e.to_string())).is_err() {
                        break;
                    }
                }
            }
            SpeakCommand::Shutdown => break,
        }
    }

    let _ = event_tx.send(SpeakEvent::Shutdown);
    info!("synthesis worker stopped");
}

/// Voice selection policy, owned by the UI state.
///
/// Prefers a voice whose name contains the configured substring
/// (case-insensitive), falls back to the first available voice, and is
/// re-evaluated whenever a voice list arrives.
#[derive(Debug, Clone, Default)]
pub struct VoicePicker {
    preferred: Option<String>,
    selected: Option<VoiceInfo>,
}

impl VoicePicker {
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            preferred,
            selected: None,
        }
    }

    /// Re-evaluate the selection against a freshly loaded voice list
    pub fn on_voices_loaded(&mut self, voices: &[VoiceInfo]) {
        let preferred = self.preferred.as_deref().map(str::to_lowercase);
        self.selected = voices
            .iter()
            .find(|voice| {
                preferred
                    .as_deref()
                    .is_some_and(|p| voice.name.to_lowercase().contains(p))
            })
            .or_else(|| voices.first())
            .cloned();
    }

    pub fn selected(&self) -> Option<&VoiceInfo> {
        self.selected.as_ref()
    }

    /// Engine id of the selected voice, if any
    pub fn selected_id(&self) -> Option<String> {
        self.selected.as_ref().map(|voice| voice.id.clone())
    }
}

//! Application state management
//!
//! This module provides the central state for the Moodchat UI: the
//! conversation store, the input field, the voice-capture state machine,
//! and the channel endpoints of the background workers. All mutation
//! happens on the UI thread; workers are polled once per frame.

use crate::backend::{ChatReply, ExchangeCommand, ExchangeEvent, ExchangeHandle};
use crate::config::{AppConfig, GREETING};
use crate::messages::{ConversationStore, Message, MessageId, MessagePatch, Sentiment};
use crate::speech::{
    CaptureCommand, CaptureEvent, CaptureHandle, SpeakCommand, SpeakEvent, SynthesisHandle,
    Utterance, VoicePicker,
};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Voice capture state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Not capturing
    Idle,
    /// A capture session is active
    Listening,
}

/// Central application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Conversation history and session flags (thread-safe)
    pub store: ConversationStore,

    /// Current text input
    pub input_text: String,

    /// Voice capture state machine
    pub capture_state: CaptureState,

    /// Selected voice for spoken replies
    pub voice_picker: VoicePicker,

    /// User-facing notice (voice errors, unsupported capabilities)
    pub last_notice: Option<String>,

    /// Channel to send exchange commands
    pub exchange_tx: Option<Sender<ExchangeCommand>>,

    /// Channel to receive exchange events
    pub exchange_rx: Option<Receiver<ExchangeEvent>>,

    /// Channel to send capture commands
    pub capture_tx: Option<Sender<CaptureCommand>>,

    /// Channel to receive capture events
    pub capture_rx: Option<Receiver<CaptureEvent>>,

    /// Cancellation flag of the capture session in flight
    pub capture_cancel: Option<Arc<AtomicBool>>,

    /// Channel to send synthesis commands
    pub speak_tx: Option<Sender<SpeakCommand>>,

    /// Channel to receive synthesis events
    pub speak_rx: Option<Receiver<SpeakEvent>>,
}

impl AppState {
    /// Create a new application state seeded with the Bot greeting
    pub fn new(config: AppConfig) -> Self {
        let voice_picker = VoicePicker::new(config.voice.preferred_voice.clone());
        Self {
            config,
            store: ConversationStore::with_greeting(GREETING),
            input_text: String::new(),
            capture_state: CaptureState::Idle,
            voice_picker,
            last_notice: None,
            exchange_tx: None,
            exchange_rx: None,
            capture_tx: None,
            capture_rx: None,
            capture_cancel: None,
            speak_tx: None,
            speak_rx: None,
        }
    }

    /// Wire up the exchange worker
    pub fn connect_exchange(&mut self, handle: ExchangeHandle) {
        self.exchange_tx = Some(handle.command_tx);
        self.exchange_rx = Some(handle.event_rx);
    }

    /// Wire up the voice capture worker
    pub fn connect_capture(&mut self, handle: CaptureHandle) {
        self.capture_tx = Some(handle.command_tx);
        self.capture_rx = Some(handle.event_rx);
        self.capture_cancel = Some(handle.cancel);
    }

    /// Wire up the voice synthesis worker
    pub fn connect_synthesis(&mut self, handle: SynthesisHandle) {
        self.speak_tx = Some(handle.command_tx);
        self.speak_rx = Some(handle.event_rx);
    }

    /// Whether the microphone action can do anything at all
    pub fn voice_input_available(&self) -> bool {
        self.capture_tx.is_some()
    }

    /// Send the current input as one exchange.
    ///
    /// No-op when the trimmed input is empty or a request is already
    /// outstanding; history is append-only and gains exactly one User
    /// message per accepted send.
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() || self.store.awaiting_reply() || self.store.listening() {
            return;
        }

        let id = self.store.next_id();
        self.store.append(Message::user(id, text.clone()));
        self.input_text.clear();

        let dispatched = self
            .exchange_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ExchangeCommand::Send { id, text }).is_ok());

        if dispatched {
            self.store.set_awaiting_reply(true);
        } else {
            // Nothing will ever resolve this exchange; fail it now
            self.finish_exchange_failed(id, "exchange worker unavailable".to_string());
        }
    }

    /// Toggle voice capture: Idle starts a session, Listening cancels it
    pub fn toggle_voice_capture(&mut self) {
        if self.store.awaiting_reply() {
            return;
        }

        match self.capture_state {
            CaptureState::Idle => {
                if !self.voice_input_available() {
                    self.last_notice =
                        Some("Voice input is not supported on this system.".to_string());
                    return;
                }

                self.input_text.clear();
                self.capture_state = CaptureState::Listening;
                self.store.set_listening(true);
                if let Some(cancel) = &self.capture_cancel {
                    cancel.store(false, Ordering::SeqCst);
                }
                if let Some(tx) = &self.capture_tx {
                    let _ = tx.send(CaptureCommand::Start);
                }
            }
            CaptureState::Listening => {
                self.capture_state = CaptureState::Idle;
                self.store.set_listening(false);
                if let Some(cancel) = &self.capture_cancel {
                    cancel.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    /// Process incoming events from the worker channels
    pub fn poll_events(&mut self) {
        // Collect first, then process: handlers mutate state the
        // receivers borrow
        let exchange_events: Vec<ExchangeEvent> = self
            .exchange_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in exchange_events {
            self.handle_exchange_event(event);
        }

        let capture_events: Vec<CaptureEvent> = self
            .capture_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in capture_events {
            self.handle_capture_event(event);
        }

        let speak_events: Vec<SpeakEvent> = self
            .speak_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in speak_events {
            self.handle_speak_event(event);
        }
    }

    fn handle_exchange_event(&mut self, event: ExchangeEvent) {
        match event {
            ExchangeEvent::Reply { id, reply } => {
                debug!(%id, sentiment = %reply.sentiment, "exchange resolved");
                self.finish_exchange_resolved(id, reply);
            }
            ExchangeEvent::Failed { id, error } => {
                warn!(%id, "exchange failed: {error}");
                self.finish_exchange_failed(id, error);
            }
            ExchangeEvent::Shutdown => {
                self.exchange_tx = None;
            }
        }
    }

    fn handle_capture_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Started => {}
            CaptureEvent::Transcript(text) => {
                self.capture_state = CaptureState::Idle;
                self.store.set_listening(false);
                self.input_text = text;
                self.send_message();
            }
            CaptureEvent::Error(reason) => {
                self.capture_state = CaptureState::Idle;
                self.store.set_listening(false);
                self.last_notice = Some(format!("Voice capture failed: {reason}"));
            }
            CaptureEvent::Ended => {
                self.capture_state = CaptureState::Idle;
                self.store.set_listening(false);
            }
            CaptureEvent::Shutdown => {
                self.capture_state = CaptureState::Idle;
                self.store.set_listening(false);
                self.capture_tx = None;
                self.capture_cancel = None;
            }
        }
    }

    fn handle_speak_event(&mut self, event: SpeakEvent) {
        match event {
            SpeakEvent::VoicesLoaded(voices) => {
                self.voice_picker.on_voices_loaded(&voices);
                debug!(selected = ?self.voice_picker.selected(), "voice list loaded");
            }
            SpeakEvent::Error(reason) => {
                warn!("voice playback failed: {reason}");
                self.last_notice = Some("Voice playback failed. The reply is shown as text.".to_string());
            }
            SpeakEvent::Shutdown => {
                self.speak_tx = None;
            }
        }
    }

    /// Apply a successful exchange: finalize the sentiment, append the
    /// Bot reply, speak it when voice output is on
    fn finish_exchange_resolved(&mut self, id: MessageId, reply: ChatReply) {
        self.store.patch_by_id(
            id,
            MessagePatch::sentiment(Sentiment::resolved(&reply.sentiment, &reply.sentiment_emoji)),
        );

        let bot_id = self.store.next_id();
        self.store
            .append(Message::bot(bot_id, reply.chatbot_response.clone()));
        self.store.set_awaiting_reply(false);

        self.speak(reply.chatbot_response);
    }

    /// Apply a failed exchange: mark the User message and explain as the Bot
    fn finish_exchange_failed(&mut self, id: MessageId, error: String) {
        self.store
            .patch_by_id(id, MessagePatch::sentiment(Sentiment::Error));

        let bot_id = self.store.next_id();
        self.store
            .append(Message::bot(bot_id, format!("Connection failed: {error}")));
        self.store.set_awaiting_reply(false);
    }

    fn speak(&mut self, text: String) {
        if !self.config.voice.output_enabled {
            return;
        }
        let Some(tx) = &self.speak_tx else {
            return;
        };

        let utterance = Utterance {
            text,
            voice: self.voice_picker.selected_id(),
            rate: self.config.voice.rate,
            pitch: self.config.voice.pitch,
        };
        if tx.send(SpeakCommand::Speak(utterance)).is_err() {
            warn!("synthesis worker unavailable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Sender as MsgSender;
    use crate::speech::VoiceInfo;
    use crossbeam_channel::bounded;

    fn state_with_exchange() -> (
        AppState,
        Sender<ExchangeEvent>,
        Receiver<ExchangeCommand>,
    ) {
        let mut state = AppState::new(AppConfig::default());
        let (command_tx, command_rx) = bounded(10);
        let (event_tx, event_rx) = bounded(10);
        state.exchange_tx = Some(command_tx);
        state.exchange_rx = Some(event_rx);
        (state, event_tx, command_rx)
    }

    fn connect_capture_channels(
        state: &mut AppState,
    ) -> (Sender<CaptureEvent>, Receiver<CaptureCommand>, Arc<AtomicBool>) {
        let (command_tx, command_rx) = bounded(10);
        let (event_tx, event_rx) = bounded(10);
        let cancel = Arc::new(AtomicBool::new(false));
        state.capture_tx = Some(command_tx);
        state.capture_rx = Some(event_rx);
        state.capture_cancel = Some(Arc::clone(&cancel));
        (event_tx, command_rx, cancel)
    }

    fn sent_command(command_rx: &Receiver<ExchangeCommand>) -> (MessageId, String) {
        match command_rx.try_recv().expect("expected a dispatched command") {
            ExchangeCommand::Send { id, text } => (id, text),
            other => panic!("expected Send, got {other:?}"),
        }
    }

    #[test]
    fn test_send_appends_one_analyzing_user_message() {
        let (mut state, _event_tx, command_rx) = state_with_exchange();
        state.input_text = "  I love this  ".to_string();

        state.send_message();

        let messages = state.store.get_all();
        // Greeting plus the new User message
        assert_eq!(messages.len(), 2);
        let user = &messages[1];
        assert_eq!(user.sender, MsgSender::User);
        assert_eq!(user.text, "I love this");
        assert_eq!(user.sentiment, Some(Sentiment::Analyzing));

        assert!(state.input_text.is_empty());
        assert!(state.store.awaiting_reply());

        let (id, text) = sent_command(&command_rx);
        assert_eq!(id, user.id);
        assert_eq!(text, "I love this");
    }

    #[test]
    fn test_send_while_awaiting_is_noop() {
        let (mut state, _event_tx, command_rx) = state_with_exchange();
        state.store.set_awaiting_reply(true);
        state.input_text = "hello".to_string();

        state.send_message();

        assert_eq!(state.store.len(), 1);
        assert_eq!(state.input_text, "hello");
        assert!(state.store.awaiting_reply());
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_send_blank_input_is_noop() {
        let (mut state, _event_tx, command_rx) = state_with_exchange();
        state.input_text = "   ".to_string();

        state.send_message();

        assert_eq!(state.store.len(), 1);
        assert!(!state.store.awaiting_reply());
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_reply_patches_user_then_appends_bot() {
        let (mut state, event_tx, command_rx) = state_with_exchange();
        state.input_text = "I love this".to_string();
        state.send_message();
        let (id, _) = sent_command(&command_rx);

        event_tx
            .send(ExchangeEvent::Reply {
                id,
                reply: ChatReply {
                    sentiment: "positive".to_string(),
                    sentiment_emoji: "🙂".to_string(),
                    chatbot_response: "Glad to hear it!".to_string(),
                },
            })
            .unwrap();
        state.poll_events();

        let messages = state.store.get_all();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1].sentiment,
            Some(Sentiment::Resolved {
                label: "POSITIVE".to_string(),
                emoji: "🙂".to_string()
            })
        );
        let bot = &messages[2];
        assert_eq!(bot.sender, MsgSender::Bot);
        assert_eq!(bot.text, "Glad to hear it!");
        assert!(bot.sentiment.is_none());
        assert!(!state.store.awaiting_reply());
    }

    #[test]
    fn test_failure_marks_user_and_explains() {
        let (mut state, event_tx, command_rx) = state_with_exchange();
        state.input_text = "hello".to_string();
        state.send_message();
        let (id, _) = sent_command(&command_rx);

        event_tx
            .send(ExchangeEvent::Failed {
                id,
                error: "connection refused".to_string(),
            })
            .unwrap();
        state.poll_events();

        let messages = state.store.get_all();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sentiment, Some(Sentiment::Error));
        let bot = &messages[2];
        assert_eq!(bot.sender, MsgSender::Bot);
        assert!(bot.text.starts_with("Connection failed:"));
        assert!(bot.text.contains("connection refused"));
        assert!(!state.store.awaiting_reply());
    }

    #[test]
    fn test_dead_worker_fails_immediately() {
        let (mut state, _event_tx, command_rx) = state_with_exchange();
        drop(command_rx);
        state.input_text = "hello".to_string();

        state.send_message();

        let messages = state.store.get_all();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sentiment, Some(Sentiment::Error));
        assert!(messages[2].text.starts_with("Connection failed:"));
        assert!(!state.store.awaiting_reply());
    }

    #[test]
    fn test_voice_transcript_auto_submits_once() {
        let (mut state, _event_tx, command_rx) = state_with_exchange();
        let (capture_tx, _capture_command_rx, _cancel) = connect_capture_channels(&mut state);
        state.capture_state = CaptureState::Listening;
        state.store.set_listening(true);

        capture_tx
            .send(CaptureEvent::Transcript("test message".to_string()))
            .unwrap();
        state.poll_events();

        assert_eq!(state.capture_state, CaptureState::Idle);
        assert!(!state.store.listening());

        let messages = state.store.get_all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "test message");
        assert_eq!(messages[1].sentiment, Some(Sentiment::Analyzing));

        let (_, text) = sent_command(&command_rx);
        assert_eq!(text, "test message");
        // Exactly one send
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_capture_error_surfaces_notice() {
        let (mut state, _event_tx, _command_rx) = state_with_exchange();
        let (capture_tx, _capture_command_rx, _cancel) = connect_capture_channels(&mut state);
        state.capture_state = CaptureState::Listening;
        state.store.set_listening(true);

        capture_tx
            .send(CaptureEvent::Error("audio device busy".to_string()))
            .unwrap();
        state.poll_events();

        assert_eq!(state.capture_state, CaptureState::Idle);
        assert!(!state.store.listening());
        assert!(state
            .last_notice
            .as_deref()
            .is_some_and(|notice| notice.contains("audio device busy")));
        // The voice failure never touched history
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn test_toggle_without_recognizer_informs_user() {
        let mut state = AppState::new(AppConfig::default());

        state.toggle_voice_capture();

        assert_eq!(state.capture_state, CaptureState::Idle);
        assert!(!state.store.listening());
        assert!(state
            .last_notice
            .as_deref()
            .is_some_and(|notice| notice.contains("not supported")));
    }

    #[test]
    fn test_toggle_starts_then_cancels() {
        let mut state = AppState::new(AppConfig::default());
        let (_capture_tx, capture_command_rx, cancel) = connect_capture_channels(&mut state);
        state.input_text = "left over".to_string();

        state.toggle_voice_capture();
        assert_eq!(state.capture_state, CaptureState::Listening);
        assert!(state.store.listening());
        assert!(state.input_text.is_empty());
        assert!(!cancel.load(Ordering::SeqCst));
        assert!(matches!(
            capture_command_rx.try_recv(),
            Ok(CaptureCommand::Start)
        ));

        state.toggle_voice_capture();
        assert_eq!(state.capture_state, CaptureState::Idle);
        assert!(!state.store.listening());
        assert!(cancel.load(Ordering::SeqCst));
    }

    #[test]
    fn test_toggle_blocked_while_awaiting() {
        let mut state = AppState::new(AppConfig::default());
        let (_capture_tx, capture_command_rx, _cancel) = connect_capture_channels(&mut state);
        state.store.set_awaiting_reply(true);

        state.toggle_voice_capture();

        assert_eq!(state.capture_state, CaptureState::Idle);
        assert!(!state.store.listening());
        assert!(capture_command_rx.try_recv().is_err());
    }

    #[test]
    fn test_reply_is_spoken_with_selected_voice() {
        let (mut state, event_tx, command_rx) = state_with_exchange();
        let (speak_command_tx, speak_command_rx) = bounded(10);
        let (speak_event_tx, speak_event_rx) = bounded::<SpeakEvent>(10);
        state.speak_tx = Some(speak_command_tx);
        state.speak_rx = Some(speak_event_rx);
        state.config.voice.preferred_voice = Some("english".to_string());
        state.voice_picker = VoicePicker::new(Some("english".to_string()));

        speak_event_tx
            .send(SpeakEvent::VoicesLoaded(vec![
                VoiceInfo {
                    id: "af".to_string(),
                    name: "Afrikaans".to_string(),
                },
                VoiceInfo {
                    id: "en-gb".to_string(),
                    name: "English (GB)".to_string(),
                },
            ]))
            .unwrap();
        // The voice list arrives before any exchange resolves
        state.poll_events();
        assert_eq!(state.voice_picker.selected_id().as_deref(), Some("en-gb"));

        state.input_text = "I love this".to_string();
        state.send_message();
        let (id, _) = sent_command(&command_rx);
        event_tx
            .send(ExchangeEvent::Reply {
                id,
                reply: ChatReply {
                    sentiment: "POSITIVE".to_string(),
                    sentiment_emoji: "😊".to_string(),
                    chatbot_response: "Glad to hear it!".to_string(),
                },
            })
            .unwrap();
        state.poll_events();

        match speak_command_rx.try_recv().unwrap() {
            SpeakCommand::Speak(utterance) => {
                assert_eq!(utterance.text, "Glad to hear it!");
                assert_eq!(utterance.voice.as_deref(), Some("en-gb"));
            }
            other => panic!("expected Speak, got {other:?}"),
        }
    }

    #[test]
    fn test_voice_output_disabled_stays_silent() {
        let (mut state, event_tx, command_rx) = state_with_exchange();
        let (speak_command_tx, speak_command_rx) = bounded(10);
        state.speak_tx = Some(speak_command_tx);
        state.config.voice.output_enabled = false;

        state.input_text = "hello".to_string();
        state.send_message();
        let (id, _) = sent_command(&command_rx);
        event_tx
            .send(ExchangeEvent::Reply {
                id,
                reply: ChatReply {
                    sentiment: "NEGATIVE".to_string(),
                    sentiment_emoji: "🙁".to_string(),
                    chatbot_response: "Noted.".to_string(),
                },
            })
            .unwrap();
        state.poll_events();

        assert!(speak_command_rx.try_recv().is_err());
    }
}

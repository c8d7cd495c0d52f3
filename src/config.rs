//! Application configuration
//!
//! Provides centralized configuration for the backend exchange and the
//! optional voice features, with environment overrides.

use std::time::Duration;

/// Default chat endpoint of the sentiment backend
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/chat";

/// Greeting shown as the first Bot message of every session
pub const GREETING: &str =
    "Hello! I am a Sentiment Analysis Chatbot. Type a message and I will analyze the emotion.";

/// Configuration for the backend exchange
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Chat endpoint URL
    pub endpoint: String,

    /// Timeout for one complete request/response cycle
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BackendConfig {
    /// Create a configuration for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for voice input/output
#[derive(Clone, Debug)]
pub struct VoiceConfig {
    /// Whether Bot replies are spoken aloud
    pub output_enabled: bool,

    /// Preferred voice: first voice whose name contains this substring wins
    pub preferred_voice: Option<String>,

    /// Speech rate multiplier (1.0 = engine default)
    pub rate: f32,

    /// Speech pitch (1.0 = engine default, range 0.0..=2.0)
    pub pitch: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            output_enabled: true,
            preferred_voice: None,
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl VoiceConfig {
    /// Disable spoken replies
    pub fn without_output(mut self) -> Self {
        self.output_enabled = false;
        self
    }

    /// Set the preferred voice name substring
    pub fn with_preferred_voice(mut self, name: impl Into<String>) -> Self {
        self.preferred_voice = Some(name.into());
        self
    }

    /// Set the speech rate multiplier
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Set the speech pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }
}

/// Complete application configuration
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// Backend exchange configuration
    pub backend: BackendConfig,

    /// Voice configuration
    pub voice: VoiceConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// `MOODCHAT_ENDPOINT` overrides the chat endpoint,
    /// `MOODCHAT_VOICE=off` disables spoken replies, and
    /// `MOODCHAT_VOICE_NAME` sets the preferred voice substring.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("MOODCHAT_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.backend.endpoint = endpoint.trim().to_string();
            }
        }

        if let Ok(voice) = std::env::var("MOODCHAT_VOICE") {
            if voice.eq_ignore_ascii_case("off") || voice == "0" {
                config.voice.output_enabled = false;
            }
        }

        if let Ok(name) = std::env::var("MOODCHAT_VOICE_NAME") {
            if !name.trim().is_empty() {
                config.voice.preferred_voice = Some(name.trim().to_string());
            }
        }

        config
    }
}

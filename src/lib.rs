pub mod backend;
pub mod config;
pub mod messages;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum MoodchatError {
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Speech capture error: {0}")]
    CaptureError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for MoodchatError {
    fn from(e: std::io::Error) -> Self {
        MoodchatError::IOError(e.to_string())
    }
}

impl MoodchatError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // One failed exchange is terminal for that message only
            MoodchatError::TransportError(_) => true,
            MoodchatError::BackendError(_) => true,
            MoodchatError::MalformedReply(_) => true,
            // Voice failures abort only the voice action
            MoodchatError::CaptureError(_) => true,
            MoodchatError::SynthesisError(_) => true,
            // A closed channel means a worker is gone
            MoodchatError::ChannelError(_) => false,
            MoodchatError::ConfigError(_) => false,
            MoodchatError::IOError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            MoodchatError::TransportError(_) => {
                "Could not reach the chat backend. Please check your connection.".to_string()
            }
            MoodchatError::BackendError(_) => {
                "The chat backend rejected the request. Please try again.".to_string()
            }
            MoodchatError::MalformedReply(_) => {
                "The chat backend sent an unexpected reply. Please try again.".to_string()
            }
            MoodchatError::CaptureError(_) => {
                "Voice capture failed. Please try again or type your message.".to_string()
            }
            MoodchatError::SynthesisError(_) => {
                "Voice playback failed. The reply is shown as text.".to_string()
            }
            MoodchatError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            MoodchatError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            MoodchatError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodchatError>;

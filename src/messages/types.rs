use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique message identifier, strictly increasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// Sentiment status of a User message.
///
/// A User message starts at `Analyzing` and is patched exactly once to a
/// terminal value when the backend call resolves or fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    /// The backend call is still outstanding
    Analyzing,
    /// Terminal label from the backend, upper-cased, with its emoji
    Resolved { label: String, emoji: String },
    /// The backend call failed
    Error,
}

impl Sentiment {
    /// Build a terminal sentiment from the backend's raw label and emoji
    pub fn resolved(label: &str, emoji: &str) -> Self {
        Sentiment::Resolved {
            label: label.to_uppercase(),
            emoji: emoji.to_string(),
        }
    }

    /// Display label for the sentiment line under a bubble
    pub fn label(&self) -> &str {
        match self {
            Sentiment::Analyzing => "Analyzing...",
            Sentiment::Resolved { label, .. } => label,
            Sentiment::Error => "ERROR",
        }
    }

    /// Emoji accompanying a terminal sentiment
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Sentiment::Analyzing => None,
            Sentiment::Resolved { emoji, .. } => Some(emoji),
            Sentiment::Error => Some("⚠️"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Sentiment::Analyzing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    /// Present only on User messages that have been sent to the backend
    pub sentiment: Option<Sentiment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a User message pending sentiment analysis
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::User,
            text: text.into(),
            sentiment: Some(Sentiment::Analyzing),
            timestamp: Utc::now(),
        }
    }

    /// Create a Bot message; Bot messages carry no sentiment
    pub fn bot(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            text: text.into(),
            sentiment: None,
            timestamp: Utc::now(),
        }
    }
}

/// Partial update merged into a stored message by id.
///
/// Only the sentiment transition is permitted; message text is immutable
/// once appended.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub sentiment: Option<Sentiment>,
}

impl MessagePatch {
    pub fn sentiment(sentiment: Sentiment) -> Self {
        Self {
            sentiment: Some(sentiment),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Request body of the chat endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Success response body of the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// Sentiment label, e.g. "POSITIVE" or "negative"
    pub sentiment: String,

    /// Emoji accompanying the sentiment label
    pub sentiment_emoji: String,

    /// Conversational reply to show (and optionally speak) as the Bot
    pub chatbot_response: String,
}

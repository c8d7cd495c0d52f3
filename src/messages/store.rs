use super::types::{Message, MessageId, MessagePatch};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Ordered conversation history plus the two transient session flags.
///
/// Cloning yields another handle onto the same history. History is
/// append-only; the only permitted mutation is the sentiment patch
/// applied through [`ConversationStore::patch_by_id`].
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Arc<RwLock<Vec<Message>>>,
    id_seq: Arc<AtomicU64>,
    awaiting_reply: Arc<AtomicBool>,
    listening: Arc<AtomicBool>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            id_seq: Arc::new(AtomicU64::new(1)),
            awaiting_reply: Arc::new(AtomicBool::new(false)),
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a store seeded with the synthetic Bot greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let store = Self::new();
        let id = store.next_id();
        store.append(Message::bot(id, greeting));
        store
    }

    /// Mint the next message id; strictly increasing within the session
    pub fn next_id(&self) -> MessageId {
        MessageId(self.id_seq.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a message to the end of history
    pub fn append(&self, message: Message) {
        self.messages.write().push(message);
    }

    /// Merge `patch` into the message with matching `id`.
    ///
    /// A missing id is a silent no-op.
    pub fn patch_by_id(&self, id: MessageId, patch: MessagePatch) {
        let mut messages = self.messages.write();
        if let Some(message) = messages.iter_mut().find(|m| m.id == id) {
            if let Some(sentiment) = patch.sentiment {
                message.sentiment = Some(sentiment);
            }
        }
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply.load(Ordering::Relaxed)
    }

    pub fn set_awaiting_reply(&self, value: bool) {
        self.awaiting_reply.store(value, Ordering::Relaxed);
    }

    pub fn listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    pub fn set_listening(&self, value: bool) {
        self.listening.store(value, Ordering::Relaxed);
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::types::{Sender, Sentiment};

    #[test]
    fn test_append_preserves_order() {
        let store = ConversationStore::new();
        for text in ["one", "two", "three"] {
            let id = store.next_id();
            store.append(Message::user(id, text));
        }

        let messages = store.get_all();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, "one");
        assert_eq!(messages[1].text, "two");
        assert_eq!(messages[2].text, "three");
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let store = ConversationStore::new();
        let a = store.next_id();
        let b = store.next_id();
        let c = store.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_patch_by_id_finalizes_sentiment_in_place() {
        let store = ConversationStore::new();
        let first = store.next_id();
        store.append(Message::user(first, "I love this"));
        let second = store.next_id();
        store.append(Message::bot(second, "Glad to hear it!"));

        store.patch_by_id(first, MessagePatch::sentiment(Sentiment::resolved("positive", "🙂")));

        let messages = store.get_all();
        // Patch never changes position
        assert_eq!(messages[0].id, first);
        assert_eq!(
            messages[0].sentiment,
            Some(Sentiment::Resolved {
                label: "POSITIVE".to_string(),
                emoji: "🙂".to_string()
            })
        );
        assert!(messages[1].sentiment.is_none());
    }

    #[test]
    fn test_patch_missing_id_is_noop() {
        let store = ConversationStore::new();
        let id = store.next_id();
        store.append(Message::user(id, "hello"));

        store.patch_by_id(MessageId(999), MessagePatch::sentiment(Sentiment::Error));

        let messages = store.get_all();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sentiment, Some(Sentiment::Analyzing));
    }

    #[test]
    fn test_flags_default_false() {
        let store = ConversationStore::new();
        assert!(!store.awaiting_reply());
        assert!(!store.listening());

        store.set_awaiting_reply(true);
        store.set_listening(true);
        assert!(store.awaiting_reply());
        assert!(store.listening());

        store.set_awaiting_reply(false);
        store.set_listening(false);
        assert!(!store.awaiting_reply());
        assert!(!store.listening());
    }

    #[test]
    fn test_greeting_seeds_history() {
        let store = ConversationStore::with_greeting("Hello!");
        let messages = store.get_all();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Bot);
        assert_eq!(messages[0].text, "Hello!");
        assert!(messages[0].sentiment.is_none());
    }

    #[test]
    fn test_clone_shares_history() {
        let store = ConversationStore::new();
        let other = store.clone();
        let id = store.next_id();
        other.append(Message::user(id, "shared"));
        assert_eq!(store.len(), 1);
    }
}

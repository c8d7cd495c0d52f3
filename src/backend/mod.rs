//! Exchange with the external sentiment-analysis/chat backend
//!
//! One exchange is a single POST of the user's text and the structured
//! reply (sentiment label, emoji, conversational response). The network
//! round trip runs on a dedicated worker thread so the UI never blocks.

pub mod client;
pub mod types;
pub mod worker;

pub use client::BackendClient;
pub use types::{ChatReply, ChatRequest};
pub use worker::{spawn_exchange_worker, ExchangeCommand, ExchangeEvent, ExchangeHandle};

//! Exchange worker thread
//!
//! Owns the HTTP client and a current-thread tokio runtime, draining a
//! bounded command channel and emitting one event per exchange. The UI
//! polls the event channel each frame; combined with the awaiting-reply
//! precondition this keeps exchanges strictly one at a time.

use super::client::BackendClient;
use super::types::ChatReply;
use crate::config::BackendConfig;
use crate::messages::MessageId;
use crate::{MoodchatError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

const CHANNEL_BUFFER: usize = 10;

/// Commands accepted by the exchange worker
#[derive(Debug, Clone)]
pub enum ExchangeCommand {
    /// Perform one exchange for the User message with the given id
    Send { id: MessageId, text: String },

    /// Shut the worker down
    Shutdown,
}

/// Events emitted by the exchange worker
#[derive(Debug, Clone)]
pub enum ExchangeEvent {
    /// The backend replied; patch the User message and append the Bot reply
    Reply { id: MessageId, reply: ChatReply },

    /// The exchange failed; `error` carries the underlying detail
    Failed { id: MessageId, error: String },

    /// The worker has shut down
    Shutdown,
}

/// Handle for the UI side of the exchange worker
pub struct ExchangeHandle {
    pub command_tx: Sender<ExchangeCommand>,
    pub event_rx: Receiver<ExchangeEvent>,
    handle: Option<JoinHandle<()>>,
}

impl ExchangeHandle {
    /// Request shutdown and join the worker thread
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(ExchangeCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the exchange worker for the given backend configuration
pub fn spawn_exchange_worker(config: BackendConfig) -> Result<ExchangeHandle> {
    let (command_tx, command_rx) = bounded::<ExchangeCommand>(CHANNEL_BUFFER);
    let (event_tx, event_rx) = bounded::<ExchangeEvent>(CHANNEL_BUFFER);

    let client = BackendClient::new(config)?;

    let handle = thread::Builder::new()
        .name("moodchat-exchange".to_string())
        .spawn(move || run_worker(client, command_rx, event_tx))
        .map_err(|e| MoodchatError::ChannelError(format!("spawn exchange worker: {e}")))?;

    Ok(ExchangeHandle {
        command_tx,
        event_rx,
        handle: Some(handle),
    })
}

fn run_worker(
    client: BackendClient,
    command_rx: Receiver<ExchangeCommand>,
    event_tx: Sender<ExchangeEvent>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build exchange runtime: {e}");
            let _ = event_tx.send(ExchangeEvent::Shutdown);
            return;
        }
    };

    info!("exchange worker started");

    while let Ok(command) = command_rx.recv() {
        match command {
            ExchangeCommand::Send { id, text } => {
                debug!(%id, "exchange started");
                let event = match runtime.block_on(client.exchange(&text)) {
                    Ok(reply) => ExchangeEvent::Reply { id, reply },
                    Err(e) => {
                        warn!(%id, "exchange failed: {e}");
                        ExchangeEvent::Failed {
                            id,
                            error: e.to_string(),
                        }
                    }
                };

                // UI gone, nothing left to report to
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            ExchangeCommand::Shutdown => break,
        }
    }

    let _ = event_tx.send(ExchangeEvent::Shutdown);
    info!("exchange worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_worker_reports_failure_for_unreachable_backend() {
        // Nothing listens on this port; the exchange must fail, not hang
        let config = BackendConfig::new("http://127.0.0.1:1/api/chat")
            .with_timeout(Duration::from_secs(2));
        let worker = spawn_exchange_worker(config).unwrap();

        worker
            .command_tx
            .send(ExchangeCommand::Send {
                id: MessageId(1),
                text: "hello".to_string(),
            })
            .unwrap();

        let event = worker
            .event_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        match event {
            ExchangeEvent::Failed { id, error } => {
                assert_eq!(id, MessageId(1));
                assert!(!error.is_empty());
            }
            other => panic!("expected Failed, got {other:?}"),
        }

        worker.shutdown();
    }

    #[test]
    fn test_worker_shutdown_emits_event() {
        let worker = spawn_exchange_worker(BackendConfig::default()).unwrap();
        let event_rx = worker.event_rx.clone();
        worker.shutdown();

        let event = event_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, ExchangeEvent::Shutdown));
    }
}

//! Voice capture worker
//!
//! One capture session produces at most one final transcript. The worker
//! owns the recognizer and runs one blocking recognition per Start
//! command; the shared cancel flag is the only way to interrupt a
//! recognition already in flight, so user-cancel goes through
//! [`CaptureHandle::stop`] rather than the command channel.

use crate::{MoodchatError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const CHANNEL_BUFFER: usize = 10;

/// External speech-recognition collaborator.
///
/// `recognize` blocks until a final transcript, a natural end without
/// one (`Ok(None)`), an error, or until `cancelled` is observed set.
/// Cancellation must also yield `Ok(None)`.
pub trait SpeechRecognizer: Send {
    fn recognize(&mut self, cancelled: &AtomicBool) -> Result<Option<String>>;
}

/// Commands accepted by the capture worker
#[derive(Debug, Clone)]
pub enum CaptureCommand {
    /// Begin one capture session
    Start,

    /// Shut the worker down
    Shutdown,
}

/// Events emitted by the capture worker
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// Capture has started
    Started,

    /// A final transcript was recognized
    Transcript(String),

    /// Recognition failed
    Error(String),

    /// The session ended without a transcript (cancel or silence)
    Ended,

    /// The worker has shut down
    Shutdown,
}

/// Handle for the UI side of the capture worker
pub struct CaptureHandle {
    pub command_tx: Sender<CaptureCommand>,
    pub event_rx: Receiver<CaptureEvent>,
    pub cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    /// Begin a capture session
    pub fn start(&self) {
        self.cancel.store(false, Ordering::SeqCst);
        let _ = self.command_tx.send(CaptureCommand::Start);
    }

    /// Cancel the session in flight; the worker emits `Ended`
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Request shutdown and join the worker thread
    pub fn shutdown(mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(CaptureCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the capture worker around a recognizer
pub fn spawn_capture_worker(recognizer: Box<dyn SpeechRecognizer>) -> Result<CaptureHandle> {
    let (command_tx, command_rx) = bounded::<CaptureCommand>(CHANNEL_BUFFER);
    let (event_tx, event_rx) = bounded::<CaptureEvent>(CHANNEL_BUFFER);
    let cancel = Arc::new(AtomicBool::new(false));

    let worker_cancel = Arc::clone(&cancel);
    let handle = thread::Builder::new()
        .name("moodchat-capture".to_string())
        .spawn(move || run_worker(recognizer, command_rx, event_tx, worker_cancel))
        .map_err(|e| MoodchatError::ChannelError(format!("spawn capture worker: {e}")))?;

    Ok(CaptureHandle {
        command_tx,
        event_rx,
        cancel,
        handle: Some(handle),
    })
}

fn run_worker(
    mut recognizer: Box<dyn SpeechRecognizer>,
    command_rx: Receiver<CaptureCommand>,
    event_tx: Sender<CaptureEvent>,
    cancel: Arc<AtomicBool>,
) {
    info!("capture worker started");

    while let Ok(command) = command_rx.recv() {
        match command {
            CaptureCommand::Start => {
                if event_tx.send(CaptureEvent::Started).is_err() {
                    break;
                }

                let event = match recognizer.recognize(&cancel) {
                    Ok(Some(text)) if !text.trim().is_empty() => {
                        debug!("transcript: {text:?}");
                        CaptureEvent::Transcript(text)
                    }
                    Ok(_) => CaptureEvent::Ended,
                    Err(e) => {
                        warn!("recognition failed: {e}");
                        CaptureEvent::Error(e.to_string())
                    }
                };

                if event_tx.send(event).is_err() {
                    break;
                }
            }
            CaptureCommand::Shutdown => break,
        }
    }

    let _ = event_tx.send(CaptureEvent::Shutdown);
    info!("capture worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FixedRecognizer(Option<String>);

    impl SpeechRecognizer for FixedRecognizer {
        fn recognize(&mut self, _cancelled: &AtomicBool) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    impl SpeechRecognizer for FailingRecognizer {
        fn recognize(&mut self, _cancelled: &AtomicBool) -> Result<Option<String>> {
            Err(MoodchatError::CaptureError("microphone unplugged".into()))
        }
    }

    fn next_event(handle: &CaptureHandle) -> CaptureEvent {
        handle
            .event_rx
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_transcript_follows_started() {
        let handle =
            spawn_capture_worker(Box::new(FixedRecognizer(Some("test message".into())))).unwrap();
        handle.start();

        assert!(matches!(next_event(&handle), CaptureEvent::Started));
        match next_event(&handle) {
            CaptureEvent::Transcript(text) => assert_eq!(text, "test message"),
            other => panic!("expected Transcript, got {other:?}"),
        }

        handle.shutdown();
    }

    #[test]
    fn test_no_result_ends_session() {
        let handle = spawn_capture_worker(Box::new(FixedRecognizer(None))).unwrap();
        handle.start();

        assert!(matches!(next_event(&handle), CaptureEvent::Started));
        assert!(matches!(next_event(&handle), CaptureEvent::Ended));

        handle.shutdown();
    }

    #[test]
    fn test_blank_transcript_ends_session() {
        let handle = spawn_capture_worker(Box::new(FixedRecognizer(Some("   ".into())))).unwrap();
        handle.start();

        assert!(matches!(next_event(&handle), CaptureEvent::Started));
        assert!(matches!(next_event(&handle), CaptureEvent::Ended));

        handle.shutdown();
    }

    #[test]
    fn test_recognition_error_is_reported() {
        let handle = spawn_capture_worker(Box::new(FailingRecognizer)).unwrap();
        handle.start();

        assert!(matches!(next_event(&handle), CaptureEvent::Started));
        match next_event(&handle) {
            CaptureEvent::Error(reason) => assert!(reason.contains("microphone unplugged")),
            other => panic!("expected Error, got {other:?}"),
        }

        handle.shutdown();
    }
}

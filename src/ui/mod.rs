//! GUI implementation with egui/eframe
//!
//! This module provides the desktop user interface for Moodchat using
//! the eframe framework.

mod app;
mod components;
pub mod state;
pub mod theme;

pub use app::MoodchatApp;
pub use state::{AppState, CaptureState};
pub use theme::Theme;

use crate::backend::spawn_exchange_worker;
use crate::config::AppConfig;
use tracing::error;

/// Run the Moodchat application
pub fn run(config: AppConfig) -> eframe::Result<()> {
    let mut state = AppState::new(config);

    // Exchange worker; without it every send fails immediately with a
    // connection-failed bubble
    match spawn_exchange_worker(state.config.backend.clone()) {
        Ok(handle) => state.connect_exchange(handle),
        Err(e) => {
            error!("exchange worker unavailable: {e}");
            state.last_notice = Some(e.user_message());
        }
    }

    #[cfg(feature = "voice")]
    spawn_voice_workers(&mut state);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 720.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Moodchat"),
        ..Default::default()
    };

    eframe::run_native(
        "Moodchat",
        options,
        Box::new(|cc| Ok(Box::new(MoodchatApp::new(cc, state)))),
    )
}

#[cfg(feature = "voice")]
fn spawn_voice_workers(state: &mut AppState) {
    use crate::speech::engines::{CommandRecognizer, EspeakSynthesizer};
    use crate::speech::{spawn_capture_worker, spawn_synthesis_worker};
    use tracing::{info, warn};

    match CommandRecognizer::detect() {
        Some(recognizer) => match spawn_capture_worker(Box::new(recognizer)) {
            Ok(handle) => state.connect_capture(handle),
            Err(e) => warn!("capture worker unavailable: {e}"),
        },
        None => info!("voice capture unavailable (no recorder/transcriber on PATH)"),
    }

    if state.config.voice.output_enabled {
        match EspeakSynthesizer::detect() {
            Some(synthesizer) => match spawn_synthesis_worker(Box::new(synthesizer)) {
                Ok(handle) => state.connect_synthesis(handle),
                Err(e) => warn!("synthesis worker unavailable: {e}"),
            },
            None => info!("voice playback unavailable (no espeak on PATH)"),
        }
    }
}

//! Main application struct and eframe integration
//!
//! This module contains the main MoodchatApp that implements eframe::App.

use crate::ui::components::{InputBar, MessageList};
use crate::ui::state::{AppState, CaptureState};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};

/// Main Moodchat application
pub struct MoodchatApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
}

impl MoodchatApp {
    /// Create a new Moodchat application
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self { state, theme }
    }

    /// Show the top header bar
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Moodchat")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Sentiment Chatbot 💬")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let status = if self.state.store.awaiting_reply() {
                            Some(("Analyzing...", self.theme.warning))
                        } else if self.state.capture_state == CaptureState::Listening {
                            Some(("Listening...", self.theme.listening))
                        } else {
                            None
                        };

                        if let Some((label, color)) = status {
                            ui.label(RichText::new(label).size(12.0).color(color));
                        }
                    });
                });
            });
    }

    /// Show the bottom input area, with the current notice above it
    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    self.show_notice(ui);
                    InputBar::new(&mut self.state, &self.theme).show(ui);
                });
            });
    }

    fn show_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.state.last_notice.clone() else {
            return;
        };

        egui::Frame::none()
            .fill(self.theme.warning.gamma_multiply(0.15))
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&notice).size(12.0).color(self.theme.warning));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").on_hover_text("Dismiss").clicked() {
                            self.state.last_notice = None;
                        }
                    });
                });
            });
        ui.add_space(self.theme.spacing_sm);
    }

    /// Show the main content area (message list)
    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for MoodchatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll worker events
        self.state.poll_events();

        // Render UI
        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);

        // Keep polling while something is in flight
        if self.state.store.awaiting_reply() || self.state.capture_state != CaptureState::Idle {
            ctx.request_repaint();
        }
    }
}

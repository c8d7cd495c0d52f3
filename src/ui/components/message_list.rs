//! Message list component
//!
//! Displays the conversation as sender-aligned bubbles, tinted by the
//! sentiment of each User message.

use crate::messages::{Message, Sender};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText};

/// Message list component
pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.store.get_all();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    for message in &messages {
                        self.show_message(ui, message);
                        ui.add_space(self.theme.spacing_sm);
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = matches!(message.sender, Sender::User);

        let text_color = if is_user {
            Color32::WHITE
        } else {
            self.theme.text_primary
        };

        // Align messages based on sender
        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            // Sender label
            ui.label(
                RichText::new(if is_user { "You" } else { "Bot" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            // Message bubble
            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(self.theme.bubble_fill(message))
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    ui.label(RichText::new(&message.text).color(text_color));

                    // Sentiment line for User messages only
                    if let Some(sentiment) = &message.sentiment {
                        if is_user {
                            let line = match sentiment.emoji() {
                                Some(emoji) => {
                                    format!("Sentiment: {} {emoji}", sentiment.label())
                                }
                                None => format!("Sentiment: {}", sentiment.label()),
                            };
                            ui.label(
                                RichText::new(line)
                                    .size(11.0)
                                    .italics()
                                    .color(text_color.gamma_multiply(0.85)),
                            );
                        }
                    }
                });

            // Timestamp
            let time_str = message.timestamp.format("%H:%M").to_string();
            ui.label(
                RichText::new(time_str)
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }
}

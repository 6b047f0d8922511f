use egui::{Button, ComboBox, Margin, RichText, Slider, TopBottomPanel, Ui};
use log::{error, info};

use race_replay::api::RequestKind;
use race_replay::session::{SessionType, load_session_file, save_session_file};

use super::{PALETTE_CYAN, ReplayApp};

const SESSION_FILE_EXTENSIONS: [&str; 1] = ["json"];

impl ReplayApp {
    pub(crate) fn controls_view(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("session_selector")
            .frame(egui::Frame::default().inner_margin(Margin::same(6)))
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    self.session_selector(ui);
                    ui.separator();
                    self.session_files(ui);
                    ui.separator();
                    ui.label(RichText::new(&self.browser.session_title).strong());
                });
            });

        TopBottomPanel::bottom("playback_controls")
            .frame(egui::Frame::default().inner_margin(Margin::same(6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| self.playback_controls(ui));
            });
    }

    fn session_selector(&mut self, ui: &mut Ui) {
        let previous_year = self.browser.selected_year;
        ComboBox::from_label("Year")
            .selected_text(self.browser.selected_year.map(|y| y.to_string()).unwrap_or_default())
            .show_ui(ui, |ui| {
                for year in &self.browser.years {
                    ui.selectable_value(&mut self.browser.selected_year, Some(*year), year.to_string());
                }
            });
        if self.browser.selected_year != previous_year {
            self.year_changed();
        }

        let round_text = if self.loader.is_loading(RequestKind::Rounds) {
            "Loading…".to_string()
        } else {
            self.browser.selected_round
                .and_then(|n| self.browser.rounds.iter().find(|r| r.round_number == n))
                .map(|r| r.label())
                .unwrap_or_default()
        };
        ComboBox::from_label("Round")
            .selected_text(round_text)
            .width(220.0)
            .show_ui(ui, |ui| {
                for round in &self.browser.rounds {
                    ui.selectable_value(
                        &mut self.browser.selected_round,
                        Some(round.round_number),
                        round.label(),
                    );
                }
            });

        ComboBox::from_label("Session")
            .selected_text(self.browser.session_type.label())
            .show_ui(ui, |ui| {
                for session_type in SessionType::ALL {
                    ui.selectable_value(&mut self.browser.session_type, session_type, session_type.label());
                }
            });

        let loading = self.loader.is_loading(RequestKind::Session);
        if ui.add_enabled(!loading, Button::new("Load")).clicked() {
            self.load_selected();
        }
        if loading {
            ui.spinner();
            ui.label("Loading session…");
        }
    }

    fn session_files(&mut self, ui: &mut Ui) {
        if ui.button("📂 Open…").clicked()
            && let Some(path) = rfd::FileDialog::new()
                .add_filter("Session", &SESSION_FILE_EXTENSIONS)
                .pick_file()
        {
            match load_session_file(&path) {
                Ok(session) => self.browser.show_session(session, None),
                Err(e) => {
                    error!("Could not open {:?}: {}", path, e);
                    self.browser.alert_load_failure(&e.to_string());
                }
            }
        }

        let has_session = self.browser.replay.session().is_some();
        if ui.add_enabled(has_session, Button::new("💾 Save…")).clicked()
            && let Some(session) = self.browser.replay.session()
            && let Some(path) = rfd::FileDialog::new()
                .add_filter("Session", &SESSION_FILE_EXTENSIONS)
                .set_file_name("session.json")
                .save_file()
        {
            match save_session_file(&path, session) {
                Ok(()) => info!("Session written to {:?}", path),
                Err(e) => {
                    error!("Could not save {:?}: {}", path, e);
                    self.browser.alert_save_failure(&e.to_string());
                }
            }
        }
    }

    fn playback_controls(&mut self, ui: &mut Ui) {
        let play_label = if self.browser.replay.clock().is_playing() { "Pause" } else { "Play" };
        if ui.button(play_label).clicked() {
            self.browser.replay.toggle_playback();
        }

        if ui.button("−").clicked() {
            self.browser.replay.speed_down();
        }
        ui.label(self.browser.replay.clock().speed_label());
        if ui.button("+").clicked() {
            self.browser.replay.speed_up();
        }

        let frame_count = self.browser.replay.frame_count();
        if frame_count > 0 {
            let mut position = self.browser.replay.clock().frame_index();
            let timeline = Slider::new(&mut position, 0.0..=(frame_count - 1) as f64)
                .show_value(false)
                .trailing_fill(true);
            ui.spacing_mut().slider_width = (ui.available_width() - 120.0).max(100.0);
            if ui.add(timeline).changed() {
                self.browser.replay.seek(position);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("{:.0} fps", self.fps())).color(PALETTE_CYAN));
        });
    }
}

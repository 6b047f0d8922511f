mod browser;
mod canvas;
pub(crate) mod config;
mod controls;
mod leaderboard_view;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Datelike;
use config::AppConfig;
use egui::{Color32, Key, ViewportCommand, Visuals, style::Widgets};
use log::error;
use rfd::{MessageButtons, MessageDialog};
use simple_moving_average::{SMA, SumTreeSMA};

use browser::SessionBrowser;
use race_replay::api::{ReplayApi, SessionLoader};
use race_replay::session::{Session, SessionRequest};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(13, 13, 13);
pub(crate) const PALETTE_GREEN: Color32 = Color32::from_rgb(26, 46, 26);
pub(crate) const PALETTE_MOSS: Color32 = Color32::from_rgb(45, 74, 45);
pub(crate) const PALETTE_CYAN: Color32 = Color32::from_rgb(0, 200, 255);

const DEFAULT_WINDOW_TRANSPARENCY: u8 = 191;
const LOADING_REPAINT_MS: u64 = 100;
const FPS_WINDOW: usize = 30;

/// `ReplayApp` browses the replay API and animates the selected session.
///
/// All state lives here and is only touched from the UI thread; network calls
/// run through the [`SessionLoader`].
pub(crate) struct ReplayApp {
    browser: SessionBrowser,
    loader: SessionLoader,
    frame_times_ms: SumTreeSMA<f32, f32, FPS_WINDOW>,
    last_update: Option<Instant>,
}

impl ReplayApp {
    pub(crate) fn new(
        cc: &eframe::CreationContext<'_>,
        app_config: AppConfig,
        api: Arc<dyn ReplayApi>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_CYAN,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_GREEN,
            panel_fill: PALETTE_BLACK,
            selection: egui::style::Selection {
                bg_fill: PALETTE_MOSS,
                ..Default::default()
            },
            window_fill: Color32::from_rgba_premultiplied(
                PALETTE_BLACK.r(),
                PALETTE_BLACK.g(),
                PALETTE_BLACK.b(),
                DEFAULT_WINDOW_TRANSPARENCY,
            ),
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        let mut loader = SessionLoader::new(api);
        loader.request_years();

        Self {
            browser: SessionBrowser::new(app_config),
            loader,
            frame_times_ms: SumTreeSMA::new(),
            last_update: None,
        }
    }

    /// Starts on a session read from disk.
    pub(crate) fn with_session(mut self, session: Session) -> Self {
        self.browser.show_session(session, None);
        self
    }

    /// Loads a session as soon as the window opens.
    pub(crate) fn with_request(mut self, request: SessionRequest) -> Self {
        self.browser.select(&request);
        self.loader.request_session(request);
        self
    }

    fn handle_loader_events(&mut self) {
        let current_year = chrono::Local::now().year();
        for event in self.loader.poll() {
            if let Some(year) = self.browser.apply(event, current_year) {
                self.loader.request_rounds(year);
            }
        }
    }

    pub(crate) fn year_changed(&mut self) {
        if let Some(year) = self.browser.year_changed() {
            self.loader.request_rounds(year);
        }
    }

    pub(crate) fn load_selected(&mut self) {
        if let Some(request) = self.browser.selected_request() {
            self.loader.request_session(request);
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (toggle, faster, slower) = ctx.input(|i| {
            (
                i.key_pressed(Key::Space),
                i.key_pressed(Key::Plus) || i.key_pressed(Key::Equals),
                i.key_pressed(Key::Minus),
            )
        });
        let replay = &mut self.browser.replay;
        if toggle {
            replay.toggle_playback();
        }
        if faster {
            replay.speed_up();
        }
        if slower {
            replay.speed_down();
        }
    }

    fn record_frame_time(&mut self, now: Instant) {
        if let Some(last) = self.last_update {
            self.frame_times_ms
                .add_sample(now.saturating_duration_since(last).as_secs_f32() * 1000.0);
        }
        self.last_update = Some(now);
    }

    pub(crate) fn fps(&self) -> f32 {
        let average = self.frame_times_ms.get_average();
        if average > 0.0 { 1000.0 / average } else { 0.0 }
    }

    fn show_pending_alert(&mut self) {
        if let Some(alert) = self.browser.pending_alert.take() {
            MessageDialog::new()
                .set_level(alert.level)
                .set_title(alert.title)
                .set_description(alert.description)
                .set_buttons(MessageButtons::Ok)
                .show();
            // time spent in the modal dialog is not playback time
            self.browser.replay.resync_clock();
            self.last_update = None;
        }
    }
}

impl eframe::App for ReplayApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let browser = &mut self.browser;
        browser.app_config.speed_index = browser.replay.clock().speed_index();
        if let Err(e) = browser.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let title_before = self.browser.session_title.clone();

        self.handle_loader_events();
        self.handle_keyboard(ctx);
        self.browser.replay.tick(now);
        self.record_frame_time(now);

        self.controls_view(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let canvas = self.canvas_view(ui);
                self.leaderboard_view(ctx, canvas);
            });

        if self.browser.session_title != title_before {
            ctx.send_viewport_cmd(ViewportCommand::Title(format!(
                "Race Replay - {}",
                self.browser.session_title
            )));
        }

        if self.browser.pending_alert.is_some() {
            self.show_pending_alert();
        }

        if self.browser.replay.take_needs_repaint() {
            ctx.request_repaint();
        } else if self.loader.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(LOADING_REPAINT_MS));
        }
    }
}

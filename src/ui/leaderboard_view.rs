use egui::{Align2, Area, Color32, CornerRadius, Id, Margin, Order, Rect, RichText, Sense, vec2};
use egui_extras::{Column, TableBuilder};

use super::{PALETTE_BLACK, ReplayApp};

const OVERLAY_INSET: f32 = 10.0;
const ROW_HEIGHT: f32 = 18.0;
const SWATCH_SIZE: f32 = 10.0;

impl ReplayApp {
    /// Standings for the displayed frame, drawn over the reserved right margin
    /// of the canvas.
    pub(crate) fn leaderboard_view(&self, ctx: &egui::Context, canvas: Rect) {
        let standings = self.browser.replay.standings();
        if standings.is_empty() {
            return;
        }
        let width = (self.browser.replay.layout().right_margin - 2.0 * OVERLAY_INSET).max(80.0);

        Area::new(Id::new("leaderboard"))
            .order(Order::Foreground)
            .pivot(Align2::RIGHT_TOP)
            .fixed_pos(canvas.right_top() + vec2(-OVERLAY_INSET, OVERLAY_INSET))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::default()
                    .fill(PALETTE_BLACK.gamma_multiply(0.8))
                    .corner_radius(CornerRadius::same(6))
                    .inner_margin(Margin::same(8))
                    .show(ui, |ui| {
                        ui.set_width(width);
                        ui.label(RichText::new("Leaderboard").strong().color(Color32::WHITE));
                        TableBuilder::new(ui)
                            .striped(true)
                            .column(Column::exact(24.0))
                            .column(Column::exact(SWATCH_SIZE + 6.0))
                            .column(Column::exact(40.0))
                            .column(Column::remainder().clip(true))
                            .body(|mut body| {
                                for standing in &standings {
                                    body.row(ROW_HEIGHT, |mut row| {
                                        row.col(|ui| {
                                            ui.label(standing.position.to_string());
                                        });
                                        row.col(|ui| {
                                            let (rect, _) = ui.allocate_exact_size(
                                                vec2(SWATCH_SIZE, SWATCH_SIZE),
                                                Sense::hover(),
                                            );
                                            ui.painter().circle_filled(
                                                rect.center(),
                                                SWATCH_SIZE / 2.0,
                                                standing.color,
                                            );
                                        });
                                        row.col(|ui| {
                                            ui.label(RichText::new(&standing.code).strong());
                                        });
                                        row.col(|ui| {
                                            if let Some(name) = &standing.full_name {
                                                ui.label(RichText::new(name).weak());
                                            }
                                        });
                                    });
                                }
                            });
                    });
            });
    }
}

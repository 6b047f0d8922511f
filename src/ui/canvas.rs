use egui::{Align2, Color32, CornerRadius, FontId, Mesh, Painter, Pos2, Rect, Sense, Shape, Stroke, Ui};

use race_replay::replay::ViewTransform;
use race_replay::session::{DEFAULT_CAR_COLOR, Frame, Session, Track, WorldPoint};

const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(0x0d, 0x0d, 0x0d);
const TRACK_SURFACE: Color32 = Color32::from_rgb(0x1a, 0x2e, 0x1a);
const TRACK_EDGE: Color32 = Color32::from_rgb(0x2d, 0x4a, 0x2d);
const DRS_ZONE: Color32 = Color32::from_rgba_unmultiplied_const(0, 200, 255, 153);
const CENTER_LINE: Color32 = Color32::from_rgba_unmultiplied_const(255, 255, 255, 40);

const TRACK_EDGE_WIDTH: f32 = 2.0;
const DRS_ZONE_WIDTH: f32 = 4.0;
const CENTER_LINE_WIDTH: f32 = 1.0;
const CENTER_LINE_DASH: f32 = 6.0;
const CENTER_LINE_GAP: f32 = 8.0;
const CAR_RADIUS: f32 = 8.0;
const CAR_OUTLINE_WIDTH: f32 = 1.5;
const CAR_LABEL_OFFSET: f32 = 10.0;
const HUD_OFFSET_X: f32 = 20.0;
const HUD_OFFSET_Y: f32 = 24.0;

impl super::ReplayApp {
    /// Paints the track map and returns the rectangle it was drawn in.
    pub(crate) fn canvas_view(&mut self, ui: &mut Ui) -> Rect {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
        let rect = response.rect;
        self.browser.replay.set_viewport(rect);

        painter.rect_filled(rect, CornerRadius::ZERO, CANVAS_BACKGROUND);
        let Some(session) = self.browser.replay.session() else {
            return rect;
        };

        if let (Some(track), Some(transform)) = (session.track.as_ref(), self.browser.replay.transform()) {
            paint_track(&painter, track, transform);
        }

        if let Some(frame) = self.browser.replay.current_frame()
            && let Some(transform) = self.browser.replay.transform()
        {
            paint_cars(&painter, frame, session, transform);
        }

        if let Some(hud) = self.browser.replay.hud_text() {
            painter.text(
                Pos2::new(rect.left() + HUD_OFFSET_X, rect.bottom() - HUD_OFFSET_Y),
                Align2::LEFT_BOTTOM,
                hud,
                FontId::proportional(16.0),
                Color32::WHITE,
            );
        }
        rect
    }
}

fn paint_track(painter: &Painter, track: &Track, transform: &ViewTransform) {
    let polygon: Vec<Pos2> = track
        .surface_polygon()
        .into_iter()
        .map(|p| transform.world_to_screen(p))
        .collect();

    // egui only fills convex paths, the ring is filled as a strip of triangles
    painter.add(Shape::mesh(ring_mesh(&polygon, TRACK_SURFACE)));

    let edge = Stroke::new(TRACK_EDGE_WIDTH, TRACK_EDGE);
    let n = polygon.len() / 2;
    if n >= 2 {
        painter.add(Shape::closed_line(polygon[..n].to_vec(), edge));
        painter.add(Shape::closed_line(polygon[n..].to_vec(), edge));
    }

    let center: Vec<Pos2> = track
        .center_line()
        .into_iter()
        .map(|p| transform.world_to_screen(p))
        .collect();
    if center.len() >= 2 {
        painter.extend(Shape::dashed_line(
            &center,
            Stroke::new(CENTER_LINE_WIDTH, CENTER_LINE),
            CENTER_LINE_DASH,
            CENTER_LINE_GAP,
        ));
    }

    let drs = Stroke::new(DRS_ZONE_WIDTH, DRS_ZONE);
    for zone in &track.drs_zones {
        painter.line_segment(
            [
                transform.world_to_screen(zone.start),
                transform.world_to_screen(zone.end),
            ],
            drs,
        );
    }
}

/// Triangulates a ring given as one edge forward followed by the other edge
/// reversed, closing the gap between the last and the first points.
fn ring_mesh(polygon: &[Pos2], color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    let n = polygon.len() / 2;
    if n < 2 {
        return mesh;
    }
    for pos in &polygon[..2 * n] {
        mesh.colored_vertex(*pos, color);
    }

    let last = (2 * n - 1) as u32;
    for i in 0..n {
        let j = (i + 1) % n;
        let (a, b) = (i as u32, j as u32);
        let (c, d) = (last - b, last - a);
        mesh.add_triangle(a, b, d);
        mesh.add_triangle(b, c, d);
    }
    mesh
}

fn paint_cars(painter: &Painter, frame: &Frame, session: &Session, transform: &ViewTransform) {
    let outline = Stroke::new(CAR_OUTLINE_WIDTH, Color32::WHITE);
    for (code, state) in frame.drivers.iter() {
        let pos = transform.world_to_screen(WorldPoint::new(state.x, state.y));
        painter.circle(pos, CAR_RADIUS, session.driver_color(code, DEFAULT_CAR_COLOR), outline);
        painter.text(
            pos + egui::vec2(0.0, CAR_LABEL_OFFSET),
            Align2::CENTER_TOP,
            code,
            FontId::proportional(10.0),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_mesh_covers_every_segment() {
        // inner square then outer square reversed
        let polygon = vec![
            Pos2::new(1.0, 1.0),
            Pos2::new(2.0, 1.0),
            Pos2::new(2.0, 2.0),
            Pos2::new(1.0, 2.0),
            Pos2::new(0.0, 3.0),
            Pos2::new(3.0, 3.0),
            Pos2::new(3.0, 0.0),
            Pos2::new(0.0, 0.0),
        ];

        let mesh = ring_mesh(&polygon, TRACK_SURFACE);

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 4 * 2 * 3);
        assert!(mesh.indices.iter().all(|i| (*i as usize) < mesh.vertices.len()));
        // first quad joins inner 0 and 1 with outer 0 (index 7) and outer 1 (index 6)
        assert_eq!(&mesh.indices[..6], &[0, 1, 7, 1, 6, 7]);
    }

    #[test]
    fn test_ring_mesh_needs_two_points_per_edge() {
        let mesh = ring_mesh(&[Pos2::ZERO, Pos2::new(1.0, 1.0)], TRACK_SURFACE);
        assert!(mesh.is_empty());
    }
}

// World to screen mapping for the track map

use egui::{Pos2, Rect};
use log::debug;

use crate::session::{TrackBounds, WorldPoint};

/// Fraction of the visible area kept free on every side of the track
pub const DEFAULT_PADDING: f32 = 0.08;
/// Space reserved on the right of the canvas for the leaderboard overlay
pub const DEFAULT_RIGHT_MARGIN: f32 = 260.0;

/// Fixed layout of the canvas around the track map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLayout {
    pub left_margin: f32,
    pub right_margin: f32,
    pub padding: f32,
}

impl Default for ViewLayout {
    fn default() -> Self {
        Self {
            left_margin: 0.0,
            right_margin: DEFAULT_RIGHT_MARGIN,
            padding: DEFAULT_PADDING,
        }
    }
}

impl ViewLayout {
    /// Part of the viewport the track is fitted into
    pub fn visible_area(&self, viewport: Rect) -> Rect {
        let inner_width = (viewport.width() - self.left_margin - self.right_margin).max(1.0);
        Rect::from_min_size(
            Pos2::new(viewport.min.x + self.left_margin, viewport.min.y),
            egui::vec2(inner_width, viewport.height().max(1.0)),
        )
    }
}

/// Uniform scale plus optional rotation around the track centre.
///
/// Computed once per session load or viewport change, read on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    center: WorldPoint,
    rotation_rad: f64,
    sin_rot: f64,
    cos_rot: f64,
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl ViewTransform {
    /// Fits the track bounds into the viewport, keeping the aspect ratio.
    ///
    /// The scale is the smaller of the horizontal and vertical fits so the
    /// padding holds on both axes. Degenerate bounds are treated as one world
    /// unit wide.
    pub fn fit(
        bounds: &TrackBounds,
        rotation_deg: f64,
        viewport: Rect,
        layout: &ViewLayout,
    ) -> Self {
        let center = bounds.center();
        let rotation_rad = rotation_deg.to_radians();

        let visible = layout.visible_area(viewport);
        let usable = 1.0 - 2.0 * layout.padding as f64;
        let world_width = bounds.width().max(1.0);
        let world_height = bounds.height().max(1.0);
        let scale_x = visible.width() as f64 * usable / world_width;
        let scale_y = visible.height() as f64 * usable / world_height;
        let scale = scale_x.min(scale_y);

        let screen_center = visible.center();
        let translate_x = screen_center.x as f64 - scale * center.x;
        let translate_y = screen_center.y as f64 - scale * center.y;

        debug!(
            "Fitted track ({:.1}x{:.1}) into {:.0}x{:.0} px, scale {:.5}, rotation {:.1} deg",
            bounds.width(),
            bounds.height(),
            visible.width(),
            visible.height(),
            scale,
            rotation_deg
        );

        Self {
            center,
            rotation_rad,
            sin_rot: rotation_rad.sin(),
            cos_rot: rotation_rad.cos(),
            scale,
            translate_x,
            translate_y,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn world_to_screen(&self, point: WorldPoint) -> Pos2 {
        let mut wx = point.x - self.center.x;
        let mut wy = point.y - self.center.y;
        if self.rotation_rad != 0.0 {
            let rx = wx * self.cos_rot - wy * self.sin_rot;
            let ry = wx * self.sin_rot + wy * self.cos_rot;
            wx = rx;
            wy = ry;
        }
        wx += self.center.x;
        wy += self.center.y;

        Pos2::new(
            (self.scale * wx + self.translate_x) as f32,
            (self.scale * wy + self.translate_y) as f32,
        )
    }

    /// Inverse of [`ViewTransform::world_to_screen`]
    pub fn screen_to_world(&self, pos: Pos2) -> WorldPoint {
        let mut wx = (pos.x as f64 - self.translate_x) / self.scale - self.center.x;
        let mut wy = (pos.y as f64 - self.translate_y) / self.scale - self.center.y;
        if self.rotation_rad != 0.0 {
            let rx = wx * self.cos_rot + wy * self.sin_rot;
            let ry = -wx * self.sin_rot + wy * self.cos_rot;
            wx = rx;
            wy = ry;
        }
        WorldPoint::new(wx + self.center.x, wy + self.center.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport(width: f32, height: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(width, height))
    }

    fn bounds(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> TrackBounds {
        TrackBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    #[test]
    fn test_scale_uses_tighter_axis() {
        let layout = ViewLayout {
            right_margin: 0.0,
            padding: 0.0,
            ..Default::default()
        };
        let transform = ViewTransform::fit(
            &bounds(0.0, 1000.0, 0.0, 100.0),
            0.0,
            viewport(500.0, 500.0),
            &layout,
        );

        assert!((transform.scale() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_padding_is_respected() {
        let layout = ViewLayout::default();
        let transform = ViewTransform::fit(
            &bounds(0.0, 1000.0, 0.0, 1000.0),
            0.0,
            viewport(1260.0, 1000.0),
            &layout,
        );

        let top_left = transform.world_to_screen(WorldPoint::new(0.0, 0.0));
        let bottom_right = transform.world_to_screen(WorldPoint::new(1000.0, 1000.0));

        assert!((top_left.x - 80.0).abs() < 1e-3);
        assert!((top_left.y - 80.0).abs() < 1e-3);
        assert!((bottom_right.x - 920.0).abs() < 1e-3);
        assert!((bottom_right.y - 920.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_turns_around_track_centre() {
        let layout = ViewLayout {
            right_margin: 0.0,
            padding: 0.0,
            ..Default::default()
        };
        let transform = ViewTransform::fit(
            &bounds(-100.0, 100.0, -100.0, 100.0),
            90.0,
            viewport(200.0, 200.0),
            &layout,
        );

        // (100, 0) rotated by 90 degrees lands on (0, 100)
        let pos = transform.world_to_screen(WorldPoint::new(100.0, 0.0));
        assert!((pos.x - 100.0).abs() < 1e-3);
        assert!((pos.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_viewport_offset_is_honoured() {
        let layout = ViewLayout::default();
        let offset = Rect::from_min_size(Pos2::new(30.0, 50.0), egui::vec2(800.0, 600.0));
        let transform = ViewTransform::fit(&bounds(0.0, 10.0, 0.0, 10.0), 0.0, offset, &layout);

        let center = transform.world_to_screen(WorldPoint::new(5.0, 5.0));
        assert!((center.x - (30.0 + 270.0)).abs() < 1e-3);
        assert!((center.y - (50.0 + 300.0)).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_bounds_do_not_blow_up() {
        let transform = ViewTransform::fit(
            &bounds(5.0, 5.0, 5.0, 5.0),
            0.0,
            viewport(800.0, 600.0),
            &ViewLayout::default(),
        );

        assert!(transform.scale().is_finite());
        assert!(transform.scale() > 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_bounds_centre_maps_to_visible_centre(
            x_min in -10_000.0f64..10_000.0,
            y_min in -10_000.0f64..10_000.0,
            width in 1.0f64..20_000.0,
            height in 1.0f64..20_000.0,
            rotation in -180.0f64..180.0,
            canvas_w in 400.0f32..3000.0,
            canvas_h in 200.0f32..2000.0,
        ) {
            let layout = ViewLayout::default();
            let track = bounds(x_min, x_min + width, y_min, y_min + height);
            let canvas = viewport(canvas_w, canvas_h);
            let transform = ViewTransform::fit(&track, rotation, canvas, &layout);

            let mapped = transform.world_to_screen(track.center());
            let expected = layout.visible_area(canvas).center();

            prop_assert!((mapped.x - expected.x).abs() < 0.05);
            prop_assert!((mapped.y - expected.y).abs() < 0.05);
        }

        #[test]
        fn prop_screen_to_world_inverts_mapping(
            x in -5_000.0f64..5_000.0,
            y in -5_000.0f64..5_000.0,
            rotation in -180.0f64..180.0,
        ) {
            let transform = ViewTransform::fit(
                &bounds(-5_000.0, 5_000.0, -5_000.0, 5_000.0),
                rotation,
                viewport(1600.0, 900.0),
                &ViewLayout::default(),
            );

            let back = transform.screen_to_world(transform.world_to_screen(WorldPoint::new(x, y)));
            // screen positions are f32, allow for the rounding at this scale
            prop_assert!((back.x - x).abs() < 0.5);
            prop_assert!((back.y - y).abs() < 0.5);
        }
    }
}

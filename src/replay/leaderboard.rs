use egui::Color32;
use itertools::Itertools;

use crate::session::{Frame, Session};

/// Leaderboard swatch colour for drivers without a known colour
pub const DEFAULT_SWATCH_COLOR: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    /// 1-based position
    pub position: usize,
    pub code: String,
    pub color: Color32,
    pub distance: f64,
    pub full_name: Option<String>,
}

/// Ranks the drivers of `frame` by cumulative distance, furthest first.
///
/// Drivers without a distance count as zero. Equal distances keep the order
/// in which the frame lists the drivers.
pub fn standings(frame: &Frame, session: &Session) -> Vec<Standing> {
    frame
        .drivers
        .iter()
        .map(|(code, state)| (code, state.distance()))
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .enumerate()
        .map(|(i, (code, distance))| Standing {
            position: i + 1,
            code: code.to_string(),
            color: session.driver_color(code, DEFAULT_SWATCH_COLOR),
            distance,
            full_name: session.driver_full_name(code),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DriverState;
    use proptest::prelude::*;

    fn frame_with(distances: &[(&str, Option<f64>)]) -> Frame {
        Frame {
            t: 0.0,
            lap: 1,
            drivers: distances
                .iter()
                .map(|(code, dist)| {
                    (
                        code.to_string(),
                        DriverState {
                            x: 0.0,
                            y: 0.0,
                            dist: *dist,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_standings_ordered_by_distance() {
        let frame = frame_with(&[("HAM", Some(100.0)), ("VER", Some(300.0)), ("LEC", Some(200.0))]);
        let session = Session::default();

        let table = standings(&frame, &session);
        let codes: Vec<&str> = table.iter().map(|s| s.code.as_str()).collect();

        assert_eq!(codes, vec!["VER", "LEC", "HAM"]);
        assert_eq!(table[0].position, 1);
        assert_eq!(table[2].position, 3);
    }

    #[test]
    fn test_missing_distance_counts_as_zero() {
        let frame = frame_with(&[("SAI", None), ("PIA", Some(5.0)), ("ALO", Some(-1.0))]);

        let table = standings(&frame, &Session::default());
        let codes: Vec<&str> = table.iter().map(|s| s.code.as_str()).collect();

        assert_eq!(codes, vec!["PIA", "SAI", "ALO"]);
        assert_eq!(table[1].distance, 0.0);
    }

    #[test]
    fn test_ties_keep_source_order() {
        let frame = frame_with(&[("BOT", Some(50.0)), ("ZHO", Some(50.0)), ("ALB", Some(50.0))]);

        let table = standings(&frame, &Session::default());
        let codes: Vec<&str> = table.iter().map(|s| s.code.as_str()).collect();

        assert_eq!(codes, vec!["BOT", "ZHO", "ALB"]);
    }

    #[test]
    fn test_unknown_colour_uses_swatch_fallback() {
        let frame = frame_with(&[("NOR", Some(1.0)), ("RUS", Some(2.0))]);
        let mut session = Session::default();
        session
            .driver_colors
            .insert("NOR".to_string(), "#ff8000".to_string());

        let table = standings(&frame, &session);

        assert_eq!(table[0].color, DEFAULT_SWATCH_COLOR);
        assert_eq!(table[1].color, Color32::from_rgb(0xff, 0x80, 0x00));
    }

    #[test]
    fn test_empty_frame_gives_empty_table() {
        assert!(standings(&Frame::default(), &Session::default()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_distance_is_non_increasing(
            distances in prop::collection::vec(prop::option::of(-1_000.0f64..400_000.0), 0..25)
        ) {
            let codes: Vec<String> = (0..distances.len()).map(|i| format!("D{i:02}")).collect();
            let entries: Vec<(&str, Option<f64>)> = codes
                .iter()
                .map(String::as_str)
                .zip(distances.iter().copied())
                .collect();
            let frame = frame_with(&entries);

            let table = standings(&frame, &Session::default());

            prop_assert_eq!(table.len(), entries.len());
            for pair in table.windows(2) {
                prop_assert!(pair[0].distance >= pair[1].distance);
                prop_assert_eq!(pair[0].position + 1, pair[1].position);
            }
        }
    }
}

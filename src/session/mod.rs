// Session data model as served by the replay API

pub mod file;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use egui::Color32;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ReplayError;

pub use file::{load_session_file, save_session_file};

/// Car marker colour used when a driver has no colour in the session
pub const DEFAULT_CAR_COLOR: Color32 = Color32::from_rgb(0x80, 0x80, 0x80);

/// A point in track (world) coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DrsZone {
    pub start: WorldPoint,
    pub end: WorldPoint,
}

/// Axis aligned extent of the track in world coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl TrackBounds {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// Track geometry: the two edges of the tarmac plus DRS zones
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Track {
    pub center_x: Vec<f64>,
    pub center_y: Vec<f64>,
    pub inner_x: Vec<f64>,
    pub inner_y: Vec<f64>,
    pub outer_x: Vec<f64>,
    pub outer_y: Vec<f64>,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub drs_zones: Vec<DrsZone>,
}

impl Track {
    pub fn bounds(&self) -> TrackBounds {
        TrackBounds {
            x_min: self.x_min,
            x_max: self.x_max,
            y_min: self.y_min,
            y_max: self.y_max,
        }
    }

    pub fn inner_edge(&self) -> Vec<WorldPoint> {
        zip_points(&self.inner_x, &self.inner_y)
    }

    pub fn outer_edge(&self) -> Vec<WorldPoint> {
        zip_points(&self.outer_x, &self.outer_y)
    }

    pub fn center_line(&self) -> Vec<WorldPoint> {
        zip_points(&self.center_x, &self.center_y)
    }

    /// Outline of the tarmac ring: the inner edge walked forward followed by
    /// the outer edge walked backwards.
    ///
    /// Both edges are truncated to the same number of points, so vertex `i`
    /// of the inner edge faces vertex `len - 1 - i` of the returned polygon.
    pub fn surface_polygon(&self) -> Vec<WorldPoint> {
        let inner = self.inner_edge();
        let outer = self.outer_edge();
        let n = inner.len().min(outer.len());

        let mut polygon = Vec::with_capacity(n * 2);
        polygon.extend_from_slice(&inner[..n]);
        polygon.extend(outer[..n].iter().rev());
        polygon
    }
}

fn zip_points(xs: &[f64], ys: &[f64]) -> Vec<WorldPoint> {
    xs.iter()
        .zip(ys.iter())
        .map(|(x, y)| WorldPoint::new(*x, *y))
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SessionInfo {
    pub event_name: String,
    pub circuit_name: String,
    pub country: String,
    pub year: Option<i32>,
    pub round: Option<u32>,
    pub date: String,
    pub total_laps: Option<u32>,
    pub circuit_length_m: Option<f64>,
    /// Rotation applied to the track map, degrees
    pub circuit_rotation: Option<f64>,
}

/// Position of a single car in one frame
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DriverState {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Cumulative race distance in meters
    #[serde(default)]
    pub dist: Option<f64>,
}

impl DriverState {
    pub fn distance(&self) -> f64 {
        self.dist.unwrap_or(0.0)
    }
}

/// Per-driver states of a frame, kept in the order the server sent them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverPositions(Vec<(String, DriverState)>);

impl DriverPositions {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DriverState)> {
        self.0.iter().map(|(code, state)| (code.as_str(), state))
    }

    pub fn get(&self, code: &str) -> Option<&DriverState> {
        self.0.iter().find(|(c, _)| c == code).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DriverState)> for DriverPositions {
    fn from_iter<I: IntoIterator<Item = (String, DriverState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for DriverPositions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, state) in &self.0 {
            map.serialize_entry(code, state)?;
        }
        map.end()
    }
}

struct DriverPositionsVisitor;

impl<'de> Visitor<'de> for DriverPositionsVisitor {
    type Value = DriverPositions;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of driver codes to driver states")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((code, state)) = access.next_entry::<String, DriverState>()? {
            entries.push((code, state));
        }
        Ok(DriverPositions(entries))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(DriverPositions::default())
    }
}

impl<'de> Deserialize<'de> for DriverPositions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DriverPositionsVisitor)
    }
}

/// One timestamped snapshot of all cars
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Frame {
    /// Elapsed session time in seconds
    pub t: f64,
    pub lap: u32,
    pub drivers: DriverPositions,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DriverInfo {
    pub number: String,
    pub abbreviation: String,
    pub first_name: String,
    pub last_name: String,
}

impl DriverInfo {
    pub fn full_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// A complete recorded session, replaced wholesale on every load
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Session {
    pub track: Option<Track>,
    pub session_info: SessionInfo,
    pub frames: Vec<Frame>,
    pub driver_colors: HashMap<String, String>,
    pub total_laps: Option<u32>,
    pub drivers: Vec<String>,
    pub driver_info: HashMap<String, DriverInfo>,
}

impl Session {
    pub fn total_laps(&self) -> u32 {
        self.session_info
            .total_laps
            .or(self.total_laps)
            .unwrap_or(0)
    }

    pub fn circuit_rotation(&self) -> f64 {
        self.session_info.circuit_rotation.unwrap_or(0.0)
    }

    /// Colour for a driver's car, `fallback` when unknown or unparsable.
    pub fn driver_color(&self, code: &str, fallback: Color32) -> Color32 {
        self.driver_colors
            .get(code)
            .and_then(|hex| Color32::from_hex(hex).ok())
            .unwrap_or(fallback)
    }

    pub fn driver_full_name(&self, code: &str) -> Option<String> {
        self.driver_info.get(code).and_then(DriverInfo::full_name)
    }

    /// Extent of every car position over the whole session, `None` without cars.
    ///
    /// Stands in for the track bounds when a session comes without geometry.
    pub fn car_bounds(&self) -> Option<TrackBounds> {
        self.frames
            .iter()
            .flat_map(|frame| frame.drivers.iter())
            .fold(None, |bounds: Option<TrackBounds>, (_, state)| {
                Some(match bounds {
                    None => TrackBounds {
                        x_min: state.x,
                        x_max: state.x,
                        y_min: state.y,
                        y_max: state.y,
                    },
                    Some(b) => TrackBounds {
                        x_min: b.x_min.min(state.x),
                        x_max: b.x_max.max(state.x),
                        y_min: b.y_min.min(state.y),
                        y_max: b.y_max.max(state.y),
                    },
                })
            })
    }
}

/// Session kinds the replay viewer can animate
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionType {
    #[default]
    Race,
    Sprint,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::Race, SessionType::Sprint];

    /// Code used by the replay API
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Race => "R",
            SessionType::Sprint => "S",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Race => "Race",
            SessionType::Sprint => "Sprint",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionType {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" | "RACE" => Ok(SessionType::Race),
            "S" | "SPRINT" => Ok(SessionType::Sprint),
            other => Err(ReplayError::InvalidSelection {
                reason: format!("Unsupported session type '{other}', use R or S"),
            }),
        }
    }
}

/// One race weekend of a season
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoundInfo {
    pub round_number: u32,
    #[serde(default)]
    pub event_name: String,
}

impl RoundInfo {
    pub fn label(&self) -> String {
        format!("{}: {}", self.round_number, self.event_name)
    }
}

/// Identifies a session on the replay API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub year: i32,
    pub round_number: u32,
    pub session_type: SessionType,
}

impl SessionRequest {
    /// Builds a request from the current UI selection.
    pub fn from_selection(
        year: Option<i32>,
        round_number: Option<u32>,
        session_type: SessionType,
    ) -> Result<Self, ReplayError> {
        match (year, round_number) {
            (Some(year), Some(round_number)) if year > 0 && round_number > 0 => Ok(Self {
                year,
                round_number,
                session_type,
            }),
            _ => Err(ReplayError::InvalidSelection {
                reason: "Please select year and round.".to_string(),
            }),
        }
    }
}

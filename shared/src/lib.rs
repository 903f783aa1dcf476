use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A single sample along a route. Elevation may be missing when neither the
/// recording device nor an elevation model provided one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, elevation: Option<f64>) -> Self {
        Self {
            lat,
            lon,
            elevation,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Opaque caller data (opening hours, category, ...) passed through untouched.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl PointOfInterest {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPoi {
    #[serde(flatten)]
    pub poi: PointOfInterest,
    pub distance_to_route: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Anchor {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Hard => "Hard",
            Difficulty::VeryHard => "Very Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a route starts relative to the configured anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLocation {
    /// The route has no points.
    Unknown,
    /// Every anchor is farther than the configured threshold.
    Other,
    Named(String),
}

impl StartLocation {
    pub fn label(&self) -> &str {
        match self {
            StartLocation::Unknown => "Unknown",
            StartLocation::Other => "Other",
            StartLocation::Named(name) => name,
        }
    }
}

impl fmt::Display for StartLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StartLocation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for StartLocation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(match label.as_str() {
            "Unknown" => StartLocation::Unknown,
            "Other" => StartLocation::Other,
            _ => StartLocation::Named(label),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub difficulty: Difficulty,
    pub start_location: StartLocation,
    #[serde(default)]
    pub nearby_pois: Vec<NearbyPoi>,
}

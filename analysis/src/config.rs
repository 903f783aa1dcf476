use serde::{Deserialize, Serialize};

use crate::elevation::Method;
use crate::error::{EngineError, Result};

pub const DEFAULT_INDEX_WINDOW: usize = 3;
pub const DEFAULT_DISTANCE_WINDOW_M: f64 = 25.0;
pub const DEFAULT_MOVING_AVERAGE_THRESHOLD_M: f64 = 1.0;
pub const DEFAULT_DISTANCE_THRESHOLD_M: f64 = 2.0;
pub const DEFAULT_POI_RADIUS_M: f64 = 2_000.0;
pub const DEFAULT_UNKNOWN_THRESHOLD_M: f64 = 10_000.0;
/// Climb rate above which a route counts as hilly. Tuned against reference
/// gains, not derived from anything physical.
pub const DEFAULT_BLEND_RATIO_M_PER_KM: f64 = 11.0;

/// Tunables for every engine operation. Missing fields in a JSON document
/// fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub method: Method,
    /// Moving-average window, in points.
    pub index_window: usize,
    /// Distance-window radius along the path, in meters.
    pub distance_window_m: f64,
    pub moving_average_threshold_m: f64,
    pub distance_threshold_m: f64,
    pub poi_radius_m: f64,
    pub unknown_threshold_m: f64,
    pub blend_ratio_m_per_km: f64,
    pub difficulty_bands: DifficultyBands,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            index_window: DEFAULT_INDEX_WINDOW,
            distance_window_m: DEFAULT_DISTANCE_WINDOW_M,
            moving_average_threshold_m: DEFAULT_MOVING_AVERAGE_THRESHOLD_M,
            distance_threshold_m: DEFAULT_DISTANCE_THRESHOLD_M,
            poi_radius_m: DEFAULT_POI_RADIUS_M,
            unknown_threshold_m: DEFAULT_UNKNOWN_THRESHOLD_M,
            blend_ratio_m_per_km: DEFAULT_BLEND_RATIO_M_PER_KM,
            difficulty_bands: DifficultyBands::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.index_window < 1 {
            return Err(EngineError::invalid(
                "index_window",
                "window must contain at least one point",
            ));
        }
        if !self.distance_window_m.is_finite() || self.distance_window_m <= 0.0 {
            return Err(EngineError::invalid(
                "distance_window_m",
                format!("must be a positive distance, got {}", self.distance_window_m),
            ));
        }
        non_negative("moving_average_threshold_m", self.moving_average_threshold_m)?;
        non_negative("distance_threshold_m", self.distance_threshold_m)?;
        non_negative("poi_radius_m", self.poi_radius_m)?;
        non_negative("unknown_threshold_m", self.unknown_threshold_m)?;
        non_negative("blend_ratio_m_per_km", self.blend_ratio_m_per_km)?;
        self.difficulty_bands.validate()
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

/// Lower edge of a difficulty band on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandEdge {
    pub distance_km: f64,
    pub gain_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyBands {
    pub moderate: BandEdge,
    pub hard: BandEdge,
    pub very_hard: BandEdge,
}

impl Default for DifficultyBands {
    fn default() -> Self {
        Self {
            moderate: BandEdge {
                distance_km: 30.0,
                gain_m: 300.0,
            },
            hard: BandEdge {
                distance_km: 70.0,
                gain_m: 1_000.0,
            },
            very_hard: BandEdge {
                distance_km: 100.0,
                gain_m: 2_000.0,
            },
        }
    }
}

impl DifficultyBands {
    pub fn validate(&self) -> Result<()> {
        let edges = [self.moderate, self.hard, self.very_hard];
        for edge in edges {
            non_negative("difficulty_bands", edge.distance_km)?;
            non_negative("difficulty_bands", edge.gain_m)?;
        }
        for pair in edges.windows(2) {
            if pair[1].distance_km <= pair[0].distance_km || pair[1].gain_m <= pair[0].gain_m {
                return Err(EngineError::invalid(
                    "difficulty_bands",
                    "band edges must increase from moderate to very hard",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_index_window_is_rejected() {
        let config = EngineConfig {
            index_window: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration {
                field: "index_window",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_distance_window_is_rejected() {
        for bad in [0.0, -5.0, f64::NAN] {
            let config = EngineConfig {
                distance_window_m: bad,
                ..EngineConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = EngineConfig {
            distance_threshold_m: -1.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlapping_bands_are_rejected() {
        let mut config = EngineConfig::default();
        config.difficulty_bands.hard.gain_m = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"method":"distance_smooth_threshold","poi_radius_m":500}"#)
                .unwrap();
        assert_eq!(config.method, Method::DistanceSmoothThreshold);
        assert_eq!(config.poi_radius_m, 500.0);
        assert_eq!(config.index_window, DEFAULT_INDEX_WINDOW);
        assert_eq!(config.blend_ratio_m_per_km, DEFAULT_BLEND_RATIO_M_PER_KM);
    }
}

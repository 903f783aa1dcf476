use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::geo::path_distance_m;
use crate::models::GeoPoint;
use crate::smoothing::{distance_window_average, moving_average, ElevationSample};
use crate::threshold::{accumulate_gain, positive_delta_sum};

/// Source of modeled ground elevation, typically a DEM owned and cached by
/// the caller.
pub trait ElevationLookup: Send + Sync {
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64>;
}

impl<F> ElevationLookup for F
where
    F: Fn(f64, f64) -> Option<f64> + Send + Sync,
{
    fn elevation(&self, lat: f64, lon: f64) -> Option<f64> {
        self(lat, lon)
    }
}

/// Gain computation policy.
///
/// Deserializes through [`FromStr`], so configuration files accept the same
/// names (and the `best_of_both` alias) as the command line and report
/// [`EngineError::UnknownMethod`] for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Method {
    /// Sum of positive deltas on the raw samples. Reference only, very noise
    /// sensitive.
    RawPositiveDelta,
    /// Distance-window average, then hysteresis threshold.
    DistanceSmoothThreshold,
    /// Index-window average, then hysteresis threshold.
    MovingAverageThreshold,
    /// Moving average on flat routes, distance window on hilly ones.
    #[default]
    AdaptiveBlend,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::RawPositiveDelta,
        Method::DistanceSmoothThreshold,
        Method::MovingAverageThreshold,
        Method::AdaptiveBlend,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::RawPositiveDelta => "raw_positive_delta",
            Method::DistanceSmoothThreshold => "distance_smooth_threshold",
            Method::MovingAverageThreshold => "moving_average_threshold",
            Method::AdaptiveBlend => "adaptive_blend",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Method {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "raw_positive_delta" => Ok(Method::RawPositiveDelta),
            "distance_smooth_threshold" => Ok(Method::DistanceSmoothThreshold),
            "moving_average_threshold" => Ok(Method::MovingAverageThreshold),
            "adaptive_blend" | "best_of_both" => Ok(Method::AdaptiveBlend),
            other => Err(EngineError::UnknownMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = EngineError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_m: f64,
    pub gain_m: f64,
}

impl RouteMetrics {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

/// Total distance and elevation gain of a route under `config.method`.
pub fn compute_configured(points: &[GeoPoint], config: &EngineConfig) -> Result<RouteMetrics> {
    compute(points, config.method, config)
}

/// Total distance and elevation gain of a route.
///
/// `method` takes precedence over `config.method`, which is not consulted;
/// use [`compute_configured`] to follow the configuration. Distance follows
/// every point in order. Gain only looks at points carrying an elevation; the
/// others are skipped rather than treated as errors.
pub fn compute(points: &[GeoPoint], method: Method, config: &EngineConfig) -> Result<RouteMetrics> {
    config.validate()?;

    let distance_m = path_distance_m(points);
    let samples = elevation_samples(points);
    let gain_m = gain_for(&samples, distance_m, method, config);

    tracing::debug!(
        points = points.len(),
        with_elevation = samples.len(),
        %method,
        distance_m,
        gain_m,
        "computed route metrics"
    );

    Ok(RouteMetrics { distance_m, gain_m })
}

/// Same as [`compute`], with elevations taken from `lookup` where it has
/// coverage and from the recorded value elsewhere.
pub fn compute_with_lookup(
    points: &[GeoPoint],
    lookup: &dyn ElevationLookup,
    method: Method,
    config: &EngineConfig,
) -> Result<RouteMetrics> {
    let resolved = resolve_elevations(points, lookup);
    compute(&resolved, method, config)
}

pub fn resolve_elevations(points: &[GeoPoint], lookup: &dyn ElevationLookup) -> Vec<GeoPoint> {
    points
        .iter()
        .map(|p| GeoPoint {
            elevation: lookup.elevation(p.lat, p.lon).or(p.elevation),
            ..*p
        })
        .collect()
}

/// Gain under every method, for side-by-side comparison of one route.
pub fn gain_by_method(points: &[GeoPoint], config: &EngineConfig) -> Result<Vec<(Method, f64)>> {
    config.validate()?;

    let distance_m = path_distance_m(points);
    let samples = elevation_samples(points);
    Ok(Method::ALL
        .iter()
        .map(|&method| (method, gain_for(&samples, distance_m, method, config)))
        .collect())
}

fn elevation_samples(points: &[GeoPoint]) -> Vec<ElevationSample> {
    points
        .iter()
        .filter_map(|p| {
            p.elevation.map(|elevation| ElevationSample {
                coordinate: p.coordinate(),
                elevation,
            })
        })
        .collect()
}

fn gain_for(
    samples: &[ElevationSample],
    distance_m: f64,
    method: Method,
    config: &EngineConfig,
) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    match method {
        Method::RawPositiveDelta => {
            let elevations: Vec<f64> = samples.iter().map(|s| s.elevation).collect();
            positive_delta_sum(&elevations)
        }
        Method::DistanceSmoothThreshold => distance_smooth_gain(samples, config),
        Method::MovingAverageThreshold => moving_average_gain(samples, config),
        Method::AdaptiveBlend => {
            let ma_gain = moving_average_gain(samples, config);
            if distance_m <= 0.0 {
                return ma_gain;
            }
            let gain_per_km = ma_gain / (distance_m / 1000.0);
            if gain_per_km > config.blend_ratio_m_per_km {
                tracing::debug!(
                    gain_per_km,
                    ratio = config.blend_ratio_m_per_km,
                    "hilly route, using distance-window smoothing"
                );
                distance_smooth_gain(samples, config)
            } else {
                ma_gain
            }
        }
    }
}

fn moving_average_gain(samples: &[ElevationSample], config: &EngineConfig) -> f64 {
    let elevations: Vec<f64> = samples.iter().map(|s| s.elevation).collect();
    let smoothed = moving_average(&elevations, config.index_window);
    accumulate_gain(&smoothed, config.moving_average_threshold_m)
}

fn distance_smooth_gain(samples: &[ElevationSample], config: &EngineConfig) -> f64 {
    let smoothed = distance_window_average(samples, config.distance_window_m);
    accumulate_gain(&smoothed, config.distance_threshold_m)
}

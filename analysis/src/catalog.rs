use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::difficulty;
use crate::elevation::{self, ElevationLookup};
use crate::error::{EngineError, Result};
use crate::location::classify_route_start;
use crate::models::{Anchor, GeoPoint, PointOfInterest, RouteSummary};
use crate::proximity::near;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInput {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub points: Vec<GeoPoint>,
}

/// Everything shared by all routes of one catalog run.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub config: &'a EngineConfig,
    pub anchors: &'a [Anchor],
    pub pois: &'a [PointOfInterest],
    pub lookup: Option<&'a dyn ElevationLookup>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            anchors: &[],
            pois: &[],
            lookup: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub id: String,
    pub result: Result<RouteSummary>,
}

/// Distance, gain, difficulty, start location and nearby POIs of one route.
pub fn analyze_route(route: &RouteInput, ctx: &AnalysisContext<'_>) -> Result<RouteSummary> {
    let config = ctx.config;
    if let Some((index, point)) = route
        .points
        .iter()
        .enumerate()
        .find(|(_, p)| !p.lat.is_finite() || !p.lon.is_finite())
    {
        return Err(EngineError::InvalidCoordinate {
            index,
            lat: point.lat,
            lon: point.lon,
        });
    }

    let metrics = match ctx.lookup {
        Some(lookup) => {
            let resolved = elevation::resolve_elevations(&route.points, lookup);
            elevation::compute_configured(&resolved, config)?
        }
        None => elevation::compute_configured(&route.points, config)?,
    };

    let distance_km = metrics.distance_km();
    let difficulty = difficulty::classify(distance_km, metrics.gain_m, &config.difficulty_bands);
    let start_location =
        classify_route_start(&route.points, ctx.anchors, config.unknown_threshold_m);
    let nearby_pois = near(&route.points, ctx.pois, config.poi_radius_m);

    Ok(RouteSummary {
        id: route.id.clone(),
        name: route.name.clone(),
        distance_km,
        elevation_gain_m: metrics.gain_m,
        difficulty,
        start_location,
        nearby_pois,
    })
}

/// Analyzes every route independently and in parallel. A route that fails is
/// reported in its outcome and does not stop the others. Outcomes keep the
/// input order.
pub fn analyze_catalog(routes: &[RouteInput], ctx: &AnalysisContext<'_>) -> Vec<RouteOutcome> {
    if let Err(err) = ctx.config.validate() {
        tracing::warn!("catalog configuration rejected: {err}");
        return routes
            .iter()
            .map(|route| failed(route, err.clone()))
            .collect();
    }

    let outcomes: Vec<RouteOutcome> = routes
        .par_iter()
        .map(|route| match analyze_route(route, ctx) {
            Ok(summary) => {
                tracing::debug!(
                    route = %route.id,
                    distance_km = summary.distance_km,
                    gain_m = summary.elevation_gain_m,
                    "route analyzed"
                );
                RouteOutcome {
                    id: route.id.clone(),
                    result: Ok(summary),
                }
            }
            Err(err) => {
                tracing::warn!(route = %route.id, "route analysis failed: {err}");
                failed(route, err)
            }
        })
        .collect();

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(
        "analyzed {} routes ({} failed)",
        outcomes.len() - failures,
        failures
    );
    outcomes
}

fn failed(route: &RouteInput, err: EngineError) -> RouteOutcome {
    RouteOutcome {
        id: route.id.clone(),
        result: Err(err),
    }
}

use crate::geo::haversine_m;
use crate::models::{Anchor, GeoPoint, StartLocation};

/// Names the anchor a route starts at.
///
/// The nearest anchor wins, ties going to whichever comes first in `anchors`.
/// If even the nearest anchor is farther than `unknown_threshold_m` the start
/// is [`StartLocation::Other`]; with no first point (or no anchors) it is
/// [`StartLocation::Unknown`].
pub fn classify_start(
    first_point: Option<&GeoPoint>,
    anchors: &[Anchor],
    unknown_threshold_m: f64,
) -> StartLocation {
    let Some(first) = first_point else {
        return StartLocation::Unknown;
    };

    let start = first.coordinate();
    let mut nearest: Option<(&Anchor, f64)> = None;
    for anchor in anchors {
        let distance = haversine_m(start, anchor.coordinate());
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((anchor, distance)),
        }
    }

    match nearest {
        None => StartLocation::Unknown,
        Some((_, distance)) if distance > unknown_threshold_m => StartLocation::Other,
        Some((anchor, _)) => StartLocation::Named(anchor.name.clone()),
    }
}

/// Convenience wrapper classifying a whole route by its first point.
pub fn classify_route_start(
    points: &[GeoPoint],
    anchors: &[Anchor],
    unknown_threshold_m: f64,
) -> StartLocation {
    classify_start(points.first(), anchors, unknown_threshold_m)
}

use crate::geo::haversine_m;
use crate::models::{GeoPoint, NearbyPoi, PointOfInterest};

/// Points of interest within `max_distance_m` of any route point, nearest
/// first. Equally distant POIs keep their catalog order.
///
/// Brute force over route points × POIs. Fine for a few thousand points and a
/// few hundred POIs; a grid or k-d tree over POI coordinates can replace the
/// scan without changing the result.
pub fn near(points: &[GeoPoint], pois: &[PointOfInterest], max_distance_m: f64) -> Vec<NearbyPoi> {
    if points.is_empty() || pois.is_empty() {
        return Vec::new();
    }

    let mut nearby: Vec<NearbyPoi> = pois
        .iter()
        .filter_map(|poi| {
            let distance = distance_to_route(points, poi)?;
            (distance <= max_distance_m).then(|| NearbyPoi {
                poi: poi.clone(),
                distance_to_route: distance,
            })
        })
        .collect();

    // `sort_by` is stable, so ties stay in catalog order
    nearby.sort_by(|a, b| a.distance_to_route.total_cmp(&b.distance_to_route));
    nearby
}

/// Smallest distance from `poi` to any point of the route.
pub fn distance_to_route(points: &[GeoPoint], poi: &PointOfInterest) -> Option<f64> {
    let target = poi.coordinate();
    points
        .iter()
        .map(|p| haversine_m(p.coordinate(), target))
        .min_by(|a, b| a.total_cmp(b))
}

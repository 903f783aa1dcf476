use crate::models::{Coordinate, GeoPoint};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters on a spherical Earth.
///
/// Inputs are not range-checked; NaN or out-of-range coordinates produce
/// unspecified results.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}

pub fn point_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_m(a.coordinate(), b.coordinate())
}

/// Length of the path through `points` in their given order.
/// Degenerate paths report `+0.0`, never `-0.0`.
pub fn path_distance_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| point_distance_m(&w[0], &w[1]))
        .fold(0.0, |total, d| total + d)
}

/// Distance travelled from the first coordinate up to each coordinate (prefix sums).
pub fn cumulative_distances_m(path: &[Coordinate]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(path.len());
    let mut total = 0.0;
    for (idx, coord) in path.iter().enumerate() {
        if idx > 0 {
            total += haversine_m(path[idx - 1], *coord);
        }
        cumulative.push(total);
    }
    cumulative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let point = Coordinate::new(45.0, 5.0);
        assert_eq!(haversine_m(point, point), 0.0);
    }

    #[test]
    fn test_haversine_1km_north() {
        // 1km north ≈ 0.009° at any latitude
        let dist = haversine_m(Coordinate::new(45.0, 5.0), Coordinate::new(45.009, 5.0));
        assert!((dist - 1000.0).abs() < 10.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London, ~343 km
        let dist = haversine_m(
            Coordinate::new(48.8566, 2.3522),
            Coordinate::new(51.5074, -0.1278),
        );
        assert!((dist - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn test_campus_to_leamington() {
        let dist = haversine_m(
            Coordinate::new(52.3813, -1.5616),
            Coordinate::new(52.2922, -1.5354),
        );
        assert!(dist > 9_000.0 && dist < 11_000.0, "got {dist}");
    }

    #[test]
    fn test_path_distance_empty() {
        assert_eq!(path_distance_m(&[]), 0.0);
    }

    #[test]
    fn test_path_distance_single_point() {
        let path = vec![GeoPoint::new(45.0, 5.0, Some(100.0))];
        assert_eq!(path_distance_m(&path), 0.0);
    }

    #[test]
    fn test_degenerate_path_distance_is_positive_zero() {
        assert!(path_distance_m(&[]).is_sign_positive());
        let single = vec![GeoPoint::new(45.0, 5.0, None)];
        assert!(path_distance_m(&single).is_sign_positive());
    }

    #[test]
    fn test_cumulative_distances_end_at_path_length() {
        let path = vec![
            GeoPoint::new(45.0, 5.0, None),
            GeoPoint::new(45.001, 5.0, None),
            GeoPoint::new(45.002, 5.001, None),
        ];
        let coords: Vec<Coordinate> = path.iter().map(GeoPoint::coordinate).collect();
        let cumulative = cumulative_distances_m(&coords);
        assert_eq!(cumulative.len(), 3);
        assert_eq!(cumulative[0], 0.0);
        assert!(cumulative[1] <= cumulative[2]);
        assert!((cumulative[2] - path_distance_m(&path)).abs() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_haversine_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(haversine_m(a, b) >= 0.0);
            }

            #[test]
            fn prop_haversine_symmetric(a in valid_coord(), b in valid_coord()) {
                let dist_ab = haversine_m(a, b);
                let dist_ba = haversine_m(b, a);
                prop_assert!((dist_ab - dist_ba).abs() < 1e-6);
            }

            #[test]
            fn prop_haversine_same_point_is_zero(coord in valid_coord()) {
                prop_assert_eq!(haversine_m(coord, coord), 0.0);
            }

            #[test]
            fn prop_haversine_bounded_by_half_earth_circumference(
                a in valid_coord(),
                b in valid_coord()
            ) {
                let max_distance = std::f64::consts::PI * EARTH_RADIUS_M;
                prop_assert!(haversine_m(a, b) <= max_distance + 1.0);
            }
        }
    }
}

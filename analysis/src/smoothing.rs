//! Elevation denoising filters.
//!
//! Both filters return a sequence of the same length as their input:
//!
//! - [`moving_average`] averages over a fixed number of neighbouring samples.
//!   Cheap, but the physical extent of the window changes with the GPS
//!   sampling rate.
//! - [`distance_window_average`] averages over every sample within a path
//!   length radius, so the window covers the same stretch of ground however
//!   densely the route was recorded.

use crate::geo::cumulative_distances_m;
use crate::models::Coordinate;

/// An elevation reading at a known position along the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub coordinate: Coordinate,
    pub elevation: f64,
}

/// Centered moving average over `window` samples (`window / 2` on each side),
/// truncated at both ends of the sequence.
///
/// Sequences shorter than `window` are returned unchanged; `window <= 1` is a
/// passthrough.
pub fn moving_average(elevations: &[f64], window: usize) -> Vec<f64> {
    if elevations.len() < window || window <= 1 {
        return elevations.to_vec();
    }

    let half_window = window / 2;
    let len = elevations.len();

    (0..len)
        .map(|idx| {
            let start = idx.saturating_sub(half_window);
            let end = (idx + half_window + 1).min(len);
            let values = &elevations[start..end];
            values.iter().sum::<f64>() / values.len() as f64
        })
        .collect()
}

/// Mean elevation of all samples whose cumulative path distance lies within
/// `radius_m` of each sample's own cumulative distance.
///
/// Runs in linear time: cumulative distance never decreases, so both window
/// bounds only move forward, and window sums come from elevation prefix sums.
pub fn distance_window_average(samples: &[ElevationSample], radius_m: f64) -> Vec<f64> {
    let len = samples.len();
    if len < 2 {
        return samples.iter().map(|s| s.elevation).collect();
    }

    let coords: Vec<Coordinate> = samples.iter().map(|s| s.coordinate).collect();
    let cumdist = cumulative_distances_m(&coords);

    let mut prefix = Vec::with_capacity(len + 1);
    prefix.push(0.0);
    let mut running = 0.0;
    for sample in samples {
        running += sample.elevation;
        prefix.push(running);
    }

    let mut smoothed = Vec::with_capacity(len);
    let mut left = 0;
    let mut right = 0;

    for idx in 0..len {
        let min_d = cumdist[idx] - radius_m;
        let max_d = cumdist[idx] + radius_m;

        while left < len && cumdist[left] < min_d {
            left += 1;
        }
        while right + 1 < len && cumdist[right + 1] <= max_d {
            right += 1;
        }

        if left <= right {
            let count = (right - left + 1) as f64;
            smoothed.push((prefix[right + 1] - prefix[left]) / count);
        } else {
            smoothed.push(samples[idx].elevation);
        }
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples_along_equator(elevations: &[f64], spacing_deg: f64) -> Vec<ElevationSample> {
        elevations
            .iter()
            .enumerate()
            .map(|(idx, &elevation)| ElevationSample {
                coordinate: Coordinate::new(0.0, idx as f64 * spacing_deg),
                elevation,
            })
            .collect()
    }

    /// O(n²) reference used to check the sliding-window version.
    fn naive_distance_window(samples: &[ElevationSample], radius_m: f64) -> Vec<f64> {
        let coords: Vec<Coordinate> = samples.iter().map(|s| s.coordinate).collect();
        let cumdist = cumulative_distances_m(&coords);
        (0..samples.len())
            .map(|i| {
                let window: Vec<f64> = (0..samples.len())
                    .filter(|&j| (cumdist[j] - cumdist[i]).abs() <= radius_m)
                    .map(|j| samples[j].elevation)
                    .collect();
                window.iter().sum::<f64>() / window.len() as f64
            })
            .collect()
    }

    #[test]
    fn window_of_one_is_passthrough() {
        let raw = vec![100.0, 103.5, 99.2, 120.0];
        assert_eq!(moving_average(&raw, 1), raw);
    }

    #[test]
    fn short_sequence_is_returned_unchanged() {
        let raw = vec![100.0, 200.0];
        assert_eq!(moving_average(&raw, 3), raw);
    }

    #[test]
    fn moving_average_clamps_edge_windows() {
        let raw = vec![0.0, 3.0, 6.0, 9.0];
        let smoothed = moving_average(&raw, 3);
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 7.5]);
    }

    #[test]
    fn moving_average_flattens_single_spike() {
        let raw = vec![100.0, 100.0, 130.0, 100.0, 100.0];
        let smoothed = moving_average(&raw, 3);
        assert_eq!(smoothed[2], 110.0);
        assert_eq!(smoothed[1], 110.0);
        assert_eq!(smoothed[0], 100.0);
    }

    #[test]
    fn distance_window_matches_naive_reference() {
        // ~11 m between samples on the equator
        let elevations = [100.0, 104.0, 98.0, 110.0, 112.0, 107.0, 120.0];
        let samples = samples_along_equator(&elevations, 0.0001);
        let fast = distance_window_average(&samples, 25.0);
        let slow = naive_distance_window(&samples, 25.0);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(&slow) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn tiny_radius_is_passthrough_for_distinct_points() {
        let samples = samples_along_equator(&[100.0, 104.0, 98.0, 110.0], 0.001);
        let smoothed = distance_window_average(&samples, 0.001);
        assert_eq!(smoothed, vec![100.0, 104.0, 98.0, 110.0]);
    }

    #[test]
    fn wide_radius_averages_everything() {
        let samples = samples_along_equator(&[100.0, 110.0, 120.0], 0.0001);
        let smoothed = distance_window_average(&samples, 10_000.0);
        assert_eq!(smoothed, vec![110.0, 110.0, 110.0]);
    }

    #[test]
    fn distance_window_single_sample() {
        let samples = samples_along_equator(&[42.0], 0.001);
        assert_eq!(distance_window_average(&samples, 25.0), vec![42.0]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_moving_average_preserves_length(
                values in prop::collection::vec(-500.0f64..5000.0, 0..200),
                window in 1usize..15
            ) {
                prop_assert_eq!(moving_average(&values, window).len(), values.len());
            }

            #[test]
            fn prop_distance_window_stays_within_input_range(
                values in prop::collection::vec(0.0f64..3000.0, 2..100),
                radius in 1.0f64..200.0
            ) {
                let samples = samples_along_equator(&values, 0.0002);
                let smoothed = distance_window_average(&samples, radius);
                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                prop_assert_eq!(smoothed.len(), values.len());
                for v in smoothed {
                    prop_assert!(v >= min - 1e-6 && v <= max + 1e-6);
                }
            }
        }
    }
}

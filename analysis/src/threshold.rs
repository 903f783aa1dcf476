/// Total ascent of an elevation sequence, ignoring oscillations smaller than
/// `threshold_m`.
///
/// A signed accumulator collects consecutive deltas. Once it reaches
/// `+threshold_m` the whole accumulated climb is credited and the accumulator
/// restarts; once it falls below `-threshold_m` it is dropped. Whatever
/// positive climb is left at the end is credited too.
pub fn accumulate_gain(elevations: &[f64], threshold_m: f64) -> f64 {
    if elevations.len() < 2 {
        return 0.0;
    }

    let mut total_gain = 0.0;
    let mut accumulated = 0.0;

    for pair in elevations.windows(2) {
        accumulated += pair[1] - pair[0];

        if accumulated >= threshold_m {
            total_gain += accumulated;
            accumulated = 0.0;
        } else if accumulated < -threshold_m {
            accumulated = 0.0;
        }
    }

    if accumulated > 0.0 {
        total_gain += accumulated;
    }

    total_gain.max(0.0)
}

/// Sum of every positive consecutive delta, without any noise rejection.
pub fn positive_delta_sum(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|delta| *delta > 0.0)
        .fold(0.0, |total, delta| total + delta)
}

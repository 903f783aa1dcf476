use crate::config::DifficultyBands;
use crate::models::Difficulty;

/// Rates a route from its length and climbing.
///
/// A route whose distance and gain fall in the same band gets that band.
/// Otherwise the harder band reached by *either* dimension wins, so a long
/// flat ride can still come out as `VeryHard`.
pub fn classify(distance_km: f64, gain_m: f64, bands: &DifficultyBands) -> Difficulty {
    exact_band(distance_km, gain_m, bands).unwrap_or_else(|| escalate(distance_km, gain_m, bands))
}

fn exact_band(d: f64, g: f64, bands: &DifficultyBands) -> Option<Difficulty> {
    let (m, h, v) = (bands.moderate, bands.hard, bands.very_hard);

    if d < m.distance_km && g < m.gain_m {
        Some(Difficulty::Easy)
    } else if (m.distance_km..=h.distance_km).contains(&d) && (m.gain_m..=h.gain_m).contains(&g) {
        Some(Difficulty::Moderate)
    } else if d > h.distance_km && d <= v.distance_km && g > h.gain_m && g <= v.gain_m {
        Some(Difficulty::Hard)
    } else if d > v.distance_km && g > v.gain_m {
        Some(Difficulty::VeryHard)
    } else {
        None
    }
}

// TODO: confirm with the catalog owners whether distance alone should be able
// to escalate a route; switching to AND would change existing labels.
fn escalate(d: f64, g: f64, bands: &DifficultyBands) -> Difficulty {
    let (m, h, v) = (bands.moderate, bands.hard, bands.very_hard);

    if d > v.distance_km || g > v.gain_m {
        Difficulty::VeryHard
    } else if d > h.distance_km || g > h.gain_m {
        Difficulty::Hard
    } else if d > m.distance_km || g > m.gain_m {
        Difficulty::Moderate
    } else {
        Difficulty::Easy
    }
}

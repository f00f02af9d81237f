const MS_PER_HOUR: f64 = 3_600_000.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Normalizes a raw speed to km/h. Values above 50 are taken as km/h
/// already, smaller ones as m/s. Non-finite input reads as 0.
pub fn convert_to_kmh(speed: f64) -> f64 {
    if !speed.is_finite() {
        return 0.0;
    }
    if speed > 50.0 { speed } else { speed * 3.6 }
}

pub fn ms_to_hours(ms: f64) -> f64 {
    ms / MS_PER_HOUR
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

/// Computes `Σ(value * weight) / Σ(weight)` over pairs with a positive
/// weight. Returns `None` when no weight is positive.
pub fn weighted_mean(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (weighted, total) = pairs
        .into_iter()
        .filter(|(_, w)| *w > 0.0)
        .fold((0.0, 0.0), |(acc, tw), (v, w)| (acc + v * w, tw + w));

    if total > 0.0 { Some(weighted / total) } else { None }
}

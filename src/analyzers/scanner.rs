//! Pairwise scan of one vehicle's positions into ignition, driving and idle
//! time plus distance.

use crate::analyzers::types::{Kinematics, TimeWindow, TimedPosition};
use crate::analyzers::utility::convert_to_kmh;
use crate::config::MetricsConfig;

/// Scans a chronologically sorted position list for one vehicle.
///
/// Each interval between consecutive samples is classified by the earlier
/// sample's ignition and speed:
///
/// | Ignition | Speed (km/h)     | Credited to                     |
/// |----------|------------------|---------------------------------|
/// | off      | any              | nothing, idle streak resets     |
/// | on       | > min driving    | ignition + driving              |
/// | on       | 0                | ignition, idle once debounced   |
/// | on       | (0, min driving] | ignition only, streak resets    |
/// | on       | missing or < 0   | ignition only, streak resets    |
///
/// Idle time is only credited after `idle_threshold_secs` of continuous
/// stationary time; at that point the whole streak is credited at once.
pub fn scan(
    positions: &[TimedPosition<'_>],
    window: &TimeWindow,
    config: &MetricsConfig,
) -> Kinematics {
    let mut k = Kinematics::default();
    if positions.len() < 2 {
        return k;
    }

    let mut idle_streak = 0.0;
    let mut pairwise_m = 0.0;

    for pair in positions.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);

        if next.time <= current.time || !window.contains(current.time) {
            continue;
        }
        let delta = (next.time - current.time).num_milliseconds() as f64 / 1000.0;
        if delta <= 0.0 {
            continue;
        }

        if current.position.ignition() {
            k.ignition_seconds += delta;

            match current.position.speed.map(convert_to_kmh) {
                Some(speed) if speed > config.min_driving_speed_kmh => {
                    k.driving_seconds += delta;
                    idle_streak = 0.0;
                }
                Some(speed) if speed == 0.0 => {
                    let before = idle_streak;
                    idle_streak += delta;
                    if before >= config.idle_threshold_secs {
                        k.idle_seconds += delta;
                    } else if idle_streak >= config.idle_threshold_secs {
                        k.idle_seconds += idle_streak;
                    }
                }
                // creep, negative readings, or no speed at all
                _ => idle_streak = 0.0,
            }
        } else {
            idle_streak = 0.0;
        }

        pairwise_m += pair_distance(current, next);
    }

    let span_m = odometer_span(positions);
    let distance_m = if span_m > 0.0 { span_m } else { pairwise_m };
    k.distance_km = distance_m / 1000.0;
    k
}

/// Odometer delta when both readings exist and do not go backwards, else
/// the next sample's incremental distance.
fn pair_distance(current: &TimedPosition<'_>, next: &TimedPosition<'_>) -> f64 {
    match (
        current.position.total_distance(),
        next.position.total_distance(),
    ) {
        (Some(a), Some(b)) if b >= a => b - a,
        _ => next.position.incremental_distance().unwrap_or(0.0),
    }
}

fn odometer_span(positions: &[TimedPosition<'_>]) -> f64 {
    let readings = positions.iter().filter_map(|p| p.position.total_distance());
    let (min, max) = readings.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if max > min { max - min } else { 0.0 }
}

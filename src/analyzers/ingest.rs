//! Selects the positions and trips that belong to the analysis.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::analyzers::types::{TimeWindow, TimedPosition, TripTotals};
use crate::telemetry::{Device, Position, TripSummary};

/// Returns the ids of devices matching `search` against name, unique id or
/// plate, case-insensitively. An empty or absent search selects every device.
pub fn active_devices(devices: &[Device], search: Option<&str>) -> BTreeSet<i64> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    devices
        .iter()
        .filter_map(|device| {
            let id = device.id?;
            let Some(needle) = &needle else {
                return Some(id);
            };

            let matches = [Some(device.name.as_str()), device.unique_id.as_deref(), device.plate()]
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(needle.as_str()));

            matches.then_some(id)
        })
        .collect()
}

/// Groups in-window positions of active devices by device id, each list
/// sorted by resolved timestamp.
///
/// Samples without a numeric device id or a parseable timestamp are dropped.
pub fn filter_positions<'a>(
    positions: &'a [Position],
    active: &BTreeSet<i64>,
    window: &TimeWindow,
) -> BTreeMap<i64, Vec<TimedPosition<'a>>> {
    let mut grouped: BTreeMap<i64, Vec<TimedPosition<'a>>> = BTreeMap::new();
    let mut dropped = 0usize;

    for position in positions {
        let (Some(device_id), Some(time)) = (position.device_id, position.resolved_time()) else {
            dropped += 1;
            continue;
        };

        if !active.contains(&device_id) || !window.contains(time) {
            continue;
        }

        grouped
            .entry(device_id)
            .or_default()
            .push(TimedPosition { time, position });
    }

    for list in grouped.values_mut() {
        list.sort_by_key(|p| p.time);
    }

    if dropped > 0 {
        debug!(dropped, "Dropped malformed position samples");
    }

    grouped
}

/// Sums trip records per active device. A trip whose start time is known
/// and outside the window is skipped.
pub fn summarize_trips(
    trips: &[TripSummary],
    active: &BTreeSet<i64>,
    window: &TimeWindow,
) -> BTreeMap<i64, TripTotals> {
    let mut totals: BTreeMap<i64, TripTotals> = BTreeMap::new();

    for trip in trips {
        let Some(device_id) = trip.device_id else {
            continue;
        };
        if !active.contains(&device_id) {
            continue;
        }
        if trip.start_time.is_some_and(|t| !window.contains(t)) {
            continue;
        }

        let entry = totals.entry(device_id).or_default();
        entry.count += 1;
        entry.duration_ms += positive(trip.duration);
        entry.engine_hours_ms += positive(trip.engine_hours);
        entry.spent_fuel_liters += positive(trip.spent_fuel);
        entry.distance_m += positive(trip.distance);
    }

    totals
}

fn positive(value: Option<f64>) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(0.0)
}

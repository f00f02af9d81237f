use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::analyzers::aggregate::aggregate_fleet;
use crate::analyzers::ingest::{filter_positions, summarize_trips};
use crate::analyzers::reconcile::reconcile;
use crate::analyzers::scanner::scan;
use crate::analyzers::types::{FleetReport, Kinematics, TimeWindow};
use crate::config::MetricsConfig;
use crate::telemetry::{Device, Position, TripSummary};

/// Raw records for one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct FleetInput {
    pub devices: Vec<Device>,
    pub positions: Vec<Position>,
    pub trips: Vec<TripSummary>,
}

/// Runs the full pipeline for the devices in `active` over `window`.
///
/// A vehicle is reported when it has at least two in-window positions or at
/// least one trip record. Vehicles are ordered by device id.
pub fn analyze(
    input: &FleetInput,
    active: &BTreeSet<i64>,
    window: &TimeWindow,
    config: &MetricsConfig,
) -> FleetReport {
    let devices: BTreeMap<i64, &Device> = input
        .devices
        .iter()
        .filter_map(|d| Some((d.id?, d)))
        .collect();

    let positions = filter_positions(&input.positions, active, window);
    let trips = summarize_trips(&input.trips, active, window);

    let candidates: BTreeSet<i64> = positions
        .iter()
        .filter(|(_, list)| list.len() >= 2)
        .map(|(id, _)| *id)
        .chain(trips.keys().copied())
        .collect();

    let vehicles: Vec<_> = candidates
        .into_iter()
        .map(|device_id| {
            let kinematics = positions
                .get(&device_id)
                .map(|list| scan(list, window, config))
                .unwrap_or_default();

            let metrics = reconcile(
                device_id,
                devices.get(&device_id).copied(),
                &kinematics,
                trips.get(&device_id),
                config,
            );
            log_vehicle(&kinematics, &metrics.device_name, device_id);
            metrics
        })
        .collect();

    let totals = aggregate_fleet(&vehicles, config);
    debug!(
        vehicles = totals.vehicles,
        distance_km = totals.distance_km,
        engine_hours = totals.engine_hours,
        "Fleet aggregated"
    );

    FleetReport {
        window: *window,
        vehicles,
        totals,
    }
}

fn log_vehicle(k: &Kinematics, name: &str, device_id: i64) {
    debug!(
        device_id,
        name,
        distance_km = k.distance_km,
        ignition_seconds = k.ignition_seconds,
        driving_seconds = k.driving_seconds,
        idle_seconds = k.idle_seconds,
        "Vehicle scanned"
    );
}

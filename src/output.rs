//! Output formatting and persistence for fleet reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use tracing::{debug, info};

use crate::analyzers::types::{FleetReport, VehicleMetrics};
use csv::WriterBuilder;
use std::fs::OpenOptions;

/// Logs a fleet report using Rust's debug pretty-print format.
pub fn print_pretty(report: &FleetReport) {
    info!("{:#?}", report.totals);
    for vehicle in &report.vehicles {
        debug!("{:#?}", vehicle);
    }
}

/// Renders a fleet report as pretty-printed JSON.
pub fn to_json(report: &FleetReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Appends one CSV row per vehicle.
///
/// The header is written whenever the file is empty, so an earlier append
/// with no rows does not leave a headerless file behind.
pub fn append_records(path: &str, rows: &[VehicleMetrics]) -> Result<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;
    debug!(path, needs_header, rows = rows.len(), "Appending CSV records");

    let mut writer = WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate_fleet;
    use crate::analyzers::types::{IdleRateSource, TimeWindow, VehicleClass};
    use crate::config::MetricsConfig;
    use chrono::{TimeZone, Utc};
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn row(device_id: i64) -> VehicleMetrics {
        VehicleMetrics {
            device_id,
            device_name: "Truck, 01".to_string(),
            vehicle_class: VehicleClass::Heavy,
            distance_km: 12.5,
            trips: 2,
            engine_hours: 1.0,
            driving_hours: 0.5,
            idle_hours: 0.25,
            fuel_liters: 3.0,
            fuel_efficiency_km_l: None,
            idle_fuel_rate_lph: 3.0,
            idle_rate_source: IdleRateSource::ClassDefault,
            idle_fuel_liters: 0.75,
            engine_hours_consistent: true,
        }
    }

    fn report() -> FleetReport {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        let vehicles = vec![row(1)];
        let totals = aggregate_fleet(&vehicles, &MetricsConfig::default());
        FleetReport {
            window: TimeWindow::new(at, at).unwrap(),
            vehicles,
            totals,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_to_json_contains_totals() {
        let json = to_json(&report()).unwrap();
        assert!(json.contains("\"avg_idle_fuel_rate_lph\""));
        assert!(json.contains("\"vehicle_class\": \"heavy\""));
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("fleet_metrics_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[row(1), row(2)]).unwrap();
        append_records(&path, &[row(3)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("device_id")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 4);
        assert!(content.contains("\"Truck, 01\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_written_after_empty_append() {
        let path = temp_path("fleet_metrics_test_empty.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[]).unwrap();
        assert!(Path::new(&path).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        append_records(&path, &[row(7)]).unwrap();
        append_records(&path, &[row(8)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[0].starts_with("device_id,device_name,"));
        assert!(lines[1].starts_with("7,"));
        assert!(lines[2].starts_with("8,"));
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }
}

//! Merges backend trip summaries with position-derived kinematics.
//!
//! Backend figures win when present and positive; otherwise the locally
//! derived figures are used.

use tracing::warn;

use crate::analyzers::fuel_class::{fuel_efficiency, resolve_idle_rate};
use crate::analyzers::types::{Kinematics, TripTotals, VehicleMetrics};
use crate::analyzers::utility::{ms_to_hours, seconds_to_hours};
use crate::config::MetricsConfig;
use crate::telemetry::Device;

const CONSISTENCY_TOLERANCE_HOURS: f64 = 1e-9;

/// Produces the final metrics for one vehicle.
pub fn reconcile(
    device_id: i64,
    device: Option<&Device>,
    kinematics: &Kinematics,
    trips: Option<&TripTotals>,
    config: &MetricsConfig,
) -> VehicleMetrics {
    let trips = trips.copied().unwrap_or_default();

    let trip_engine_hours = ms_to_hours(trips.engine_hours_ms);
    let engine_hours = if trip_engine_hours > 0.0 {
        trip_engine_hours
    } else {
        seconds_to_hours(kinematics.ignition_seconds)
    };

    let distance_km = kinematics.distance_km.max(trips.distance_m / 1000.0);

    let scanned_driving = seconds_to_hours(kinematics.driving_seconds);
    let driving_hours = if scanned_driving > 0.0 {
        scanned_driving
    } else {
        ms_to_hours(trips.duration_ms)
    };

    // Trip records carry no idle breakdown; this is a rough proxy.
    let scanned_idle = seconds_to_hours(kinematics.idle_seconds);
    let idle_hours = if scanned_idle > 0.0 {
        scanned_idle
    } else {
        (trip_engine_hours - trips.count as f64).max(0.0)
    };

    let efficiency_attr = fuel_efficiency(device);
    let fuel_liters = if trips.spent_fuel_liters > 0.0 {
        trips.spent_fuel_liters
    } else {
        match efficiency_attr {
            Some(km_l) if distance_km > 0.0 => distance_km / km_l,
            _ => 0.0,
        }
    };

    let fuel_efficiency_km_l =
        (fuel_liters > 0.0 && distance_km > 0.0).then(|| distance_km / fuel_liters);

    let (idle_fuel_rate_lph, idle_rate_source, vehicle_class) = resolve_idle_rate(device, config);
    let idle_fuel_liters = idle_hours * idle_fuel_rate_lph;

    let engine_hours_consistent =
        engine_hours + CONSISTENCY_TOLERANCE_HOURS >= driving_hours + idle_hours;
    if !engine_hours_consistent {
        warn!(
            device_id,
            engine_hours,
            driving_hours,
            idle_hours,
            "Engine hours below driving + idle hours"
        );
    }

    VehicleMetrics {
        device_id,
        device_name: device.map(|d| d.name.clone()).unwrap_or_default(),
        vehicle_class,
        distance_km,
        trips: trips.count,
        engine_hours,
        driving_hours,
        idle_hours,
        fuel_liters,
        fuel_efficiency_km_l,
        idle_fuel_rate_lph,
        idle_rate_source,
        idle_fuel_liters,
        engine_hours_consistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{IdleRateSource, VehicleClass};
    use serde_json::json;

    fn device(value: serde_json::Value) -> Device {
        serde_json::from_value(value).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_trip_distance_raises_scanned_distance() {
        let k = Kinematics { distance_km: 50.0, ..Default::default() };
        let t = TripTotals { count: 1, distance_m: 80_000.0, ..Default::default() };

        let m = reconcile(1, None, &k, Some(&t), &MetricsConfig::default());
        assert_eq!(m.distance_km, 80.0);
    }

    #[test]
    fn test_trip_distance_never_lowers_scanned_distance() {
        let k = Kinematics { distance_km: 50.0, ..Default::default() };
        let t = TripTotals { count: 1, distance_m: 20_000.0, ..Default::default() };

        let m = reconcile(1, None, &k, Some(&t), &MetricsConfig::default());
        assert_eq!(m.distance_km, 50.0);
    }

    #[test]
    fn test_backend_engine_hours_preferred() {
        let k = Kinematics {
            ignition_seconds: 3_600.0,
            driving_seconds: 1_800.0,
            idle_seconds: 900.0,
            ..Default::default()
        };
        let t = TripTotals { count: 2, engine_hours_ms: 7_200_000.0, ..Default::default() };

        let m = reconcile(1, None, &k, Some(&t), &MetricsConfig::default());
        assert_eq!(m.engine_hours, 2.0);
        assert_eq!(m.driving_hours, 0.5);
        assert_eq!(m.idle_hours, 0.25);
        assert!(m.engine_hours_consistent);
    }

    #[test]
    fn test_falls_back_to_ignition_time() {
        let k = Kinematics { ignition_seconds: 5_400.0, ..Default::default() };
        let m = reconcile(1, None, &k, None, &MetricsConfig::default());
        assert_eq!(m.engine_hours, 1.5);
        assert_eq!(m.trips, 0);
    }

    #[test]
    fn test_trip_only_vehicle_uses_trip_approximations() {
        let t = TripTotals {
            count: 2,
            duration_ms: 9_000_000.0,
            engine_hours_ms: 18_000_000.0,
            ..Default::default()
        };

        let m = reconcile(1, None, &Kinematics::default(), Some(&t), &MetricsConfig::default());
        assert_eq!(m.engine_hours, 5.0);
        assert_eq!(m.driving_hours, 2.5);
        assert_eq!(m.idle_hours, 3.0);
        assert!(!m.engine_hours_consistent);
    }

    #[test]
    fn test_trip_idle_proxy_never_negative() {
        let t = TripTotals { count: 4, engine_hours_ms: 3_600_000.0, ..Default::default() };
        let m = reconcile(1, None, &Kinematics::default(), Some(&t), &MetricsConfig::default());
        assert_eq!(m.idle_hours, 0.0);
    }

    #[test]
    fn test_spent_fuel_preferred_over_estimate() {
        let d = device(json!({"id": 1, "attributes": {"fuelEfficiency": 10}}));
        let k = Kinematics { distance_km: 100.0, ..Default::default() };
        let t = TripTotals { count: 1, spent_fuel_liters: 12.5, ..Default::default() };

        let m = reconcile(1, Some(&d), &k, Some(&t), &MetricsConfig::default());
        assert_eq!(m.fuel_liters, 12.5);
        assert_eq!(m.fuel_efficiency_km_l, Some(8.0));
    }

    #[test]
    fn test_fuel_estimated_from_efficiency() {
        let d = device(json!({"id": 1, "attributes": {"fuelEfficiency": "8"}}));
        let k = Kinematics { distance_km: 100.0, ..Default::default() };

        let m = reconcile(1, Some(&d), &k, None, &MetricsConfig::default());
        assert_eq!(m.fuel_liters, 12.5);

        let no_efficiency = reconcile(1, None, &k, None, &MetricsConfig::default());
        assert_eq!(no_efficiency.fuel_liters, 0.0);
        assert_eq!(no_efficiency.fuel_efficiency_km_l, None);
    }

    #[test]
    fn test_idle_fuel_uses_resolved_rate() {
        let config = MetricsConfig::default();
        let d = device(json!({"id": 9, "name": "Truck 9", "category": "Caminhão Basculante"}));
        let k = Kinematics {
            ignition_seconds: 7_200.0,
            idle_seconds: 7_200.0,
            ..Default::default()
        };

        let m = reconcile(9, Some(&d), &k, None, &config);
        assert_eq!(m.device_name, "Truck 9");
        assert_eq!(m.vehicle_class, VehicleClass::Heavy);
        assert_eq!(m.idle_rate_source, IdleRateSource::ClassDefault);
        assert!(approx(m.idle_fuel_liters, 2.0 * config.heavy_idle_rate_lph));
    }
}

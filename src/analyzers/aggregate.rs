//! Fleet-wide roll-up of reconciled per-vehicle metrics.

use crate::analyzers::types::{FleetTotals, VehicleMetrics};
use crate::analyzers::utility::weighted_mean;
use crate::config::MetricsConfig;

/// Sums per-vehicle metrics into fleet totals.
///
/// The fleet idle rate is liters-weighted, `Σ idle liters / Σ idle hours`
/// over vehicles with idle time, falling back to the light default. Fuel
/// efficiency is averaged across vehicles that have one, weighted by
/// distance.
pub fn aggregate_fleet(vehicles: &[VehicleMetrics], config: &MetricsConfig) -> FleetTotals {
    let sum = |f: fn(&VehicleMetrics) -> f64| vehicles.iter().map(f).sum::<f64>();

    let fuel_liters = sum(|v| v.fuel_liters);
    let idle_fuel_liters = sum(|v| v.idle_fuel_liters);

    let (idle_liters_measured, idle_hours_measured) = vehicles
        .iter()
        .filter(|v| v.idle_hours > 0.0)
        .fold((0.0, 0.0), |(l, h), v| (l + v.idle_fuel_liters, h + v.idle_hours));

    let avg_idle_fuel_rate_lph = if idle_hours_measured > 0.0 {
        idle_liters_measured / idle_hours_measured
    } else {
        config.light_idle_rate_lph
    };

    let avg_fuel_efficiency_km_l = weighted_mean(
        vehicles
            .iter()
            .filter_map(|v| v.fuel_efficiency_km_l.map(|e| (e, v.distance_km))),
    );

    FleetTotals {
        vehicles: vehicles.len(),
        distance_km: sum(|v| v.distance_km),
        trips: vehicles.iter().map(|v| v.trips).sum(),
        engine_hours: sum(|v| v.engine_hours),
        driving_hours: sum(|v| v.driving_hours),
        idle_hours: sum(|v| v.idle_hours),
        fuel_liters,
        fuel_cost: fuel_liters * config.fuel_price_per_liter,
        avg_idle_fuel_rate_lph,
        idle_fuel_liters,
        idle_fuel_cost: idle_fuel_liters * config.fuel_price_per_liter,
        avg_fuel_efficiency_km_l,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{IdleRateSource, VehicleClass};

    fn vehicle(device_id: i64) -> VehicleMetrics {
        VehicleMetrics {
            device_id,
            device_name: format!("V{device_id}"),
            vehicle_class: VehicleClass::Light,
            distance_km: 0.0,
            trips: 0,
            engine_hours: 0.0,
            driving_hours: 0.0,
            idle_hours: 0.0,
            fuel_liters: 0.0,
            fuel_efficiency_km_l: None,
            idle_fuel_rate_lph: 0.8,
            idle_rate_source: IdleRateSource::ClassDefault,
            idle_fuel_liters: 0.0,
            engine_hours_consistent: true,
        }
    }

    #[test]
    fn test_idle_rate_is_liters_weighted() {
        let a = VehicleMetrics {
            idle_hours: 2.0,
            idle_fuel_rate_lph: 3.0,
            idle_fuel_liters: 6.0,
            ..vehicle(1)
        };
        let b = VehicleMetrics {
            idle_hours: 4.0,
            idle_fuel_rate_lph: 1.0,
            idle_fuel_liters: 4.0,
            ..vehicle(2)
        };

        let totals = aggregate_fleet(&[a, b], &MetricsConfig::default());
        assert!((totals.avg_idle_fuel_rate_lph - 10.0 / 6.0).abs() < 1e-9);
        assert_eq!(totals.idle_hours, 6.0);
        assert_eq!(totals.idle_fuel_liters, 10.0);
    }

    #[test]
    fn test_idle_rate_defaults_without_idle_time() {
        let config = MetricsConfig::default();
        let totals = aggregate_fleet(&[vehicle(1), vehicle(2)], &config);
        assert_eq!(totals.avg_idle_fuel_rate_lph, config.light_idle_rate_lph);

        let empty = aggregate_fleet(&[], &config);
        assert_eq!(empty.vehicles, 0);
        assert_eq!(empty.avg_idle_fuel_rate_lph, config.light_idle_rate_lph);
        assert_eq!(empty.avg_fuel_efficiency_km_l, None);
    }

    #[test]
    fn test_efficiency_is_distance_weighted() {
        let a = VehicleMetrics {
            distance_km: 300.0,
            fuel_liters: 30.0,
            fuel_efficiency_km_l: Some(10.0),
            ..vehicle(1)
        };
        let b = VehicleMetrics {
            distance_km: 100.0,
            fuel_liters: 20.0,
            fuel_efficiency_km_l: Some(5.0),
            ..vehicle(2)
        };
        let c = VehicleMetrics { distance_km: 600.0, ..vehicle(3) };

        let totals = aggregate_fleet(&[a, b, c], &MetricsConfig::default());
        assert_eq!(totals.avg_fuel_efficiency_km_l, Some(8.75));
        assert_eq!(totals.distance_km, 1000.0);
    }

    #[test]
    fn test_sums_and_costs() {
        let config = MetricsConfig {
            fuel_price_per_liter: 5.0,
            ..Default::default()
        };
        let a = VehicleMetrics {
            trips: 3,
            engine_hours: 4.0,
            driving_hours: 3.0,
            idle_hours: 0.5,
            fuel_liters: 20.0,
            idle_fuel_liters: 1.5,
            ..vehicle(1)
        };
        let b = VehicleMetrics {
            trips: 1,
            engine_hours: 1.0,
            driving_hours: 1.0,
            fuel_liters: 4.0,
            ..vehicle(2)
        };

        let totals = aggregate_fleet(&[a, b], &config);
        assert_eq!(totals.vehicles, 2);
        assert_eq!(totals.trips, 4);
        assert_eq!(totals.engine_hours, 5.0);
        assert_eq!(totals.driving_hours, 4.0);
        assert_eq!(totals.fuel_liters, 24.0);
        assert_eq!(totals.fuel_cost, 120.0);
        assert_eq!(totals.idle_fuel_cost, 7.5);
        assert_eq!(totals.avg_idle_fuel_rate_lph, 3.0);
    }
}

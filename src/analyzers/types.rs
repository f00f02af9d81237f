//! Data types used by the metrics pipeline.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::telemetry::Position;

/// Inclusive analysis window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            bail!("window end {end} is before start {start}");
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }
}

/// A position paired with its resolved timestamp.
#[derive(Debug, Clone, Copy)]
pub struct TimedPosition<'a> {
    pub time: DateTime<Utc>,
    pub position: &'a Position,
}

/// Per-vehicle output of the kinematic scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    pub distance_km: f64,
    pub ignition_seconds: f64,
    pub driving_seconds: f64,
    pub idle_seconds: f64,
}

/// Trip-summary figures summed per vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripTotals {
    pub count: usize,
    pub duration_ms: f64,
    pub engine_hours_ms: f64,
    pub spent_fuel_liters: f64,
    pub distance_m: f64,
}

/// Fuel-consumption class inferred from a device's category text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Light,
    Diesel,
    Heavy,
}

/// Where a vehicle's idle burn rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleRateSource {
    Attribute,
    ClassDefault,
}

/// Final per-vehicle metrics for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleMetrics {
    pub device_id: i64,
    pub device_name: String,
    pub vehicle_class: VehicleClass,
    pub distance_km: f64,
    pub trips: usize,
    pub engine_hours: f64,
    pub driving_hours: f64,
    pub idle_hours: f64,
    pub fuel_liters: f64,
    pub fuel_efficiency_km_l: Option<f64>,
    pub idle_fuel_rate_lph: f64,
    pub idle_rate_source: IdleRateSource,
    pub idle_fuel_liters: f64,
    /// False when engine hours fall short of driving + idle hours.
    pub engine_hours_consistent: bool,
}

/// Fleet-wide sums and blended rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetTotals {
    pub vehicles: usize,
    pub distance_km: f64,
    pub trips: usize,
    pub engine_hours: f64,
    pub driving_hours: f64,
    pub idle_hours: f64,
    pub fuel_liters: f64,
    pub fuel_cost: f64,
    pub avg_idle_fuel_rate_lph: f64,
    pub idle_fuel_liters: f64,
    pub idle_fuel_cost: f64,
    pub avg_fuel_efficiency_km_l: Option<f64>,
}

/// Complete result of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetReport {
    pub window: TimeWindow,
    pub vehicles: Vec<VehicleMetrics>,
    pub totals: FleetTotals,
}

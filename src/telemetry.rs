//! Raw telemetry records as delivered by a Traccar-compatible backend.
//!
//! Fields that backends disagree on (numbers sent as strings, ids that may be
//! missing or non-numeric, several timestamp formats) are read through
//! tolerant deserializers: a malformed value becomes `None` instead of
//! failing the whole record.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::attributes::{self, coerce_bool, parse_number};

/// One GPS fix for a device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default, deserialize_with = "tolerant_id")]
    pub device_id: Option<i64>,
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub device_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub fix_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub server_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "tolerant_f64")]
    pub speed: Option<f64>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Position {
    /// Device time, then fix time, then server time.
    pub fn resolved_time(&self) -> Option<DateTime<Utc>> {
        self.device_time.or(self.fix_time).or(self.server_time)
    }

    pub fn ignition(&self) -> bool {
        self.attributes.get("ignition").is_some_and(coerce_bool)
    }

    /// Cumulative odometer in meters.
    pub fn total_distance(&self) -> Option<f64> {
        self.attributes
            .get("totalDistance")
            .and_then(parse_number)
            .filter(|v| *v >= 0.0)
    }

    /// Distance covered since the previous fix, in meters.
    pub fn incremental_distance(&self) -> Option<f64> {
        self.attributes
            .get("distance")
            .and_then(parse_number)
            .filter(|v| *v > 0.0)
    }
}

/// One backend-computed trip.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    #[serde(default, deserialize_with = "tolerant_id")]
    pub device_id: Option<i64>,
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds.
    #[serde(default, deserialize_with = "tolerant_f64")]
    pub duration: Option<f64>,
    /// Milliseconds.
    #[serde(default, deserialize_with = "tolerant_f64")]
    pub engine_hours: Option<f64>,
    /// Liters.
    #[serde(default, deserialize_with = "tolerant_f64")]
    pub spent_fuel: Option<f64>,
    /// Meters.
    #[serde(default, deserialize_with = "tolerant_f64")]
    pub distance: Option<f64>,
}

/// A vehicle or tracking unit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "tolerant_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Device {
    pub fn plate(&self) -> Option<&str> {
        attributes::lookup_text(&self.attributes, &["plate", "placa", "licensePlate"])
    }
}

/// Parses a timestamp from RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` (read as
/// UTC) or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            // Traccar emits offsets without a colon, e.g. +0000
            if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => {
            let ms = n.as_f64().filter(|f| f.is_finite())?;
            Utc.timestamp_millis_opt(ms as i64).single()
        }
        _ => None,
    }
}

fn tolerant_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}

fn tolerant_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(parse_number))
}

fn tolerant_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(parse_timestamp))
}

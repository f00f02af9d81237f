//! JSON decoding for telemetry documents.

use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::telemetry::{Device, Position, TripSummary};

/// Decodes a JSON array of position samples.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON array. Elements that do not
/// decode as a position are skipped.
pub fn parse_positions(bytes: &[u8]) -> Result<Vec<Position>> {
    parse_records(bytes, "position")
}

/// Decodes a JSON array of trip-summary records.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<TripSummary>> {
    parse_records(bytes, "trip")
}

/// Decodes a JSON array of devices.
pub fn parse_devices(bytes: &[u8]) -> Result<Vec<Device>> {
    parse_records(bytes, "device")
}

fn parse_records<T: DeserializeOwned>(bytes: &[u8], kind: &str) -> Result<Vec<T>> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_records(value, kind)
}

/// Decodes an already-parsed JSON array, skipping elements that do not
/// decode as `T`. `kind` names the record type in errors and logs.
pub fn decode_records<T: DeserializeOwned>(value: Value, kind: &str) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(anyhow!("expected a JSON array of {kind} records"));
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if records.len() < total {
        debug!(kind, skipped = total - records.len(), "Skipped malformed records");
    }

    Ok(records)
}

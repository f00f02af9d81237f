//! Tolerant readers for free-form telemetry attribute bags.
//!
//! Device and position attributes are defined by the tracking backend and
//! their shape changes between firmware and protocol versions, so they are
//! kept as raw JSON maps and read through these helpers instead of being
//! modelled as typed structs.

use serde_json::{Map, Value};

/// Coerces a mixed-type telemetry flag into a boolean.
///
/// Booleans pass through, nonzero numbers are true, and strings are true
/// when they read `"true"`, `"yes"`, `"on"` or a nonzero number. Anything
/// else, including `null`, is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f != 0.0),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            match s.as_str() {
                "true" | "yes" | "on" => true,
                _ => parse_number_str(&s).is_some_and(|f| f != 0.0),
            }
        }
        _ => false,
    }
}

/// Reads a finite number from a JSON number or a numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

/// Parses a numeric string, accepting a comma as the decimal separator.
///
/// `"1,5"` reads as 1.5 and `"1.234,5"` as 1234.5.
pub fn parse_number_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalized = match (s.contains(','), s.contains('.')) {
        (true, true) => s.replace('.', "").replace(',', "."),
        (true, false) => s.replace(',', "."),
        _ => s.to_string(),
    };

    normalized.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Resolves `key` in an attribute bag.
///
/// A literal key wins; otherwise a dotted key such as `fuel.idleRate` walks
/// into nested objects.
pub fn lookup<'a>(attrs: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(v) = attrs.get(key) {
        return Some(v);
    }

    let mut parts = key.split('.');
    let mut current = attrs.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Returns the first candidate key holding a positive number.
pub fn lookup_positive(attrs: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| lookup(attrs, key))
        .filter_map(parse_number)
        .find(|v| *v > 0.0)
}

/// Returns the first candidate key holding a non-empty string.
pub fn lookup_text<'a>(attrs: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| lookup(attrs, key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

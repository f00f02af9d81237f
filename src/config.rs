use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and default rates used by the metrics pipeline.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "idle_threshold_secs": 180,
///   "min_driving_speed_kmh": 5.0,
///   "heavy_idle_rate_lph": 3.2,
///   "fuel_price_per_liter": 5.89
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Continuous stationary time with ignition on before idle is credited.
    pub idle_threshold_secs: f64,
    /// Speeds above this count as driving; `(0, min]` is a dead zone.
    pub min_driving_speed_kmh: f64,
    pub light_idle_rate_lph: f64,
    pub diesel_idle_rate_lph: f64,
    pub heavy_idle_rate_lph: f64,
    pub fuel_price_per_liter: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: 180.0,
            min_driving_speed_kmh: 5.0,
            light_idle_rate_lph: 0.8,
            diesel_idle_rate_lph: 1.5,
            heavy_idle_rate_lph: 3.0,
            fuel_price_per_liter: 6.0,
        }
    }
}

impl MetricsConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metrics config '{path}'"))?;
        let config: MetricsConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid metrics config '{path}'"))?;
        Ok(config)
    }

    /// Loads from `path` when given, else the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

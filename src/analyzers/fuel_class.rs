//! Idle burn rate and fuel efficiency resolution for a device.

use crate::analyzers::types::{IdleRateSource, VehicleClass};
use crate::attributes::{lookup_positive, lookup_text};
use crate::config::MetricsConfig;
use crate::telemetry::Device;

/// Attribute keys that may carry an explicit idle burn rate (L/h).
static IDLE_RATE_KEYS: &[&str] = &[
    "idleFuelRate",
    "idleConsumption",
    "idleFuelConsumption",
    "idleBurnRate",
    "idleRate",
    "idle_fuel_rate",
    "fuel.idleRate",
    "fuel.idleConsumption",
    "fuel.idle",
];

/// Attribute keys that may carry a fuel efficiency (km/L).
static EFFICIENCY_KEYS: &[&str] = &[
    "fuelEfficiency",
    "kmPerLiter",
    "kmPerLitre",
    "kml",
    "consumoMedio",
    "fuel.efficiency",
    "fuel.kmPerLiter",
];

static FUEL_TYPE_KEYS: &[&str] = &["fuelType", "fuel_type", "combustivel", "fuel.type"];

/// Classification rules, evaluated in order. The first rule with a keyword
/// matching a word of the device's category text wins; no match is `Light`.
static CLASS_RULES: &[(VehicleClass, &[&str])] = &[
    (
        VehicleClass::Heavy,
        &[
            "caminhao", "caminhoes", "truck", "trucks", "tractor", "trator", "carreta",
            "cavalo", "bitrem", "rodotrem", "basculante", "munck", "bus", "onibus",
            "microonibus", "lorry",
        ],
    ),
    (
        VehicleClass::Diesel,
        &[
            "diesel", "van", "vans", "pickup", "picape", "caminhonete", "utilitario",
            "furgao", "sprinter",
        ],
    ),
];

/// Classifies free text such as `"Caminhão Basculante"`.
pub fn classify(text: &str) -> VehicleClass {
    let folded = fold(text);
    let words: Vec<&str> = folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    CLASS_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(class, _)| *class)
        .unwrap_or(VehicleClass::Light)
}

/// Classifies a device from its category, model and fuel type.
pub fn classify_device(device: &Device) -> VehicleClass {
    let text = [
        device.category.as_deref(),
        device.model.as_deref(),
        lookup_text(&device.attributes, FUEL_TYPE_KEYS),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    classify(&text)
}

pub fn class_default_rate(class: VehicleClass, config: &MetricsConfig) -> f64 {
    match class {
        VehicleClass::Light => config.light_idle_rate_lph,
        VehicleClass::Diesel => config.diesel_idle_rate_lph,
        VehicleClass::Heavy => config.heavy_idle_rate_lph,
    }
}

/// Resolves a device's idle burn rate in L/h: an explicit attribute first,
/// then the default for its class. Unknown devices get the light default.
pub fn resolve_idle_rate(
    device: Option<&Device>,
    config: &MetricsConfig,
) -> (f64, IdleRateSource, VehicleClass) {
    let Some(device) = device else {
        return (
            config.light_idle_rate_lph,
            IdleRateSource::ClassDefault,
            VehicleClass::Light,
        );
    };

    let class = classify_device(device);
    match lookup_positive(&device.attributes, IDLE_RATE_KEYS) {
        Some(rate) => (rate, IdleRateSource::Attribute, class),
        None => (class_default_rate(class, config), IdleRateSource::ClassDefault, class),
    }
}

/// Explicit fuel efficiency from device attributes, in km/L.
pub fn fuel_efficiency(device: Option<&Device>) -> Option<f64> {
    device.and_then(|d| lookup_positive(&d.attributes, EFFICIENCY_KEYS))
}

/// Lowercases and strips Portuguese/Spanish diacritics.
fn fold(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

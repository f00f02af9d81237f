pub mod analyzers;
pub mod attributes;
pub mod config;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod signature;
pub mod telemetry;

pub use analyzers::analyzer::{FleetInput, analyze};
pub use analyzers::ingest::active_devices;
pub use analyzers::types::{FleetReport, FleetTotals, TimeWindow, VehicleMetrics};
pub use config::MetricsConfig;

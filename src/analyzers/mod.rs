//! Fleet motion, idle and fuel metrics.
//!
//! Raw positions and trip summaries flow one way through the pipeline:
//! ingest filter, per-vehicle kinematic scan, reconciliation against
//! backend trip figures, then fleet aggregation. Every stage is a pure
//! function of its inputs.

pub mod aggregate;
pub mod analyzer;
pub mod fuel_class;
pub mod ingest;
pub mod reconcile;
pub mod scanner;
pub mod types;
pub mod utility;

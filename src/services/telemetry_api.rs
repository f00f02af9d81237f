//! Trait for a tracking backend, and loading of a full fleet input from it.

use std::collections::BTreeSet;

use anyhow::Result;
use fleet_metrics::analyzers::types::TimeWindow;
use fleet_metrics::telemetry::{Device, Position, TripSummary};
use fleet_metrics::FleetInput;
use tracing::{debug, warn};

/// Abstraction over a tracking backend (e.g., Traccar).
#[async_trait::async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Returns every device visible to the account.
    async fn devices(&self) -> Result<Vec<Device>>;

    /// Returns one device's positions inside `window`.
    async fn positions(&self, device_id: i64, window: &TimeWindow) -> Result<Vec<Position>>;

    /// Returns one device's trip summaries inside `window`.
    async fn trips(&self, device_id: i64, window: &TimeWindow) -> Result<Vec<TripSummary>>;
}

/// Result of [`load_fleet_input`].
#[derive(Debug, Default)]
pub struct FleetLoad {
    pub input: FleetInput,
    /// Number of position or trip requests that failed.
    pub failed_requests: usize,
}

/// Fetches positions and trips for every active device.
///
/// A failed request is logged and counted, and leaves that device without
/// data for this refresh; it does not fail the whole load.
pub async fn load_fleet_input<A: TelemetryApi + ?Sized>(
    api: &A,
    devices: Vec<Device>,
    active: &BTreeSet<i64>,
    window: &TimeWindow,
) -> FleetLoad {
    let mut input = FleetInput {
        devices,
        ..Default::default()
    };
    let mut failed_requests = 0;

    for &device_id in active {
        match api.positions(device_id, window).await {
            Ok(mut positions) => {
                debug!(device_id, count = positions.len(), "Positions fetched");
                input.positions.append(&mut positions);
            }
            Err(e) => {
                warn!(device_id, error = %e, "Position fetch failed");
                failed_requests += 1;
            }
        }

        match api.trips(device_id, window).await {
            Ok(mut trips) => {
                debug!(device_id, count = trips.len(), "Trips fetched");
                input.trips.append(&mut trips);
            }
            Err(e) => {
                warn!(device_id, error = %e, "Trip fetch failed");
                failed_requests += 1;
            }
        }
    }

    FleetLoad {
        input,
        failed_requests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{Duration, TimeZone, Utc};

    struct FakeApi;

    #[async_trait::async_trait]
    impl TelemetryApi for FakeApi {
        async fn devices(&self) -> Result<Vec<Device>> {
            Ok(vec![])
        }

        async fn positions(&self, device_id: i64, _window: &TimeWindow) -> Result<Vec<Position>> {
            if device_id == 2 {
                return Err(anyhow!("connection reset"));
            }
            Ok(vec![Position {
                device_id: Some(device_id),
                ..Default::default()
            }])
        }

        async fn trips(&self, device_id: i64, _window: &TimeWindow) -> Result<Vec<TripSummary>> {
            Ok(vec![TripSummary {
                device_id: Some(device_id),
                ..Default::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_clean_load_reports_no_failures() {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + Duration::hours(1)).unwrap();

        let load = load_fleet_input(&FakeApi, vec![], &BTreeSet::from([1, 3]), &window).await;

        assert_eq!(load.failed_requests, 0);
        assert_eq!(load.input.positions.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_device_fetch_yields_empty_set() {
        let start = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + Duration::hours(1)).unwrap();
        let active = BTreeSet::from([1, 2]);

        let FleetLoad {
            input,
            failed_requests,
        } = load_fleet_input(&FakeApi, vec![], &active, &window).await;

        assert_eq!(failed_requests, 1);
        assert_eq!(input.positions.len(), 1);
        assert_eq!(input.positions[0].device_id, Some(1));
        assert_eq!(input.trips.len(), 2);
    }
}

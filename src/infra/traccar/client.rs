use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use fleet_metrics::analyzers::types::TimeWindow;
use fleet_metrics::fetch::auth::BasicAuth;
use fleet_metrics::fetch::{BasicClient, fetch_json};
use fleet_metrics::parser::decode_records;
use fleet_metrics::telemetry::{Device, Position, TripSummary};

use super::TraccarSettings;
use crate::services::telemetry_api::TelemetryApi;

pub struct TraccarClient {
    base_url: String,
    http: BasicAuth<BasicClient>,
}

impl TraccarClient {
    pub fn new(settings: &TraccarSettings) -> Result<Self> {
        let http = BasicAuth::new(BasicClient::new()?, &settings.username, &settings.password)?;
        Ok(Self {
            base_url: settings.base_url.clone(),
            http,
        })
    }

    fn window_query(device_id: i64, window: &TimeWindow) -> Vec<(&'static str, String)> {
        vec![
            ("deviceId", device_id.to_string()),
            ("from", iso(window.start)),
            ("to", iso(window.end)),
        ]
    }
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl TelemetryApi for TraccarClient {
    async fn devices(&self) -> Result<Vec<Device>> {
        let url = format!("{}/api/devices", self.base_url);
        let json = fetch_json(&self.http, &url, &[]).await?;
        decode_records(json, "device")
    }

    #[tracing::instrument(skip(self, window))]
    async fn positions(&self, device_id: i64, window: &TimeWindow) -> Result<Vec<Position>> {
        let url = format!("{}/api/positions", self.base_url);
        let json = fetch_json(&self.http, &url, &Self::window_query(device_id, window)).await?;
        decode_records(json, "position")
    }

    #[tracing::instrument(skip(self, window))]
    async fn trips(&self, device_id: i64, window: &TimeWindow) -> Result<Vec<TripSummary>> {
        let url = format!("{}/api/reports/trips", self.base_url);
        let json = fetch_json(&self.http, &url, &Self::window_query(device_id, window)).await?;
        decode_records(json, "trip")
    }
}

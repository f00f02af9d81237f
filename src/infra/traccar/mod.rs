//! Traccar REST backend.

mod client;

pub use client::TraccarClient;

use anyhow::{Context, Result};

/// Connection settings read from the environment (`.env` is honoured).
#[derive(Debug, Clone)]
pub struct TraccarSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl TraccarSettings {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TRACCAR_URL").context("TRACCAR_URL must be set")?;
        let username = std::env::var("TRACCAR_USER").context("TRACCAR_USER must be set")?;
        let password = std::env::var("TRACCAR_PASSWORD").unwrap_or_default();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }
}

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Utc;
use parley_types::api::HealthResponse;
use parley_types::models::Channel;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::registry::Registry;

/// Authenticated liveness + identity check against a channel service.
/// The registry lock is only taken for the heartbeat write after the
/// network call has completed, never across it.
pub struct HealthVerifier {
    client: reqwest::Client,
}

impl HealthVerifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// True only if the channel answers `/health` with a success status and
    /// the exact name on file. The name comparison stops a channel from
    /// renaming itself without re-registering. A timeout counts as a
    /// failure and is not retried here.
    pub async fn verify(&self, registry: &Registry, channel: &Channel) -> bool {
        let name = match self.fetch_health(channel).await {
            Ok(health) => health.name,
            Err(e) => {
                warn!("Health check failed for {}: {}", channel.endpoint, e);
                return false;
            }
        };

        if name != channel.name {
            warn!(
                "Channel {} reported name '{}', expected '{}'",
                channel.endpoint, name, channel.name
            );
            return false;
        }

        let registry = registry.clone();
        let id = channel.id;
        let heartbeat = tokio::task::spawn_blocking(move || registry.record_heartbeat(id, Utc::now()))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|r| r);
        if let Err(e) = heartbeat {
            warn!("Failed to record heartbeat for channel {}: {}", id, e);
            return false;
        }

        debug!("Channel {} verified", channel.endpoint);
        true
    }

    async fn fetch_health(&self, channel: &Channel) -> Result<HealthResponse> {
        let url = format!("{}/health", channel.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("authkey {}", channel.authkey))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("unexpected status {}", response.status());
        }

        // A body without a `name` field fails deserialization here.
        Ok(response.json::<HealthResponse>().await?)
    }
}

use std::time::Duration;

use anyhow::anyhow;
use thiserror::Error;
use tracing::{info, warn};

use crate::registry::{ListFilter, Registry};
use crate::verify::HealthVerifier;

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub endpoint: String,
    pub authkey: String,
    pub service_type: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RegisterOutcome {
    pub created: bool,
    pub id: i64,
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("channel is not healthy")]
    Unhealthy,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Upsert, then verify the channel end-to-end. A brand-new row that fails
/// verification is rolled back so no orphan unhealthy channel persists; a
/// known row is left in place but inactive. Only a passing verification
/// activates the row.
pub async fn register(
    registry: &Registry,
    verifier: &HealthVerifier,
    registration: Registration,
) -> Result<RegisterOutcome, RegisterError> {
    let r = registry.clone();
    let (channel, created) = tokio::task::spawn_blocking(move || {
        r.upsert(
            &registration.endpoint,
            &registration.name,
            &registration.authkey,
            &registration.service_type,
        )
    })
    .await
    .map_err(|e| anyhow!("join error: {e}"))??;

    if !verifier.verify(registry, &channel).await {
        if created {
            let r = registry.clone();
            tokio::task::spawn_blocking(move || r.delete(channel.id))
                .await
                .map_err(|e| anyhow!("join error: {e}"))??;
        }
        return Err(RegisterError::Unhealthy);
    }

    let r = registry.clone();
    tokio::task::spawn_blocking(move || r.set_active(channel.id, true))
        .await
        .map_err(|e| anyhow!("join error: {e}"))??;

    info!(
        "Channel '{}' at {} registered (created: {})",
        channel.name, channel.endpoint, created
    );
    Ok(RegisterOutcome {
        created,
        id: channel.id,
    })
}

/// Periodic re-verification of every registered channel, independent of any
/// inbound request. Hub-to-channel consistency is best effort: a channel
/// that stops answering is flipped inactive on the next pass, and flipped
/// back once it answers with the right identity again.
pub async fn reverify_loop(registry: Registry, verifier: HealthVerifier, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // the first tick fires immediately; skip it so startup stays quiet
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if let Err(e) = reverify_all(&registry, &verifier).await {
            warn!("Re-verification pass failed: {}", e);
        }
    }
}

async fn reverify_all(registry: &Registry, verifier: &HealthVerifier) -> anyhow::Result<()> {
    let r = registry.clone();
    let channels = tokio::task::spawn_blocking(move || r.list(ListFilter::All))
        .await
        .map_err(|e| anyhow!("join error: {e}"))??;

    for channel in channels {
        let healthy = verifier.verify(registry, &channel).await;
        if healthy != channel.active {
            info!(
                "Channel '{}' at {} is now {}",
                channel.name,
                channel.endpoint,
                if healthy { "active" } else { "inactive" }
            );
        }
        let r = registry.clone();
        tokio::task::spawn_blocking(move || r.set_active(channel.id, healthy))
            .await
            .map_err(|e| anyhow!("join error: {e}"))??;
    }

    Ok(())
}

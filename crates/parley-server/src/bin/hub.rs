use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::{HubStateInner, hub_router};
use parley_db::Database;
use parley_hub::{HealthVerifier, HubConfig, Registry, reverify_loop};
use parley_server::{env_or, env_parse, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    init_tracing();

    // Config
    let host = env_or("PARLEY_HUB_HOST", "0.0.0.0");
    let port: u16 = env_parse("PARLEY_HUB_PORT", 5555);
    let db_path = env_or("PARLEY_HUB_DB_PATH", "parley-hub.db");

    let mut config = HubConfig::new(env_or("PARLEY_HUB_AUTHKEY", "dev-authkey-change-me"));
    config.verify_timeout = Duration::from_secs(env_parse("PARLEY_VERIFY_TIMEOUT_SECS", 5));
    config.reverify_interval =
        Duration::from_secs(env_parse("PARLEY_REVERIFY_INTERVAL_SECS", 300));

    // Registry over the shared database handle
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);
    let registry = Registry::new(db);
    let verifier = HealthVerifier::new(config.verify_timeout)?;

    // Independent periodic re-verification of every registered channel
    tokio::spawn(reverify_loop(
        registry.clone(),
        HealthVerifier::new(config.verify_timeout)?,
        config.reverify_interval,
    ));

    let state = Arc::new(HubStateInner {
        registry,
        verifier,
        config,
    });

    let app = hub_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parley hub listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::{BoardStateInner, board_router};
use parley_board::{Board, BoardConfig, SqliteLog, WordListFilter};
use parley_db::Database;
use parley_server::{env_or, env_parse, init_tracing};
use parley_types::api::RegisterChannelResponse;

struct Settings {
    host: String,
    port: u16,
    db_path: String,
    authkey: String,
    endpoint: String,
    service_type: String,
    hub_url: String,
    hub_authkey: String,
    board: BoardConfig,
}

fn settings() -> Settings {
    let port: u16 = env_parse("PARLEY_BOARD_PORT", 5002);
    let mut board = BoardConfig::new(env_or("PARLEY_BOARD_NAME", "Volunteers Wanted Board"));
    board.max_messages = env_parse("PARLEY_MAX_MESSAGES", 50);
    board.message_expiry = Duration::days(env_parse("PARLEY_MESSAGE_EXPIRY_DAYS", 30));

    Settings {
        host: env_or("PARLEY_BOARD_HOST", "0.0.0.0"),
        port,
        db_path: env_or("PARLEY_BOARD_DB_PATH", "parley-board.db"),
        authkey: env_or("PARLEY_BOARD_AUTHKEY", "dev-channel-key"),
        endpoint: env_or(
            "PARLEY_BOARD_ENDPOINT",
            &format!("http://localhost:{port}"),
        ),
        service_type: env_or("PARLEY_BOARD_TYPE", "parley:board"),
        hub_url: env_or("PARLEY_HUB_URL", "http://localhost:5555"),
        hub_authkey: env_or("PARLEY_HUB_AUTHKEY", "dev-authkey-change-me"),
        board,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = settings();

    // `parley-board register` announces this board to the hub and exits.
    if std::env::args().nth(1).as_deref() == Some("register") {
        return self_register(&settings).await;
    }

    let db = Arc::new(Database::open(&PathBuf::from(&settings.db_path))?);
    let board = Board::new(
        settings.board,
        Box::new(SqliteLog::new(db)),
        Box::new(WordListFilter::default()),
    );

    let state = Arc::new(BoardStateInner {
        board,
        authkey: settings.authkey,
    });

    let app = board_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    info!("Parley board listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Announce this board to the hub. The hub will immediately call back on
/// `/health`, so the board must already be reachable at its endpoint when
/// this runs.
async fn self_register(settings: &Settings) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/channels", settings.hub_url.trim_end_matches('/')))
        .header(
            reqwest::header::AUTHORIZATION,
            format!("authkey {}", settings.hub_authkey),
        )
        .json(&serde_json::json!({
            "name": settings.board.name,
            "endpoint": settings.endpoint,
            "authkey": settings.authkey,
            "type_of_service": settings.service_type,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let reason = response.text().await.unwrap_or_default();
        bail!("registration failed: {} {}", status, reason);
    }

    let outcome: RegisterChannelResponse = response.json().await?;
    info!(
        "Registered with hub as channel {} (created: {})",
        outcome.id, outcome.created
    );
    Ok(())
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use parley_board::{Board, BoardError};
use parley_types::api::{HealthResponse, PostMessageRequest};
use parley_types::models::Message;

use crate::error::{ApiError, blocking};
use crate::middleware::authorized;

pub type BoardState = Arc<BoardStateInner>;

pub struct BoardStateInner {
    pub board: Board,
    pub authkey: String,
}

pub fn board_router(state: BoardState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(list_messages))
        .route("/", post(post_message))
        .layer(middleware::from_fn_with_state(state.clone(), require_authkey))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("no such resource")
}

/// Every board route sits behind the channel's own authkey.
async fn require_authkey(
    State(state): State<BoardState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !authorized(req.headers(), &state.authkey) {
        return Err(ApiError::unauthorized("invalid authorization"));
    }
    Ok(next.run(req).await)
}

/// Identity confirmation for the hub's verifier.
async fn health(State(state): State<BoardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        name: state.board.name().to_string(),
    })
}

async fn list_messages(State(state): State<BoardState>) -> Result<Json<Vec<Message>>, ApiError> {
    let messages =
        blocking(tokio::task::spawn_blocking(move || state.board.read_active()).await)?;
    Ok(Json(messages))
}

async fn post_message(
    State(state): State<BoardState>,
    Json(req): Json<PostMessageRequest>,
) -> Result<&'static str, ApiError> {
    let content = req.content.ok_or_else(|| ApiError::bad_request("no content"))?;
    let sender = req.sender.ok_or_else(|| ApiError::bad_request("no sender"))?;
    // required by the contract; the board stamps its own receipt time
    req.timestamp
        .ok_or_else(|| ApiError::bad_request("no timestamp"))?;

    let result =
        tokio::task::spawn_blocking(move || state.board.post(&content, &sender, req.extra, req.body))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("join error: {e}")))?;

    match result {
        Ok(()) => Ok("OK"),
        Err(BoardError::Profanity) => Err(ApiError::bad_request("no profanity allowed")),
        Err(BoardError::Storage(e)) => Err(ApiError::Internal(e)),
    }
}

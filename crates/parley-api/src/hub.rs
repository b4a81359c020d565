use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use parley_hub::{
    HealthVerifier, HubConfig, ListFilter, RegisterError, Registration, Registry, register,
};
use parley_types::api::{
    ChannelListResponse, ChannelSummary, RegisterChannelRequest, RegisterChannelResponse,
};

use crate::error::{ApiError, blocking};
use crate::middleware::authorized;

pub type HubState = Arc<HubStateInner>;

pub struct HubStateInner {
    pub registry: Registry,
    pub verifier: HealthVerifier,
    pub config: HubConfig,
}

pub fn hub_router(state: HubState) -> Router {
    Router::new()
        .route("/channels", get(list_channels))
        .route("/channels", post(register_channel))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("no such resource")
}

/// Public listing. Deliberately returns every row — inactive channels and
/// authkeys included — because that is the documented contract.
async fn list_channels(
    State(state): State<HubState>,
) -> Result<Json<ChannelListResponse>, ApiError> {
    let registry = state.registry.clone();
    let channels =
        blocking(tokio::task::spawn_blocking(move || registry.list(ListFilter::All)).await)?;

    Ok(Json(ChannelListResponse {
        channels: channels
            .into_iter()
            .map(|c| ChannelSummary {
                name: c.name,
                endpoint: c.endpoint,
                authkey: c.authkey,
                type_of_service: c.service_type,
            })
            .collect(),
    }))
}

async fn register_channel(
    State(state): State<HubState>,
    headers: HeaderMap,
    Json(req): Json<RegisterChannelRequest>,
) -> Result<Json<RegisterChannelResponse>, ApiError> {
    if !authorized(&headers, &state.config.admin_authkey) {
        return Err(ApiError::unauthorized("invalid authorization header"));
    }

    let registration = Registration {
        name: required(req.name, "record has no name")?,
        endpoint: required(req.endpoint, "record has no endpoint")?,
        authkey: required(req.authkey, "record has no authkey")?,
        service_type: required(req.type_of_service, "record has no type of service")?,
    };

    let outcome = register(&state.registry, &state.verifier, registration)
        .await
        .map_err(|e| match e {
            RegisterError::Unhealthy => ApiError::bad_request("channel is not healthy"),
            RegisterError::Storage(e) => ApiError::Internal(e),
        })?;

    Ok(Json(RegisterChannelResponse {
        created: outcome.created,
        id: outcome.id,
    }))
}

fn required(field: Option<String>, reason: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::bad_request(reason)),
    }
}

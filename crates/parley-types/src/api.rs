use serde::{Deserialize, Serialize};

// -- Hub --

/// Inbound registration body. Every field is required by the contract, but
/// they are modeled as `Option` so the handler can answer a 400 naming the
/// missing field instead of a framework-level rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterChannelRequest {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub authkey: Option<String>,
    pub type_of_service: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterChannelResponse {
    pub created: bool,
    pub id: i64,
}

/// One row of the public channel listing. Mirrors the stored record,
/// authkey included — the listing contract deliberately exposes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub endpoint: String,
    pub authkey: String,
    pub type_of_service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelSummary>,
}

// -- Channel --

/// Payload of `GET /health`; the hub compares `name` against its registry
/// to detect a channel that renamed itself without re-registering.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
}

/// Inbound message body. `timestamp` must be present but is otherwise
/// opaque: the board stamps its own receipt time on the stored message.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub content: Option<String>,
    pub sender: Option<String>,
    pub timestamp: Option<String>,
    pub extra: Option<String>,
    pub body: Option<serde_json::Value>,
}

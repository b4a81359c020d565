use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A channel service known to the hub. `endpoint` is the unique key;
/// re-registering the same endpoint updates this row in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub endpoint: String,
    pub authkey: String,
    pub service_type: String,
    pub active: bool,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

/// A single board message. Messages are never deleted; expiry and
/// retroactive moderation only flip `active` to false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    pub extra: Option<String>,
    pub active: bool,
    pub body: Option<serde_json::Value>,
}

/// Reserved id of the pinned welcome message.
pub const WELCOME_ID: Uuid = Uuid::nil();

pub const WELCOME_CONTENT: &str = "Welcome to the Volunteers Wanted Board! \
    Post about volunteer opportunities or ask for help. Use [b]bold[/b] or \
    [i]italic[/i] for emphasis. Tag your message with 'extra' like 'urgent' \
    or 'event'.";

pub const SYSTEM_SENDER: &str = "System";

impl Message {
    /// The pinned welcome message. Synthesized whenever the stored log is
    /// missing it; its timestamp is irrelevant because listings always pin
    /// it first.
    pub fn welcome() -> Self {
        Self {
            id: WELCOME_ID,
            content: WELCOME_CONTENT.to_string(),
            sender: SYSTEM_SENDER.to_string(),
            timestamp: DateTime::UNIX_EPOCH,
            extra: Some("pinned".to_string()),
            active: true,
            body: None,
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_ID
    }
}

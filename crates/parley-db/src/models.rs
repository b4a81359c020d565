/// Raw `channels` row. Timestamps stay as stored TEXT; the registry layer
/// parses them and decides what to do with corrupt values.
#[derive(Debug, Clone)]
pub struct ChannelRow {
    pub id: i64,
    pub name: String,
    pub endpoint: String,
    pub authkey: String,
    pub service_type: String,
    pub active: bool,
    pub last_heartbeat: Option<String>,
}

/// Raw `messages` row. `body` is opaque JSON text or NULL.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub content: String,
    pub sender: String,
    pub timestamp: String,
    pub extra: Option<String>,
    pub active: bool,
    pub body: Option<String>,
}

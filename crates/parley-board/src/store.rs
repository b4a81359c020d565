use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parley_db::Database;
use parley_db::models::MessageRow;
use parley_types::models::Message;
use tracing::warn;
use uuid::Uuid;

/// Durable message log seam. The board only needs append, full read, and
/// flag persistence; the backing store is swappable behind this trait.
pub trait MessageLog: Send + Sync {
    /// The full log, inactive rows included. Implementations must self-heal
    /// an empty or unreadable log into the welcome-only state rather than
    /// surface the failure.
    fn read_all(&self) -> Result<Vec<Message>>;

    /// Append a message. Appending an id that already exists is a no-op,
    /// which is what makes the ensure-welcome insert idempotent.
    fn append(&self, msg: &Message) -> Result<()>;

    fn set_active(&self, id: Uuid, active: bool) -> Result<()>;
}

/// Sqlite-backed log over the shared `Database` handle.
pub struct SqliteLog {
    db: Arc<Database>,
}

impl SqliteLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl MessageLog for SqliteLog {
    fn read_all(&self) -> Result<Vec<Message>> {
        let rows = match self.db.read_messages() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Message log unreadable, reinitializing: {}", e);
                let welcome = Message::welcome();
                self.db.reset_messages(&to_row(&welcome))?;
                return Ok(vec![welcome]);
            }
        };

        if rows.is_empty() {
            warn!("Message log empty, seeding welcome message");
            let welcome = Message::welcome();
            self.db.reset_messages(&to_row(&welcome))?;
            return Ok(vec![welcome]);
        }

        Ok(rows.into_iter().filter_map(from_row).collect())
    }

    fn append(&self, msg: &Message) -> Result<()> {
        self.db.insert_message(&to_row(msg))
    }

    fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        self.db.set_message_active(&id.to_string(), active)
    }
}

fn to_row(msg: &Message) -> MessageRow {
    MessageRow {
        id: msg.id.to_string(),
        content: msg.content.clone(),
        sender: msg.sender.clone(),
        timestamp: msg.timestamp.to_rfc3339(),
        extra: msg.extra.clone(),
        active: msg.active,
        body: msg.body.as_ref().map(|b| b.to_string()),
    }
}

/// Decode one stored row, dropping it with a warning if any field is
/// corrupt. A dropped row is invisible but stays in storage.
fn from_row(row: MessageRow) -> Option<Message> {
    let id = match row.id.parse::<Uuid>() {
        Ok(id) => id,
        Err(e) => {
            warn!("Corrupt message id '{}': {}", row.id, e);
            return None;
        }
    };

    let timestamp = match parse_timestamp(&row.timestamp) {
        Some(ts) => ts,
        None => {
            warn!("Corrupt timestamp '{}' on message '{}'", row.timestamp, row.id);
            return None;
        }
    };

    let body = match row.body {
        Some(text) => match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt body on message '{}': {}", row.id, e);
                return None;
            }
        },
        None => None,
    };

    Some(Message {
        id,
        content: row.content,
        sender: row.sender,
        timestamp,
        extra: row.extra,
        active: row.active,
        body,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    text.parse::<DateTime<Utc>>().ok().or_else(|| {
        // Older logs stored "YYYY-MM-DD HH:MM:SS" without a timezone.
        chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .ok()
    })
}

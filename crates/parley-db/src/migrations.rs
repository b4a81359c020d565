use anyhow::Result;
use parley_types::models::Message;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS channels (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            endpoint        TEXT NOT NULL UNIQUE,
            authkey         TEXT NOT NULL,
            service_type    TEXT NOT NULL,
            active          INTEGER NOT NULL DEFAULT 1,
            last_heartbeat  TEXT
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            sender      TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            extra       TEXT,
            active      INTEGER NOT NULL DEFAULT 1,
            body        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_messages_timestamp
            ON messages(timestamp);
        ",
    )?;

    // Seed the pinned welcome message
    let welcome = Message::welcome();
    conn.execute(
        "INSERT OR IGNORE INTO messages (id, content, sender, timestamp, extra, active, body)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, NULL)",
        rusqlite::params![
            welcome.id.to_string(),
            welcome.content,
            welcome.sender,
            welcome.timestamp.to_rfc3339(),
            welcome.extra,
        ],
    )?;

    info!("Database migrations complete");
    Ok(())
}

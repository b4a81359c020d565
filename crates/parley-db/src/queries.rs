use crate::Database;
use crate::models::{ChannelRow, MessageRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Channels --

    /// Insert-or-update keyed by endpoint, in one lock hold. A new endpoint
    /// gets a fresh row with `active = 1` and the supplied heartbeat; an
    /// existing one has name/authkey/service_type replaced and `active`
    /// forced to 0 pending re-verification. Returns the resulting row and
    /// whether it was newly created.
    pub fn upsert_channel(
        &self,
        name: &str,
        endpoint: &str,
        authkey: &str,
        service_type: &str,
        heartbeat: &str,
    ) -> Result<(ChannelRow, bool)> {
        self.with_conn(|conn| {
            if let Some(existing) = query_channel_by_endpoint(conn, endpoint)? {
                conn.execute(
                    "UPDATE channels SET name = ?1, authkey = ?2, service_type = ?3, active = 0
                     WHERE id = ?4",
                    rusqlite::params![name, authkey, service_type, existing.id],
                )?;
                let row = ChannelRow {
                    name: name.to_string(),
                    authkey: authkey.to_string(),
                    service_type: service_type.to_string(),
                    active: false,
                    ..existing
                };
                Ok((row, false))
            } else {
                conn.execute(
                    "INSERT INTO channels (name, endpoint, authkey, service_type, active, last_heartbeat)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5)",
                    rusqlite::params![name, endpoint, authkey, service_type, heartbeat],
                )?;
                let row = ChannelRow {
                    id: conn.last_insert_rowid(),
                    name: name.to_string(),
                    endpoint: endpoint.to_string(),
                    authkey: authkey.to_string(),
                    service_type: service_type.to_string(),
                    active: true,
                    last_heartbeat: Some(heartbeat.to_string()),
                };
                Ok((row, true))
            }
        })
    }

    pub fn delete_channel(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM channels WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn set_channel_active(&self, id: i64, active: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE channels SET active = ?1 WHERE id = ?2",
                rusqlite::params![active, id],
            )?;
            Ok(())
        })
    }

    pub fn set_channel_heartbeat(&self, id: i64, heartbeat: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE channels SET last_heartbeat = ?1 WHERE id = ?2",
                rusqlite::params![heartbeat, id],
            )?;
            Ok(())
        })
    }

    pub fn get_channel_by_endpoint(&self, endpoint: &str) -> Result<Option<ChannelRow>> {
        self.with_conn(|conn| query_channel_by_endpoint(conn, endpoint))
    }

    pub fn list_channels(&self, active_only: bool) -> Result<Vec<ChannelRow>> {
        self.with_conn(|conn| {
            let sql = if active_only {
                "SELECT id, name, endpoint, authkey, service_type, active, last_heartbeat
                 FROM channels WHERE active = 1 ORDER BY id"
            } else {
                "SELECT id, name, endpoint, authkey, service_type, active, last_heartbeat
                 FROM channels ORDER BY id"
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map([], channel_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, msg: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO messages (id, content, sender, timestamp, extra, active, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    msg.id,
                    msg.content,
                    msg.sender,
                    msg.timestamp,
                    msg.extra,
                    msg.active,
                    msg.body,
                ],
            )?;
            Ok(())
        })
    }

    /// Full log in insertion order, inactive rows included.
    pub fn read_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, sender, timestamp, extra, active, body
                 FROM messages ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        sender: row.get(2)?,
                        timestamp: row.get(3)?,
                        extra: row.get(4)?,
                        active: row.get(5)?,
                        body: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_message_active(&self, id: &str, active: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET active = ?1 WHERE id = ?2",
                rusqlite::params![active, id],
            )?;
            Ok(())
        })
    }

    /// Wipe the log and reinsert only the given row. Used to recover from a
    /// log that cannot be read at all.
    pub fn reset_messages(&self, welcome: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM messages", [])?;
            conn.execute(
                "INSERT INTO messages (id, content, sender, timestamp, extra, active, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    welcome.id,
                    welcome.content,
                    welcome.sender,
                    welcome.timestamp,
                    welcome.extra,
                    welcome.active,
                    welcome.body,
                ],
            )?;
            Ok(())
        })
    }
}

fn query_channel_by_endpoint(conn: &Connection, endpoint: &str) -> Result<Option<ChannelRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, endpoint, authkey, service_type, active, last_heartbeat
         FROM channels WHERE endpoint = ?1",
    )?;

    let row = stmt.query_row([endpoint], channel_from_row).optional()?;
    Ok(row)
}

fn channel_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelRow> {
    Ok(ChannelRow {
        id: row.get(0)?,
        name: row.get(1)?,
        endpoint: row.get(2)?,
        authkey: row.get(3)?,
        service_type: row.get(4)?,
        active: row.get(5)?,
        last_heartbeat: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

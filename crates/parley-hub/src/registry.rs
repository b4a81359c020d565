use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parley_db::Database;
use parley_db::models::ChannelRow;
use parley_types::models::Channel;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    ActiveOnly,
}

/// The hub's durable channel table. All mutations serialize through the
/// `Database` mutex; the upsert runs select-and-write in a single lock hold.
#[derive(Clone)]
pub struct Registry {
    db: Arc<Database>,
}

impl Registry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Keyed by endpoint. A new endpoint is created active with a fresh
    /// heartbeat; an existing one keeps its id, gets name/authkey/service
    /// type replaced, and is deactivated pending re-verification.
    pub fn upsert(
        &self,
        endpoint: &str,
        name: &str,
        authkey: &str,
        service_type: &str,
    ) -> Result<(Channel, bool)> {
        let now = Utc::now().to_rfc3339();
        let (row, is_new) = self
            .db
            .upsert_channel(name, endpoint, authkey, service_type, &now)?;
        Ok((from_row(row), is_new))
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.delete_channel(id)
    }

    pub fn set_active(&self, id: i64, active: bool) -> Result<()> {
        self.db.set_channel_active(id, active)
    }

    pub fn record_heartbeat(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        self.db.set_channel_heartbeat(id, &at.to_rfc3339())
    }

    /// Channels in insertion (id) order.
    pub fn list(&self, filter: ListFilter) -> Result<Vec<Channel>> {
        let rows = self.db.list_channels(filter == ListFilter::ActiveOnly)?;
        Ok(rows.into_iter().map(from_row).collect())
    }
}

fn from_row(row: ChannelRow) -> Channel {
    let last_heartbeat = row.last_heartbeat.as_deref().and_then(|text| {
        text.parse::<DateTime<Utc>>()
            .map_err(|e| warn!("Corrupt heartbeat '{}' on channel {}: {}", text, row.id, e))
            .ok()
    });

    Channel {
        id: row.id,
        name: row.name,
        endpoint: row.endpoint,
        authkey: row.authkey,
        service_type: row.service_type,
        active: row.active,
        last_heartbeat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> Registry {
        Registry::new(Arc::new(Database::open_in_memory().expect("open db")))
    }

    #[test]
    fn new_endpoint_is_created_active() {
        let registry = test_registry();
        let (channel, is_new) = registry
            .upsert("http://one.example", "Board", "k1", "chat")
            .expect("upsert");

        assert!(is_new);
        assert!(channel.active);
        assert!(channel.last_heartbeat.is_some());
    }

    #[test]
    fn reregistration_updates_in_place() {
        let registry = test_registry();
        let (first, _) = registry
            .upsert("http://one.example", "Board", "k1", "chat")
            .expect("upsert");
        let (second, is_new) = registry
            .upsert("http://one.example", "Renamed", "k2", "chat")
            .expect("upsert");

        assert!(!is_new);
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Renamed");
        assert_eq!(second.authkey, "k2");
        assert!(!second.active, "pending re-verification");
        assert_eq!(registry.list(ListFilter::All).expect("list").len(), 1);
    }

    #[test]
    fn list_is_in_insertion_order_and_filters_active() {
        let registry = test_registry();
        let (a, _) = registry
            .upsert("http://a.example", "A", "k", "chat")
            .expect("upsert");
        let (b, _) = registry
            .upsert("http://b.example", "B", "k", "chat")
            .expect("upsert");
        registry.set_active(a.id, false).expect("set_active");

        let all = registry.list(ListFilter::All).expect("list");
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        let active = registry.list(ListFilter::ActiveOnly).expect("list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[test]
    fn delete_removes_row() {
        let registry = test_registry();
        let (channel, _) = registry
            .upsert("http://a.example", "A", "k", "chat")
            .expect("upsert");
        registry.delete(channel.id).expect("delete");
        assert!(registry.list(ListFilter::All).expect("list").is_empty());
    }

    #[test]
    fn heartbeat_is_recorded() {
        let registry = test_registry();
        let (channel, _) = registry
            .upsert("http://a.example", "A", "k", "chat")
            .expect("upsert");

        let at = Utc::now();
        registry.record_heartbeat(channel.id, at).expect("heartbeat");

        let listed = registry.list(ListFilter::All).expect("list");
        assert_eq!(listed[0].last_heartbeat, Some(at));
    }
}

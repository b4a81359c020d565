use anyhow::Result;
use chrono::{Duration, Utc};
use parley_types::models::Message;
use thiserror::Error;
use uuid::Uuid;

use crate::filter::ContentFilter;
use crate::reply::auto_reply;
use crate::store::MessageLog;
use crate::sweep::sweep;

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub name: String,
    pub max_messages: usize,
    pub message_expiry: Duration,
}

impl BoardConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_messages: 50,
            message_expiry: Duration::days(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("no profanity allowed")]
    Profanity,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// One channel's message lifecycle engine: bounded listing with the pinned
/// welcome message first, expiry/moderation sweep on read, and the post
/// flow with optional auto-replies.
pub struct Board {
    config: BoardConfig,
    log: Box<dyn MessageLog>,
    filter: Box<dyn ContentFilter>,
}

impl Board {
    pub fn new(config: BoardConfig, log: Box<dyn MessageLog>, filter: Box<dyn ContentFilter>) -> Self {
        Self { config, log, filter }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Sweep the log, persist any newly cleared flags, and return the active
    /// messages: welcome first, then at most `max_messages` of the newest,
    /// oldest-to-newest.
    pub fn read_active(&self) -> Result<Vec<Message>> {
        let mut messages = self.log.read_all()?;

        let cleared = sweep(
            &mut messages,
            Utc::now(),
            self.config.message_expiry,
            self.filter.as_ref(),
        );
        for id in cleared {
            self.log.set_active(id, false)?;
        }

        let welcome = messages
            .iter()
            .find(|m| m.is_welcome())
            .cloned()
            .unwrap_or_else(Message::welcome);

        let mut active: Vec<Message> = messages
            .into_iter()
            .filter(|m| m.active && !m.is_welcome())
            .collect();
        active.sort_by_key(|m| m.timestamp);
        if active.len() > self.config.max_messages {
            active.drain(..active.len() - self.config.max_messages);
        }

        active.insert(0, welcome);
        Ok(active)
    }

    /// Accept a message: trim, moderate, append, and append at most one
    /// generated reply. The welcome message is re-inserted first in case the
    /// log lost it; the duplicate insert is a no-op otherwise.
    pub fn post(
        &self,
        content: &str,
        sender: &str,
        extra: Option<String>,
        body: Option<serde_json::Value>,
    ) -> Result<(), BoardError> {
        let content = content.trim();
        if self.filter.is_profane(content) {
            return Err(BoardError::Profanity);
        }

        let now = Utc::now();
        self.log.append(&Message::welcome())?;
        self.log.append(&Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            sender: sender.to_string(),
            timestamp: now,
            extra: extra.clone(),
            active: true,
            body,
        })?;

        if let Some(reply) = auto_reply(content, sender, extra.as_deref(), now) {
            self.log.append(&reply)?;
        }

        Ok(())
    }
}

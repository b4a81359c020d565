use chrono::{DateTime, Utc};
use parley_types::models::Message;
use uuid::Uuid;

/// System identity used for generated replies.
pub const BOT_SENDER: &str = "VolunteerBot";

/// Derive at most one automated reply for an incoming message. Rules are
/// checked in priority order and the first match wins.
pub fn auto_reply(
    content: &str,
    sender: &str,
    extra: Option<&str>,
    now: DateTime<Utc>,
) -> Option<Message> {
    let content_lower = content.to_lowercase();

    if content_lower.contains("looking for volunteers") {
        return Some(bot_message(
            format!(
                "@{sender}, thanks for posting! Please provide more details \
                 (e.g., date, location) so others can join."
            ),
            "auto-response",
            now,
        ));
    }
    if content_lower.contains("can help") || content_lower.contains("available") {
        return Some(bot_message(
            format!(
                "@{sender}, great to hear! Please connect with recent posters \
                 or check pinned messages for opportunities."
            ),
            "auto-response",
            now,
        ));
    }
    if extra.is_some_and(|e| e.to_lowercase().contains("event")) {
        return Some(bot_message(
            format!("@{sender}, your event has been noted! It will be visible to other volunteers."),
            "event-notice",
            now,
        ));
    }
    None
}

fn bot_message(content: String, extra: &str, now: DateTime<Utc>) -> Message {
    Message {
        id: Uuid::new_v4(),
        content,
        sender: BOT_SENDER.to_string(),
        timestamp: now,
        extra: Some(extra.to_string()),
        active: true,
        body: None,
    }
}

use chrono::{DateTime, Duration, Utc};
use parley_types::models::Message;
use tracing::debug;
use uuid::Uuid;

use crate::filter::ContentFilter;

/// Recompute `active` for every non-pinned message: expired-by-age or
/// currently-profane messages are deactivated. The flip is one-way — a
/// message that is already inactive stays inactive — which makes the pass
/// idempotent and monotone. Returns the ids that changed so the caller can
/// persist them.
pub fn sweep(
    messages: &mut [Message],
    now: DateTime<Utc>,
    expiry: Duration,
    filter: &dyn ContentFilter,
) -> Vec<Uuid> {
    let mut deactivated = Vec::new();

    for msg in messages.iter_mut() {
        if msg.is_welcome() || !msg.active {
            continue;
        }
        if now - msg.timestamp > expiry {
            debug!("Message {} expired", msg.id);
            msg.active = false;
            deactivated.push(msg.id);
        } else if filter.is_profane(&msg.content) {
            debug!("Message {} contains a banned word", msg.id);
            msg.active = false;
            deactivated.push(msg.id);
        }
    }

    deactivated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::WordListFilter;

    fn msg(content: &str, age_days: i64, active: bool) -> Message {
        Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            sender: "tester".to_string(),
            timestamp: Utc::now() - Duration::days(age_days),
            extra: None,
            active,
            body: None,
        }
    }

    #[test]
    fn old_messages_expire() {
        let filter = WordListFilter::default();
        let mut log = vec![msg("fresh", 1, true), msg("stale", 31, true)];

        let changed = sweep(&mut log, Utc::now(), Duration::days(30), &filter);

        assert_eq!(changed, vec![log[1].id]);
        assert!(log[0].active);
        assert!(!log[1].active);
    }

    #[test]
    fn retroactive_moderation_deactivates() {
        let filter = WordListFilter::default();
        let mut log = vec![msg("this slipped through as spam", 1, true)];

        sweep(&mut log, Utc::now(), Duration::days(30), &filter);
        assert!(!log[0].active);
    }

    #[test]
    fn sweep_is_idempotent() {
        let filter = WordListFilter::default();
        let mut log = vec![
            msg("fresh", 1, true),
            msg("stale", 40, true),
            msg("spam here", 2, true),
        ];

        sweep(&mut log, Utc::now(), Duration::days(30), &filter);
        let after_once: Vec<bool> = log.iter().map(|m| m.active).collect();

        let changed = sweep(&mut log, Utc::now(), Duration::days(30), &filter);
        let after_twice: Vec<bool> = log.iter().map(|m| m.active).collect();

        assert!(changed.is_empty());
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn inactive_never_reactivates() {
        let filter = WordListFilter::default();
        let mut log = vec![msg("fine content, already dead", 1, false)];

        sweep(&mut log, Utc::now(), Duration::days(30), &filter);
        assert!(!log[0].active);
    }

    #[test]
    fn welcome_is_exempt() {
        let filter = WordListFilter::new(["welcome".to_string()]);
        let mut welcome = Message::welcome();
        welcome.timestamp = Utc::now() - Duration::days(365);
        let mut log = vec![welcome];

        let changed = sweep(&mut log, Utc::now(), Duration::days(30), &filter);
        assert!(changed.is_empty());
        assert!(log[0].active);
    }
}

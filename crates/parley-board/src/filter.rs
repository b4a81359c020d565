/// Moderation predicate. The concrete vulgar-word list is a deployment
/// concern; anything implementing this trait can stand in for it.
pub trait ContentFilter: Send + Sync {
    fn is_profane(&self, text: &str) -> bool;
}

/// Case-insensitive substring match over a banned-word list.
pub struct WordListFilter {
    words: Vec<String>,
}

const DEFAULT_BANNED: &[&str] = &["spam", "hate", "jerk"];

impl WordListFilter {
    pub fn new(words: impl IntoIterator<Item = String>) -> Self {
        Self {
            words: words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

impl Default for WordListFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED.iter().map(|w| w.to_string()))
    }
}

impl ContentFilter for WordListFilter {
    fn is_profane(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.words.iter().any(|w| lower.contains(w.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banned_word_is_flagged() {
        let filter = WordListFilter::default();
        assert!(filter.is_profane("this is pure spam"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let filter = WordListFilter::default();
        assert!(filter.is_profane("You JERK!"));
    }

    #[test]
    fn clean_text_passes() {
        let filter = WordListFilter::default();
        assert!(!filter.is_profane("looking for volunteers on Saturday"));
    }

    #[test]
    fn custom_list_replaces_default() {
        let filter = WordListFilter::new(["Bogus".to_string()]);
        assert!(filter.is_profane("totally bogus offer"));
        assert!(!filter.is_profane("this is pure spam"));
    }
}

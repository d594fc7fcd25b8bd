//! Non-blocking user notifications.
//!
//! The widget never blocks on a modal: failures and mutation confirmations
//! land in a bounded feed that the shell renders as a banner stack. The feed
//! is UI-agnostic — it knows nothing about Dioxus or the DOM.

use chrono::{DateTime, Utc};

/// Oldest entries are dropped once the feed is full.
pub const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoticeFeed {
    entries: Vec<Notice>,
}

impl NoticeFeed {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.push_at(level, message, Utc::now());
    }

    pub fn push_at(&mut self, level: NoticeLevel, message: impl Into<String>, at: DateTime<Utc>) {
        self.entries.push(Notice {
            level,
            message: message.into(),
            at,
        });
        if self.entries.len() > MAX_NOTICES {
            let overflow = self.entries.len() - MAX_NOTICES;
            self.entries.drain(..overflow);
        }
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_keep_arrival_order() {
        let mut feed = NoticeFeed::default();
        feed.push(NoticeLevel::Error, "first");
        feed.push(NoticeLevel::Info, "second");

        let messages: Vec<&str> = feed.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn feed_is_bounded_dropping_the_oldest() {
        let mut feed = NoticeFeed::default();
        for i in 0..MAX_NOTICES + 2 {
            feed.push(NoticeLevel::Info, format!("n{i}"));
        }

        assert_eq!(feed.len(), MAX_NOTICES);
        let first = feed.iter().next().unwrap();
        assert_eq!(first.message, "n2");
    }

    #[test]
    fn dismiss_out_of_range_is_a_no_op() {
        let mut feed = NoticeFeed::default();
        feed.push(NoticeLevel::Info, "only");

        feed.dismiss(5);
        assert_eq!(feed.len(), 1);

        feed.dismiss(0);
        assert!(feed.is_empty());
    }
}

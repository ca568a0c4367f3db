//! Bounded snapshot history with an undo/redo cursor

use std::collections::VecDeque;

use crate::model::PortfolioConfiguration;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Snapshot history.
///
/// Always holds at least one entry; `cursor` points at the working copy.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: VecDeque<PortfolioConfiguration>,
    cursor: usize,
    limit: usize,
}

impl EditHistory {
    pub fn new(initial: PortfolioConfiguration, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn current(&self) -> &PortfolioConfiguration {
        &self.entries[self.cursor]
    }

    /// Record a new snapshot, discarding any redo branch
    pub fn push(&mut self, config: PortfolioConfiguration) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(config);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> bool {
        if self.can_undo() {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.can_redo() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Drop all entries and start over from `config`
    pub fn reset(&mut self, config: PortfolioConfiguration) {
        self.entries.clear();
        self.entries.push_back(config);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(title: &str) -> PortfolioConfiguration {
        let mut config = PortfolioConfiguration::default();
        config.seo.title = title.to_string();
        config
    }

    #[test]
    fn test_undo_redo_cursor() {
        let mut history = EditHistory::new(config("v0"), 10);
        history.push(config("v1"));
        history.push(config("v2"));

        assert!(history.undo());
        assert_eq!(history.current().seo.title, "v1");
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.current().seo.title, "v0");

        assert!(history.redo());
        assert!(history.redo());
        assert!(!history.redo());
        assert_eq!(history.current().seo.title, "v2");
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut history = EditHistory::new(config("v0"), 10);
        history.push(config("v1"));
        history.push(config("v2"));
        history.undo();
        history.push(config("v3"));

        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        history.undo();
        assert_eq!(history.current().seo.title, "v1");
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let mut history = EditHistory::new(config("v0"), 3);
        for i in 1..=5 {
            history.push(config(&format!("v{}", i)));
        }

        assert_eq!(history.len(), 3);
        while history.undo() {}
        assert_eq!(history.current().seo.title, "v3");
    }

    #[test]
    fn test_limit_is_at_least_one() {
        let mut history = EditHistory::new(config("v0"), 0);
        history.push(config("v1"));
        assert_eq!(history.limit(), 1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.current().seo.title, "v1");
    }
}

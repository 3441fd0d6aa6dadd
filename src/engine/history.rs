//! Recent results strip.

use std::collections::VecDeque;

/// Entries kept before the oldest is evicted.
pub const RECENT_RESULTS_CAPACITY: usize = 8;

/// Display tags of past winners, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentResultsLog {
    tags: VecDeque<String>,
}

impl RecentResultsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tag: &str) {
        self.tags.push_front(tag.to_string());
        self.tags.truncate(RECENT_RESULTS_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&str> {
        self.tags.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

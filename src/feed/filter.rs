use std::collections::BTreeSet;

use crate::index::ArticleRecord;

/// Selected topic tags. Empty means "no filter".
///
/// Matching is conjunctive: a record matches when it carries every selected
/// topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    topics: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    pub fn insert(&mut self, topic: impl Into<String>) -> bool {
        self.topics.insert(topic.into())
    }

    pub fn remove(&mut self, topic: &str) -> bool {
        self.topics.remove(topic)
    }

    /// Flip membership of `topic`; returns whether it is now selected.
    pub fn toggle(&mut self, topic: &str) -> bool {
        if self.topics.remove(topic) {
            false
        } else {
            self.topics.insert(topic.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }

    /// Selected topics in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    pub fn matches(&self, record: &ArticleRecord) -> bool {
        self.topics.iter().all(|topic| record.has_topic(topic))
    }

    /// Positions of the matching records, in index order.
    pub fn apply(&self, index: &[ArticleRecord]) -> Vec<usize> {
        index
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            topics: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sorted, de-duplicated union of every topic in the index.
///
/// This is the list the topic filter toggles are built from.
pub fn collect_topics(index: &[ArticleRecord]) -> Vec<String> {
    index
        .iter()
        .flat_map(|record| record.topics().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

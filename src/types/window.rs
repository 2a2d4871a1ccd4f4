//! Replay windows, pages and time bounds

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::event::ContentChangeEvent;

/// One page of a time-bounded window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowPage {
    pub events: Vec<ContentChangeEvent>,
    /// `None` once the end of the log (or of the window) is reached
    pub next_cursor: Option<String>,
}

impl WindowPage {
    /// Empty page with no continuation
    pub fn end() -> Self {
        Self::default()
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Earliest and latest recorded timestamps of a workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBounds {
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
}

impl TimeBounds {
    pub fn is_empty(&self) -> bool {
        self.start_timestamp.is_none()
    }
}

/// Immutable, ascending slice of a workspace's content edits
///
/// Cloning shares the underlying events. A window is never patched; a
/// later fetch produces a new window that replaces this one in full.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayWindow {
    workspace_id: String,
    end_timestamp: i64,
    events: Arc<[ContentChangeEvent]>,
}

impl ReplayWindow {
    /// Build a window; events are re-sorted by `(timestamp, sequence)`
    pub fn new(workspace_id: impl Into<String>, end_timestamp: i64, mut events: Vec<ContentChangeEvent>) -> Self {
        events.sort_by_key(|e| (e.timestamp, e.sequence));
        Self {
            workspace_id: workspace_id.into(),
            end_timestamp,
            events: events.into(),
        }
    }

    pub fn empty(workspace_id: impl Into<String>, end_timestamp: i64) -> Self {
        Self::new(workspace_id, end_timestamp, Vec::new())
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    pub fn events(&self) -> &[ContentChangeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ContentChangeEvent> {
        self.events.get(index)
    }

    /// Distinct file paths, in order of first appearance
    pub fn file_paths(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut paths = Vec::new();
        for change in self.events.iter().flat_map(|e| e.changes()) {
            if seen.insert(change.file_path.as_str()) {
                paths.push(change.file_path.clone());
            }
        }
        paths
    }

    /// Number of events with `timestamp <= at`
    pub fn count_at_or_before(&self, at: i64) -> usize {
        self.events.partition_point(|e| e.timestamp <= at)
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.events.last().map(|e| e.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentChange, Position};

    fn event(ts: i64, seq: u64, file: &str) -> ContentChangeEvent {
        ContentChangeEvent::new("ws", ts, vec![ContentChange::insert(file, Position::new(0, 0), "x")])
            .with_sequence(seq)
    }

    #[test]
    fn test_window_sorts_by_timestamp_then_sequence() {
        let window = ReplayWindow::new("ws", 100, vec![event(30, 0, "a"), event(10, 2, "b"), event(10, 1, "c")]);

        let order: Vec<u64> = window.events().iter().map(|e| e.sequence).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert_eq!(window.first_timestamp(), Some(10));
        assert_eq!(window.last_timestamp(), Some(30));
    }

    #[test]
    fn test_file_paths_first_seen_order() {
        let window = ReplayWindow::new("ws", 100, vec![event(1, 0, "b.rs"), event(2, 1, "a.rs"), event(3, 2, "b.rs")]);
        assert_eq!(window.file_paths(), vec!["b.rs".to_string(), "a.rs".to_string()]);
    }

    #[test]
    fn test_count_at_or_before() {
        let window = ReplayWindow::new("ws", 100, vec![event(10, 0, "a"), event(20, 1, "a"), event(20, 2, "a")]);
        assert_eq!(window.count_at_or_before(5), 0);
        assert_eq!(window.count_at_or_before(10), 1);
        assert_eq!(window.count_at_or_before(20), 3);
    }

    #[test]
    fn test_page_wire_shape() {
        let page = WindowPage {
            events: vec![],
            next_cursor: Some("10:3".to_string()),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["nextCursor"], "10:3");
        assert!(!page.is_last());
        assert!(WindowPage::end().is_last());
    }
}

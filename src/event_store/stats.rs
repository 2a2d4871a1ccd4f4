//! Event Store Statistics
//!
//! Provides statistics about the event store including:
//! - Record counts by event type
//! - Per-workspace counts and recorded time bounds
//! - Log size on disk

use std::collections::{BTreeMap, HashMap};
use std::fs;

use serde::Serialize;

use crate::error::TimelineResult;
use crate::types::{ChangeEvent, EventType};
use crate::validation::Classification;

use super::store::EventStore;

/// Counts for one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStats {
    pub total_records: usize,
    pub content_edits: usize,
    pub lifecycle_events: usize,
    /// Stored but excluded from replay
    pub non_conforming: usize,
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
}

/// Statistics about the Event Store
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStoreStats {
    /// Records held in the index
    pub total_records: usize,
    /// Conforming records by type
    pub events_by_type: HashMap<EventType, usize>,
    pub non_conforming: usize,
    /// Size of events.jsonl in bytes; 0 for in-memory stores
    pub log_size: u64,
    /// Human-readable `log_size`
    pub log_size_display: String,
    pub next_sequence: u64,
    pub workspaces: BTreeMap<String, WorkspaceStats>,
}

impl EventStoreStats {
    pub fn workspace_count(&self) -> usize {
        self.workspaces.len()
    }

    /// Format size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

impl EventStore {
    /// Collect statistics from the in-memory index and the log file
    pub fn stats(&self) -> TimelineResult<EventStoreStats> {
        let mut stats = EventStoreStats {
            next_sequence: self.next_sequence(),
            ..Default::default()
        };

        if let Some(path) = self.config().events_path() {
            if path.exists() {
                stats.log_size = fs::metadata(&path)?.len();
            }
        }
        stats.log_size_display = EventStoreStats::format_size(stats.log_size);

        let index = self.index.read();
        for (workspace_id, log) in index.iter() {
            let mut workspace = WorkspaceStats {
                total_records: log.records.len(),
                start_timestamp: log.records.keys().next().map(|k| k.timestamp),
                end_timestamp: log.records.keys().next_back().map(|k| k.timestamp),
                ..Default::default()
            };

            for record in log.records.values() {
                match &record.classification {
                    Classification::Conforming(event) => {
                        match event {
                            ChangeEvent::ContentEdit(_) => workspace.content_edits += 1,
                            ChangeEvent::Lifecycle(_) => workspace.lifecycle_events += 1,
                        }
                        *stats.events_by_type.entry(event.event_type()).or_insert(0) += 1;
                    }
                    Classification::NonConforming(_) => workspace.non_conforming += 1,
                }
            }

            stats.total_records += workspace.total_records;
            stats.non_conforming += workspace.non_conforming;
            stats.workspaces.insert(workspace_id.clone(), workspace);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::EventStoreConfig;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_collect_stats() {
        let temp_dir = TempDir::new().unwrap();
        let store = EventStore::open(EventStoreConfig::new(temp_dir.path().join("data"))).unwrap();

        store
            .append_batch(vec![
                json!({
                    "workspaceId": "ws",
                    "timestamp": 10,
                    "eventType": "content_change",
                    "metadata": {"contentChanges": []}
                }),
                json!({"workspaceId": "ws", "timestamp": 5, "eventType": "file_open"}),
                json!({"workspaceId": "ws", "timestamp": 20, "eventType": "content_change"}),
                json!({"workspaceId": "other", "timestamp": 1, "eventType": "terminal_activity"}),
            ])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.non_conforming, 1);
        assert_eq!(stats.next_sequence, 4);
        assert_eq!(stats.workspace_count(), 2);
        assert!(stats.log_size > 0);

        assert_eq!(stats.events_by_type.get(&EventType::ContentChange), Some(&1));
        assert_eq!(stats.events_by_type.get(&EventType::FileOpen), Some(&1));
        assert_eq!(stats.events_by_type.get(&EventType::TerminalActivity), Some(&1));

        let ws = &stats.workspaces["ws"];
        assert_eq!(ws.content_edits, 1);
        assert_eq!(ws.lifecycle_events, 1);
        assert_eq!(ws.non_conforming, 1);
        assert_eq!(ws.start_timestamp, Some(5));
        assert_eq!(ws.end_timestamp, Some(20));
    }

    #[test]
    fn test_in_memory_stats_have_no_log_size() {
        let stats = EventStore::in_memory().stats().unwrap();
        assert_eq!(stats.log_size, 0);
        assert_eq!(stats.log_size_display, "0 B");
        assert_eq!(stats.workspace_count(), 0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(EventStoreStats::format_size(500), "500 B");
        assert_eq!(EventStoreStats::format_size(1024), "1.00 KB");
        assert_eq!(EventStoreStats::format_size(1536), "1.50 KB");
        assert_eq!(EventStoreStats::format_size(1048576), "1.00 MB");
        assert_eq!(EventStoreStats::format_size(1073741824), "1.00 GB");
    }
}

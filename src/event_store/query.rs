//! Read side of the event store
//!
//! All queries take the index read lock only. Unknown workspaces yield empty
//! results rather than errors.

use std::collections::HashMap;
use std::ops::Bound;

use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::error::TimelineResult;
use crate::types::{ChangeEvent, ReplayWindow, TimeBounds, WindowPage};

use super::cursor::{decode_cursor, encode_cursor};
use super::store::{EventKey, EventStore};

impl EventStore {
    /// One page of a workspace's content edits with `timestamp <= end_timestamp`
    ///
    /// Pages ascend by `(timestamp, sequence)`. Lifecycle and non-conforming
    /// records are skipped. `next_cursor` is set only while more content
    /// edits remain inside the window.
    pub fn list_by_time_window(
        &self,
        workspace_id: &str,
        end_timestamp: i64,
        cursor: Option<&str>,
    ) -> TimelineResult<WindowPage> {
        let after = cursor.map(decode_cursor).transpose()?;
        let upper = EventKey::upper(end_timestamp);
        let page_size = self.config().page_size;

        let index = self.index.read();
        let Some(log) = index.get(workspace_id) else {
            return Ok(WindowPage::end());
        };

        // a cursor from a wider window can sit past this one's end
        if after.is_some_and(|key| key >= upper) {
            return Ok(WindowPage::end());
        }
        let lower = after.map_or(Bound::Unbounded, Bound::Excluded);

        let mut records = log.records.range((lower, Bound::Included(upper)));
        let mut events = Vec::new();
        let mut last_key = None;

        for (key, record) in records.by_ref() {
            if let Some(ChangeEvent::ContentEdit(event)) = record.classification.event() {
                events.push(event.clone());
                last_key = Some(*key);
                if events.len() == page_size {
                    break;
                }
            }
        }

        let more = events.len() == page_size
            && records.any(|(_, record)| record.classification.is_content_edit());
        let next_cursor = last_key.filter(|_| more).map(encode_cursor);

        debug!(
            workspace = workspace_id,
            end_timestamp,
            returned = events.len(),
            more = next_cursor.is_some(),
            "window page"
        );
        Ok(WindowPage {
            events,
            next_cursor,
        })
    }

    /// Earliest and latest recorded timestamps at or before `as_of`
    pub fn get_bounds(&self, workspace_id: &str, as_of: i64) -> TimeBounds {
        let index = self.index.read();
        let Some(log) = index.get(workspace_id) else {
            return TimeBounds::default();
        };

        let mut keys = log.records.range(..=EventKey::upper(as_of)).map(|(key, _)| key);
        let first = keys.next().map(|key| key.timestamp);
        let last = keys.next_back().map(|key| key.timestamp).or(first);

        TimeBounds {
            start_timestamp: first,
            end_timestamp: last,
        }
    }

    /// Walk every page of a window and freeze it
    pub fn fetch_full_window(
        &self,
        workspace_id: &str,
        end_timestamp: i64,
    ) -> TimelineResult<ReplayWindow> {
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.list_by_time_window(workspace_id, end_timestamp, cursor.as_deref())?;
            events.extend(page.events);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(ReplayWindow::new(workspace_id, end_timestamp, events))
    }

    /// Every stored record, raw, grouped per workspace and sorted per group
    pub fn list_all_grouped_by_workspace(&self) -> HashMap<String, Vec<Value>> {
        let mut groups: HashMap<String, Vec<(EventKey, Value)>> = HashMap::new();
        {
            let index = self.index.read();
            for (workspace_id, log) in index.iter() {
                let group = groups.entry(workspace_id.clone()).or_default();
                group.extend(log.records.iter().map(|(key, record)| (*key, record.raw.clone())));
            }
        }

        groups
            .par_iter_mut()
            .for_each(|(_, group)| group.sort_unstable_by_key(|(key, _)| *key));

        groups
            .into_iter()
            .map(|(workspace_id, group)| {
                (workspace_id, group.into_iter().map(|(_, raw)| raw).collect())
            })
            .collect()
    }

    /// Known workspace ids, sorted
    pub fn list_workspaces(&self) -> Vec<String> {
        let mut workspaces: Vec<String> = self.index.read().keys().cloned().collect();
        workspaces.sort();
        workspaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;
    use crate::event_store::EventStoreConfig;
    use serde_json::json;

    fn edit(workspace: &str, ts: i64, text: &str) -> Value {
        json!({
            "workspaceId": workspace,
            "timestamp": ts,
            "eventType": "content_change",
            "metadata": {"contentChanges": [{
                "filePath": "a.txt",
                "range": {"start": {"line": 0, "column": 0}, "end": {"line": 0, "column": 0}},
                "text": text
            }]}
        })
    }

    fn lifecycle(workspace: &str, ts: i64) -> Value {
        json!({"workspaceId": workspace, "timestamp": ts, "eventType": "file_open", "metadata": {}})
    }

    fn store_with_page_size(page_size: usize) -> EventStore {
        EventStore::open(EventStoreConfig::in_memory().with_page_size(page_size)).unwrap()
    }

    fn texts(page: &WindowPage) -> Vec<String> {
        page.events.iter().map(|e| e.changes()[0].text.clone()).collect()
    }

    #[test]
    fn test_window_sorted_by_timestamp_not_arrival() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![edit("ws", 30, "c"), edit("ws", 10, "a"), edit("ws", 20, "b")])
            .unwrap();

        let page = store.list_by_time_window("ws", 100, None).unwrap();
        assert_eq!(texts(&page), vec!["a", "b", "c"]);
        assert!(page.is_last());
    }

    #[test]
    fn test_window_respects_end_and_partition() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![
                edit("ws", 10, "a"),
                edit("other", 15, "x"),
                edit("ws", 20, "b"),
                edit("ws", 21, "late"),
            ])
            .unwrap();

        let page = store.list_by_time_window("ws", 20, None).unwrap();
        assert_eq!(texts(&page), vec!["a", "b"]);
    }

    #[test]
    fn test_window_filters_lifecycle_and_malformed() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![
                edit("ws", 1, "a"),
                lifecycle("ws", 2),
                json!({"workspaceId": "ws", "timestamp": 3, "eventType": "content_change", "metadata": {}}),
                edit("ws", 4, "b"),
            ])
            .unwrap();

        let page = store.list_by_time_window("ws", 10, None).unwrap();
        assert_eq!(texts(&page), vec!["a", "b"]);
    }

    #[test]
    fn test_timestamp_ties_keep_arrival_order() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![edit("ws", 5, "first"), edit("ws", 5, "second")])
            .unwrap();

        let page = store.list_by_time_window("ws", 5, None).unwrap();
        assert_eq!(texts(&page), vec!["first", "second"]);
    }

    #[test]
    fn test_cursor_pagination_resumes() {
        let store = store_with_page_size(2);
        let records = (0..5).map(|i| edit("ws", i * 10, &i.to_string())).collect();
        store.append_batch(records).unwrap();

        let first = store.list_by_time_window("ws", 100, None).unwrap();
        assert_eq!(texts(&first), vec!["0", "1"]);
        let cursor = first.next_cursor.clone().unwrap();

        let second = store.list_by_time_window("ws", 100, Some(&cursor)).unwrap();
        assert_eq!(texts(&second), vec!["2", "3"]);

        let third = store
            .list_by_time_window("ws", 100, second.next_cursor.as_deref())
            .unwrap();
        assert_eq!(texts(&third), vec!["4"]);
        assert!(third.is_last());
    }

    #[test]
    fn test_exact_page_boundary_has_no_cursor() {
        let store = store_with_page_size(2);
        store
            .append_batch(vec![edit("ws", 1, "a"), edit("ws", 2, "b"), lifecycle("ws", 3)])
            .unwrap();

        let page = store.list_by_time_window("ws", 10, None).unwrap();
        assert_eq!(page.events.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_cursor_past_window_end() {
        let store = store_with_page_size(1);
        store.append_batch(vec![edit("ws", 10, "a"), edit("ws", 50, "b")]).unwrap();

        let page = store.list_by_time_window("ws", 100, None).unwrap();
        let cursor = page.next_cursor.unwrap();
        assert!(store.list_by_time_window("ws", 5, Some(&cursor)).unwrap().events.is_empty());
    }

    #[test]
    fn test_unknown_workspace_and_bad_cursor() {
        let store = EventStore::in_memory();
        let page = store.list_by_time_window("missing", 100, None).unwrap();
        assert!(page.events.is_empty());
        assert!(page.is_last());

        assert!(matches!(
            store.list_by_time_window("missing", 100, Some("garbage")),
            Err(TimelineError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_get_bounds() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![lifecycle("ws", 5), edit("ws", 10, "a"), edit("ws", 40, "b")])
            .unwrap();

        let bounds = store.get_bounds("ws", 100);
        assert_eq!(bounds.start_timestamp, Some(5));
        assert_eq!(bounds.end_timestamp, Some(40));

        let bounds = store.get_bounds("ws", 7);
        assert_eq!(bounds.start_timestamp, Some(5));
        assert_eq!(bounds.end_timestamp, Some(5));

        assert!(store.get_bounds("ws", 1).is_empty());
        assert!(store.get_bounds("missing", 100).is_empty());
    }

    #[test]
    fn test_fetch_full_window_walks_pages() {
        let store = store_with_page_size(3);
        let records = (0..10).rev().map(|i| edit("ws", i, &i.to_string())).collect();
        store.append_batch(records).unwrap();

        let window = store.fetch_full_window("ws", 7).unwrap();
        assert_eq!(window.len(), 8);
        assert_eq!(window.first_timestamp(), Some(0));
        assert_eq!(window.last_timestamp(), Some(7));
    }

    #[test]
    fn test_grouped_by_workspace() {
        let store = EventStore::in_memory();
        store
            .append_batch(vec![
                edit("b", 20, "y"),
                lifecycle("a", 3),
                edit("a", 1, "x"),
                edit("b", 10, "z"),
            ])
            .unwrap();

        let groups = store.list_all_grouped_by_workspace();
        assert_eq!(groups.len(), 2);

        let stamps = |ws: &str| -> Vec<i64> {
            groups[ws].iter().map(|r| r["timestamp"].as_i64().unwrap()).collect()
        };
        assert_eq!(stamps("a"), vec![1, 3]);
        assert_eq!(stamps("b"), vec![10, 20]);
        assert_eq!(store.list_workspaces(), vec!["a", "b"]);
    }
}

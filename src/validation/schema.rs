//! Schema checks for raw editor records
//!
//! Two levels of strictness:
//! - the envelope (`workspaceId`, `timestamp`) must hold for a record to be
//!   stored at all, since it is the partition and sort key;
//! - the content-edit shape only decides whether replay sees the record.
//!   A record failing it is kept in the log but classified non-conforming.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{
    ChangeEvent, ChangeMetadata, ContentChange, ContentChangeEvent, EventType, LifecycleEvent,
};

/// Partition and sort key of a raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub workspace_id: String,
    pub timestamp: i64,
}

/// Outcome of checking one stored record
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Conforming(ChangeEvent),
    NonConforming(String),
}

impl Classification {
    pub fn event(&self) -> Option<&ChangeEvent> {
        match self {
            Classification::Conforming(event) => Some(event),
            Classification::NonConforming(_) => None,
        }
    }

    pub fn is_content_edit(&self) -> bool {
        matches!(self, Classification::Conforming(ChangeEvent::ContentEdit(_)))
    }
}

/// Check that a record can be partitioned and ordered
pub fn validate_envelope(record: &Value) -> Result<Envelope, String> {
    let object = record
        .as_object()
        .ok_or_else(|| "record is not a JSON object".to_string())?;

    let workspace_id = object
        .get("workspaceId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| "missing or empty 'workspaceId'".to_string())?;

    let timestamp = object
        .get("timestamp")
        .and_then(Value::as_i64)
        .ok_or_else(|| "missing or non-integer 'timestamp'".to_string())?;

    Ok(Envelope {
        workspace_id: workspace_id.to_string(),
        timestamp,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContentMetadata {
    content_changes: Vec<ContentChange>,
}

/// Classify a record; never fails, so one bad record cannot abort a replay
pub fn classify(record: &Value, sequence: u64) -> Classification {
    let envelope = match validate_envelope(record) {
        Ok(envelope) => envelope,
        Err(reason) => return Classification::NonConforming(reason),
    };

    let Some(tag) = record.get("eventType").and_then(Value::as_str) else {
        return Classification::NonConforming("missing 'eventType'".to_string());
    };

    let event_type = EventType::from_tag(tag);
    let metadata = record.get("metadata").cloned().unwrap_or(Value::Null);

    if !event_type.is_content_edit() {
        return Classification::Conforming(ChangeEvent::Lifecycle(LifecycleEvent {
            workspace_id: envelope.workspace_id,
            timestamp: envelope.timestamp,
            sequence,
            event_type,
            metadata,
        }));
    }

    let wire: WireContentMetadata = match serde_json::from_value(metadata) {
        Ok(wire) => wire,
        Err(e) => return Classification::NonConforming(format!("malformed contentChanges: {}", e)),
    };

    if let Some(index) = wire
        .content_changes
        .iter()
        .position(|c| c.range.start > c.range.end)
    {
        return Classification::NonConforming(format!(
            "contentChanges[{}] has start after end",
            index
        ));
    }

    Classification::Conforming(ChangeEvent::ContentEdit(ContentChangeEvent {
        workspace_id: envelope.workspace_id,
        timestamp: envelope.timestamp,
        sequence,
        metadata: ChangeMetadata {
            content_changes: wire.content_changes,
        },
    }))
}

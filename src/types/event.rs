//! Event types for the editing log
//!
//! Every record in the log shares one envelope (`workspaceId`, `timestamp`,
//! `eventType`, `metadata`). Only content edits carry text mutations; the
//! lifecycle events are recorded for completeness and skipped by replay.

use serde::{Deserialize, Serialize};

use super::change::ContentChange;

/// Event types emitted by the editor integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Text inserted, deleted or replaced in one or more files
    ContentChange,
    /// A file was opened in the editor
    FileOpen,
    /// A file was closed
    FileClose,
    /// A file was created
    FileCreate,
    /// A file was deleted
    FileDelete,
    /// A file was renamed
    FileRename,
    /// The cursor or selection moved
    SelectionChange,
    /// Terminal input or output
    TerminalActivity,
    /// Any tag this build does not know about
    #[serde(other)]
    Unknown,
}

impl EventType {
    /// Parse a wire tag; unrecognised tags map to `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "content_change" => EventType::ContentChange,
            "file_open" => EventType::FileOpen,
            "file_close" => EventType::FileClose,
            "file_create" => EventType::FileCreate,
            "file_delete" => EventType::FileDelete,
            "file_rename" => EventType::FileRename,
            "selection_change" => EventType::SelectionChange,
            "terminal_activity" => EventType::TerminalActivity,
            _ => EventType::Unknown,
        }
    }

    /// Only content edits participate in text replay
    pub fn is_content_edit(&self) -> bool {
        matches!(self, EventType::ContentChange)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::ContentChange => write!(f, "content_change"),
            EventType::FileOpen => write!(f, "file_open"),
            EventType::FileClose => write!(f, "file_close"),
            EventType::FileCreate => write!(f, "file_create"),
            EventType::FileDelete => write!(f, "file_delete"),
            EventType::FileRename => write!(f, "file_rename"),
            EventType::SelectionChange => write!(f, "selection_change"),
            EventType::TerminalActivity => write!(f, "terminal_activity"),
            EventType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Payload of a content-edit event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMetadata {
    /// Applied strictly in order, each against the buffer left by the previous one
    #[serde(default)]
    pub content_changes: Vec<ContentChange>,
}

/// A validated content-edit event, as handed to the replay engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChangeEvent {
    pub workspace_id: String,

    /// Milliseconds; the sort key of the log
    pub timestamp: i64,

    /// Ingest order, used to break timestamp ties
    #[serde(default)]
    pub sequence: u64,

    pub metadata: ChangeMetadata,
}

impl ContentChangeEvent {
    pub fn new(workspace_id: impl Into<String>, timestamp: i64, changes: Vec<ContentChange>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            timestamp,
            sequence: 0,
            metadata: ChangeMetadata {
                content_changes: changes,
            },
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn changes(&self) -> &[ContentChange] {
        &self.metadata.content_changes
    }

    /// Changes that target `file_path`, in list order
    pub fn changes_for<'a>(&'a self, file_path: &'a str) -> impl Iterator<Item = &'a ContentChange> + 'a {
        self.metadata
            .content_changes
            .iter()
            .filter(move |c| c.file_path == file_path)
    }

    /// File targeted by the last change of this event
    pub fn last_file(&self) -> Option<&str> {
        self.metadata
            .content_changes
            .last()
            .map(|c| c.file_path.as_str())
    }
}

/// Any non-content event (open, close, rename, selection, terminal, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub workspace_id: String,
    pub timestamp: i64,
    #[serde(default)]
    pub sequence: u64,
    pub event_type: EventType,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A recorded event, keyed on its `eventType`
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    ContentEdit(ContentChangeEvent),
    Lifecycle(LifecycleEvent),
}

impl ChangeEvent {
    pub fn workspace_id(&self) -> &str {
        match self {
            ChangeEvent::ContentEdit(e) => &e.workspace_id,
            ChangeEvent::Lifecycle(e) => &e.workspace_id,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            ChangeEvent::ContentEdit(e) => e.timestamp,
            ChangeEvent::Lifecycle(e) => e.timestamp,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            ChangeEvent::ContentEdit(_) => EventType::ContentChange,
            ChangeEvent::Lifecycle(e) => e.event_type,
        }
    }

    pub fn as_content_edit(&self) -> Option<&ContentChangeEvent> {
        match self {
            ChangeEvent::ContentEdit(e) => Some(e),
            ChangeEvent::Lifecycle(_) => None,
        }
    }
}

//! Replay engine - folds a window prefix into per-file buffers
//!
//! There is no snapshot to start from: every reconstruction begins with an
//! empty `[""]` buffer and applies the first `k` events of the window in
//! order. The engine holds no state beyond its arguments, so the same
//! prefix always produces the same lines.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::buffer::{apply_change, empty_buffer, range_fits};
use crate::types::{ChangeEvent, ContentChange, ContentChangeEvent, ReplayWindow, TextBuffer};

/// First event whose range did not fit the buffer it was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionGap {
    /// Index of the event within the window
    pub at_event: usize,
    pub timestamp: i64,
}

/// Outcome of a checked reconstruction
///
/// Lines are reconstructed in both cases; a gap only means that some
/// change addressed lines or columns the buffer did not have, so part of
/// the text was substituted with empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconstruction {
    Complete {
        lines: TextBuffer,
    },
    #[serde(rename_all = "camelCase")]
    GapDetected {
        at_event: usize,
        timestamp: i64,
        lines: TextBuffer,
    },
}

impl Reconstruction {
    pub fn lines(&self) -> &TextBuffer {
        match self {
            Reconstruction::Complete { lines } => lines,
            Reconstruction::GapDetected { lines, .. } => lines,
        }
    }

    pub fn into_lines(self) -> TextBuffer {
        match self {
            Reconstruction::Complete { lines } => lines,
            Reconstruction::GapDetected { lines, .. } => lines,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Reconstruction::Complete { .. })
    }

    pub fn gap(&self) -> Option<ReconstructionGap> {
        match self {
            Reconstruction::Complete { .. } => None,
            Reconstruction::GapDetected {
                at_event,
                timestamp,
                ..
            } => Some(ReconstructionGap {
                at_event: *at_event,
                timestamp: *timestamp,
            }),
        }
    }
}

/// Apply a change, reporting whether its range fit the buffer beforehand
fn apply_tracked(lines: &mut TextBuffer, change: &ContentChange) -> bool {
    let fits = range_fits(lines, change.range);
    apply_change(lines, change);
    fits
}

/// Lines of `file_path` after the first `k` events (defensive mode)
pub fn compute_buffer(window: &ReplayWindow, file_path: &str, k: usize) -> TextBuffer {
    compute_buffer_checked(window, file_path, k).into_lines()
}

/// Lines of `file_path` after the first `k` events, flagging the first gap
///
/// `k` larger than the window is clamped to its length.
pub fn compute_buffer_checked(window: &ReplayWindow, file_path: &str, k: usize) -> Reconstruction {
    let k = k.min(window.len());
    let mut lines = empty_buffer();
    let mut gap: Option<ReconstructionGap> = None;

    for (index, event) in window.events()[..k].iter().enumerate() {
        for change in event.changes_for(file_path) {
            if !apply_tracked(&mut lines, change) && gap.is_none() {
                gap = Some(ReconstructionGap {
                    at_event: index,
                    timestamp: event.timestamp,
                });
            }
        }
    }

    match gap {
        None => Reconstruction::Complete { lines },
        Some(gap) => {
            debug!(
                workspace = window.workspace_id(),
                file = file_path,
                at_event = gap.at_event,
                "reconstruction gap"
            );
            Reconstruction::GapDetected {
                at_event: gap.at_event,
                timestamp: gap.timestamp,
                lines,
            }
        }
    }
}

/// Every file's buffer after a replayed prefix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayState {
    buffers: HashMap<String, TextBuffer>,
    gaps: HashMap<String, ReconstructionGap>,
    files: Vec<String>,
    last_touched: Option<String>,
    applied: usize,
}

impl ReplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event; non-content events are skipped
    pub fn apply_event(&mut self, index: usize, event: &ChangeEvent) {
        match event {
            ChangeEvent::ContentEdit(edit) => self.apply_content_event(index, edit),
            ChangeEvent::Lifecycle(_) => {}
        }
    }

    /// Fold one content-edit event, change by change
    pub fn apply_content_event(&mut self, index: usize, event: &ContentChangeEvent) {
        for change in event.changes() {
            if !self.buffers.contains_key(&change.file_path) {
                self.files.push(change.file_path.clone());
            }
            let lines = self
                .buffers
                .entry(change.file_path.clone())
                .or_insert_with(empty_buffer);

            if !apply_tracked(lines, change) {
                self.gaps
                    .entry(change.file_path.clone())
                    .or_insert(ReconstructionGap {
                        at_event: index,
                        timestamp: event.timestamp,
                    });
            }
        }

        if let Some(file) = event.last_file() {
            self.last_touched = Some(file.to_string());
        }
        self.applied += 1;
    }

    pub fn buffer(&self, file_path: &str) -> Option<&TextBuffer> {
        self.buffers.get(file_path)
    }

    /// Lines of `file_path`; a file not touched yet is an empty buffer
    pub fn materialize(&self, file_path: &str) -> TextBuffer {
        self.buffers
            .get(file_path)
            .cloned()
            .unwrap_or_else(empty_buffer)
    }

    pub fn gap(&self, file_path: &str) -> Option<ReconstructionGap> {
        self.gaps.get(file_path).copied()
    }

    /// Files touched so far, in order of first change
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// File targeted by the last change of the most recent event
    pub fn last_touched(&self) -> Option<&str> {
        self.last_touched.as_deref()
    }

    /// Number of events folded
    pub fn applied(&self) -> usize {
        self.applied
    }
}

/// Replay the first `k` events of `window` into every file's buffer
pub fn replay(window: &ReplayWindow, k: usize) -> ReplayState {
    let mut state = ReplayState::new();
    for (index, event) in window.events().iter().take(k).enumerate() {
        state.apply_content_event(index, event);
    }
    state
}

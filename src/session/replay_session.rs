//! A mounted scrub session over one workspace
//!
//! Couples the current window, the scrub controller and the file selection.
//! Every mutation is one synchronous step; callers serialize access.

use serde::Serialize;

use crate::buffer::empty_buffer;
use crate::error::{TimelineError, TimelineResult};
use crate::replay::{compute_buffer_checked, FileSelection, ReconstructionGap};
use crate::scrub::{Markers, ScrubConfig, ScrubController, ScrubState};
use crate::types::{ReplayWindow, TextBuffer};

/// Proof that a window fetch was started at a given generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub workspace_id: String,
    pub end_timestamp: i64,
}

/// Scrub state plus the reconstructed buffer at that position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub session_id: String,
    pub workspace_id: String,
    pub end_timestamp: i64,
    pub state: ScrubState,
    /// Events replayed for this position
    pub k: usize,
    pub total_events: usize,
    /// True until the first window for the current generation arrives
    pub loading: bool,
    pub files: Vec<String>,
    pub selected_file: Option<String>,
    pub lines: TextBuffer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<ReconstructionGap>,
}

#[derive(Debug)]
pub struct ReplaySession {
    id: String,
    workspace_id: String,
    end_timestamp: i64,
    window: Option<ReplayWindow>,
    scrub: ScrubController,
    selection: FileSelection,
    marker_timestamps: Vec<i64>,
    generation: u64,
    closed: bool,
}

impl ReplaySession {
    pub fn new(
        id: impl Into<String>,
        workspace_id: impl Into<String>,
        end_timestamp: i64,
        config: ScrubConfig,
    ) -> Self {
        Self {
            id: id.into(),
            workspace_id: workspace_id.into(),
            end_timestamp,
            window: None,
            scrub: ScrubController::new(Markers::none(), config),
            selection: FileSelection::default(),
            marker_timestamps: Vec::new(),
            generation: 0,
            closed: false,
        }
    }

    /// Pin markers at recorded timestamps; re-mapped whenever the window changes
    pub fn with_marker_timestamps(mut self, timestamps: Vec<i64>) -> Self {
        self.marker_timestamps = timestamps;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn window(&self) -> Option<&ReplayWindow> {
        self.window.as_ref()
    }

    pub fn scrub_state(&self) -> &ScrubState {
        self.scrub.state()
    }

    pub fn is_autoplaying(&self) -> bool {
        self.scrub.state().autoplay
    }

    fn ensure_open(&self) -> TimelineResult<()> {
        if self.closed {
            return Err(TimelineError::SessionClosed(self.id.clone()));
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            workspace_id: self.workspace_id.clone(),
            end_timestamp: self.end_timestamp,
        }
    }

    /// Start a fetch for the current workspace and end timestamp
    pub fn begin_fetch(&self) -> TimelineResult<FetchTicket> {
        self.ensure_open()?;
        Ok(self.ticket())
    }

    /// Install a fetched window if nothing invalidated the ticket meanwhile
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, window: ReplayWindow) -> TimelineResult<()> {
        self.ensure_open()?;
        if ticket.generation != self.generation {
            return Err(TimelineError::StaleFetch {
                ticket: ticket.generation,
                current: self.generation,
            });
        }

        self.scrub
            .set_markers(Markers::from_timestamps(&window, &self.marker_timestamps));
        self.selection.refresh(&window);
        self.window = Some(window);
        Ok(())
    }

    /// Move the window end; the current window is dropped until refetched
    pub fn set_end_timestamp(&mut self, end_timestamp: i64) -> TimelineResult<FetchTicket> {
        self.ensure_open()?;
        self.invalidate();
        self.end_timestamp = end_timestamp;
        self.window = None;
        Ok(self.ticket())
    }

    /// Switch the designated file
    ///
    /// Any in-flight fetch is discarded. When no window is loaded yet a new
    /// ticket is returned so the caller can fetch again.
    pub fn set_file(&mut self, file_path: &str) -> TimelineResult<Option<FetchTicket>> {
        self.ensure_open()?;
        self.invalidate();
        self.selection.select(file_path);
        Ok(self.window.is_none().then(|| self.ticket()))
    }

    /// Unmount; pending fetches and autoplay become no-ops
    pub fn close(&mut self) {
        if !self.closed {
            self.invalidate();
            self.scrub.set_autoplay(false);
            self.closed = true;
        }
    }

    fn follow(&mut self) {
        if let Some(window) = &self.window {
            let k = self.scrub.replay_count(window.len());
            self.selection.follow(window, k, true);
        }
    }

    pub fn drag_start(&mut self, value: f64) -> TimelineResult<Frame> {
        self.ensure_open()?;
        self.scrub.on_drag_start(value);
        self.follow();
        Ok(self.frame())
    }

    pub fn drag_move(&mut self, value: f64) -> TimelineResult<Frame> {
        self.ensure_open()?;
        self.scrub.on_drag_move(value);
        self.follow();
        Ok(self.frame())
    }

    pub fn drag_end(&mut self, value: f64) -> TimelineResult<Frame> {
        self.ensure_open()?;
        self.scrub.on_drag_end(value);
        self.follow();
        Ok(self.frame())
    }

    pub fn set_autoplay(&mut self, enabled: bool) -> TimelineResult<Frame> {
        self.ensure_open()?;
        self.scrub.set_autoplay(enabled);
        Ok(self.frame())
    }

    /// Idle jump; never switches the selected file
    pub fn seek(&mut self, value: f64) -> TimelineResult<Frame> {
        self.ensure_open()?;
        self.scrub.seek(value);
        Ok(self.frame())
    }

    /// One autoplay step
    pub fn tick(&mut self) -> TimelineResult<Frame> {
        self.ensure_open()?;
        if self.scrub.state().autoplay {
            self.scrub.tick();
            self.follow();
        }
        Ok(self.frame())
    }

    /// Reconstruct the selected file at the current position
    pub fn frame(&self) -> Frame {
        let total_events = self.window.as_ref().map_or(0, ReplayWindow::len);
        let k = self.scrub.replay_count(total_events);

        let (lines, gap) = match (&self.window, self.selection.selected()) {
            (Some(window), Some(file)) => {
                let reconstruction = compute_buffer_checked(window, file, k);
                let gap = reconstruction.gap();
                (reconstruction.into_lines(), gap)
            }
            _ => (empty_buffer(), None),
        };

        Frame {
            session_id: self.id.clone(),
            workspace_id: self.workspace_id.clone(),
            end_timestamp: self.end_timestamp,
            state: self.scrub.state().clone(),
            k,
            total_events,
            loading: self.window.is_none(),
            files: self.selection.files().to_vec(),
            selected_file: self.selection.selected().map(str::to_string),
            lines,
            gap,
        }
    }
}

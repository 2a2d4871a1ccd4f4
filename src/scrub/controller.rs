//! Scrub controller - drag, release-snap and autoplay transitions
//!
//! The controller owns a `ScrubState` and exposes one method per external
//! event (pointer or timer). Each method is a single synchronous step that
//! returns the updated state; the caller decides how to serialize calls.

use serde::{Deserialize, Serialize};

use super::markers::{clamp_position, Markers};

/// Distance within which a drag engages a marker
pub const STICK_THRESHOLD: f64 = 0.5;

/// Distance a drag must exceed to leave an engaged marker
pub const STICK_HYSTERESIS: f64 = 1.0;

/// Distance within which a release snaps onto a marker
pub const SNAP_RELEASE_THRESHOLD: f64 = 1.5;

/// Position advanced per autoplay tick
pub const AUTOPLAY_STEP: f64 = 0.5;

/// Ephemeral scrub UI state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrubState {
    /// Normalized position, 0–100
    pub value: f64,
    pub dragging: bool,
    /// Marker the drag is currently pinned to
    pub stuck_marker: Option<f64>,
    pub autoplay: bool,
}

/// Snap and autoplay tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubConfig {
    pub stick_threshold: f64,
    pub stick_hysteresis: f64,
    pub snap_release_threshold: f64,
    pub autoplay_step: f64,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            stick_threshold: STICK_THRESHOLD,
            stick_hysteresis: STICK_HYSTERESIS,
            snap_release_threshold: SNAP_RELEASE_THRESHOLD,
            autoplay_step: AUTOPLAY_STEP,
        }
    }
}

impl ScrubConfig {
    pub fn with_autoplay_step(mut self, step: f64) -> Self {
        self.autoplay_step = step;
        self
    }
}

/// Number of events to replay for a scrub position
pub fn replay_count(value: f64, total_events: usize) -> usize {
    let k = (clamp_position(value) / 100.0 * total_events as f64).round() as usize;
    k.min(total_events)
}

#[derive(Debug, Clone, Default)]
pub struct ScrubController {
    state: ScrubState,
    markers: Markers,
    config: ScrubConfig,
}

impl ScrubController {
    pub fn new(markers: Markers, config: ScrubConfig) -> Self {
        Self {
            state: ScrubState::default(),
            markers,
            config,
        }
    }

    pub fn state(&self) -> &ScrubState {
        &self.state
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn set_markers(&mut self, markers: Markers) {
        self.markers = markers;
        self.state.stuck_marker = None;
    }

    /// True while the user drags or autoplay runs
    pub fn is_active(&self) -> bool {
        self.state.dragging || self.state.autoplay
    }

    pub fn replay_count(&self, total_events: usize) -> usize {
        replay_count(self.state.value, total_events)
    }

    pub fn on_drag_start(&mut self, value: f64) -> &ScrubState {
        self.state.autoplay = false;
        self.state.dragging = true;
        self.state.stuck_marker = None;
        self.state.value = clamp_position(value);
        &self.state
    }

    pub fn on_drag_move(&mut self, value: f64) -> &ScrubState {
        let value = clamp_position(value);

        match self.state.stuck_marker {
            Some(marker) if (value - marker).abs() <= self.config.stick_hysteresis => {
                self.state.value = marker;
            }
            Some(_) => {
                self.state.stuck_marker = None;
                self.state.value = value;
            }
            None => match self.markers.within(value, self.config.stick_threshold) {
                Some(marker) => {
                    self.state.stuck_marker = Some(marker);
                    self.state.value = marker;
                }
                None => self.state.value = value,
            },
        }
        &self.state
    }

    pub fn on_drag_end(&mut self, value: f64) -> &ScrubState {
        let value = clamp_position(value);
        self.state.value = self
            .markers
            .within(value, self.config.snap_release_threshold)
            .unwrap_or(value);
        self.state.dragging = false;
        self.state.stuck_marker = None;
        &self.state
    }

    /// Turn autoplay on or off
    ///
    /// Enabling is refused while dragging. Enabling at the end restarts
    /// playback from the beginning.
    pub fn set_autoplay(&mut self, enabled: bool) -> &ScrubState {
        if !enabled {
            self.state.autoplay = false;
        } else if !self.state.dragging {
            if self.state.value >= 100.0 {
                self.state.value = 0.0;
            }
            self.state.autoplay = true;
        }
        &self.state
    }

    /// Advance one autoplay step; a no-op while autoplay is off
    pub fn tick(&mut self) -> &ScrubState {
        if self.state.autoplay {
            self.state.value = (self.state.value + self.config.autoplay_step).min(100.0);
            if self.state.value >= 100.0 {
                self.state.autoplay = false;
            }
        }
        &self.state
    }

    /// Jump to a position without drag semantics (e.g. keyboard or API seek)
    pub fn seek(&mut self, value: f64) -> &ScrubState {
        self.state.value = clamp_position(value);
        self.state.stuck_marker = None;
        &self.state
    }
}

//! Scrub Controller
//!
//! Maps a continuous 0–100 position to a replay count and implements the
//! drag/release/autoplay state machine:
//!
//! ```text
//!   drag_start ──► dragging ──drag_move──► (stick within threshold,
//!        ▲             │                    hold within hysteresis)
//!        │             └──drag_end──► idle (snap within release threshold)
//!        │                              │
//!        └────────── cancels ◄── autoplay (tick += step, stop at 100)
//! ```

mod controller;
mod markers;

pub use controller::{
    replay_count, ScrubConfig, ScrubController, ScrubState, AUTOPLAY_STEP, SNAP_RELEASE_THRESHOLD,
    STICK_HYSTERESIS, STICK_THRESHOLD,
};
pub use markers::{clamp_position, Markers};

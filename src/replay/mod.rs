//! Replay Engine
//!
//! Reconstructs file contents at any point of a replay window:
//! - `compute_buffer`: one file after the first `k` events
//! - `compute_buffer_checked`: same, reporting reconstruction gaps
//! - `replay`: every file's buffer plus the most recently touched file
//! - `FileSelection`: which file the viewer shows during playback

mod engine;
mod selection;

pub use engine::{
    compute_buffer, compute_buffer_checked, replay, Reconstruction, ReconstructionGap, ReplayState,
};
pub use selection::FileSelection;

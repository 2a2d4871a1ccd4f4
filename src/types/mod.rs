//! Data types for the editing timeline
//!
//! This module contains the event model shared by the store, the replay
//! engine and the HTTP layer.

mod change;
mod event;
mod window;

pub use change::{ContentChange, Position, TextRange};
pub use event::{
    ChangeEvent, ChangeMetadata, ContentChangeEvent, EventType, LifecycleEvent,
};
pub use window::{ReplayWindow, TimeBounds, WindowPage};

/// Lines of one reconstructed file
pub type TextBuffer = Vec<String>;

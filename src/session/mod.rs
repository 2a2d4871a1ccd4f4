//! Replay sessions
//!
//! A session is one mounted scrubber: a window fetched from the store, the
//! scrub controller over it and the selected file. Transitions run under the
//! session's mutex, so drag handlers and autoplay ticks never interleave.
//! Window fetches carry a generation ticket; a fetch that completes after the
//! file, the window end or the session itself changed is dropped.

mod autoplay;
mod manager;
mod replay_session;

pub use manager::{SessionConfig, SessionManager, SessionSlot, AUTOPLAY_PERIOD};
pub use replay_session::{FetchTicket, Frame, ReplaySession};

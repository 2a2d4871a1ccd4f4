//! Edit Timeline
//!
//! Records every text edit made in a coding workspace as an append-only
//! event log and reconstructs any file exactly as it was at any moment by
//! replaying that log from the start of a time window.
//!
//! # Features
//!
//! - **Append-only log**: JSONL persistence, per-workspace ordering by timestamp
//! - **Windowed queries**: cursor pagination bounded by an end timestamp
//! - **Deterministic replay**: same event prefix, byte-identical buffers
//! - **Gap detection**: reports the first edit that did not fit its buffer
//! - **Scrubbing**: drag, magnetic markers and autoplay over a 0–100 scale
//! - **HTTP/SSE**: REST endpoints plus a live frame stream per session
//!
//! # Modules
//!
//! - `types`: Event model (ChangeEvent, ContentChange, ReplayWindow)
//! - `validation`: Envelope checks and content-edit classification
//! - `event_store`: Append-only log, windowed queries, statistics
//! - `buffer`: In-place text insertion and deletion
//! - `replay`: Buffer reconstruction and active-file selection
//! - `scrub`: Scrub position state machine
//! - `session`: Mounted scrub sessions with stale-fetch guard and autoplay
//! - `api`: Axum router, REST handlers and SSE
//! - `config`: Environment configuration
//! - `utils`: Utility functions (timestamps)
//!
//! # Example
//!
//! ```no_run
//! use edit_timeline::{compute_buffer, EventStore, EventStoreConfig};
//!
//! let store = EventStore::open(EventStoreConfig::new("data")).unwrap();
//! let window = store.fetch_full_window("ws-1", 1_700_000_000_000).unwrap();
//! for path in window.file_paths() {
//!     let lines = compute_buffer(&window, &path, window.len());
//!     println!("{}: {} lines", path, lines.len());
//! }
//! ```

pub mod api;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event_store;
pub mod replay;
pub mod scrub;
pub mod session;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used items at crate root
pub use config::ServerConfig;
pub use error::{TimelineError, TimelineResult};
pub use event_store::{EventStore, EventStoreConfig, IngestReport};
pub use replay::{compute_buffer, compute_buffer_checked, replay, Reconstruction};
pub use scrub::{ScrubController, ScrubState};
pub use session::{Frame, SessionManager};
pub use types::{
    ChangeEvent, ContentChange, ContentChangeEvent, EventType, Position, ReplayWindow, TextBuffer,
    TextRange, TimeBounds, WindowPage,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

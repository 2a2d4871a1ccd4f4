//! Event Store Module
//!
//! Append-only editing log with per-workspace ordered retrieval:
//! - `EventStore`: ingest, JSONL persistence and the in-memory index
//! - windowed queries with cursor pagination and time bounds
//! - `EventStoreStats`: counts for operator tooling
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐
//! │ Editor  │───►│ envelope    │───►│ append to   │───►│ index by         │
//! │ batch   │    │ check       │    │ events.jsonl│    │ (ts, sequence)   │
//! └─────────┘    └─────────────┘    └─────────────┘    └──────────────────┘
//!
//! Read Path:
//! ┌───────────────┐    ┌─────────────────┐    ┌──────────────┐
//! │ workspace     │───►│ range ≤ end,    │───►│ page + next  │
//! │ partition     │    │ content edits   │    │ cursor       │
//! └───────────────┘    └─────────────────┘    └──────────────┘
//! ```

mod cursor;
mod query;
mod stats;
mod store;

pub use stats::{EventStoreStats, WorkspaceStats};
pub use store::{
    EventStore, EventStoreConfig, IngestReport, RejectedRecord, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

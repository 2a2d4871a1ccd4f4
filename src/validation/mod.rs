//! Schema validation for recorded editor events
//!
//! Malformed records are classified, never thrown into the replay pipeline.

mod schema;

pub use schema::{classify, validate_envelope, Classification, Envelope};

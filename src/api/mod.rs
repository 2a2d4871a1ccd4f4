//! API module for HTTP and SSE endpoints
//!
//! This module exposes the event log, stateless reconstruction and scrub
//! sessions over REST, with session frames streamed over SSE.

pub mod http;
pub mod rest;
pub mod sse;
pub mod state;

pub use http::create_router;
pub use state::AppState;

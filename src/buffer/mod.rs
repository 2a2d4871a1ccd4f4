//! Text buffer mutation
//!
//! Pure, in-place operations on a line-oriented buffer. These are the unit
//! the replay engine composes; a replacement is a delete followed by an
//! insert at the collapsed position.

mod mutator;

pub use mutator::{apply_change, delete_text, end_of_insertion, insert_text, range_fits};

use crate::types::TextBuffer;

/// Buffer a file starts from before its first recorded change
pub fn empty_buffer() -> TextBuffer {
    vec![String::new()]
}

//! Positional text mutations recorded by the editor integration

use serde::{Deserialize, Serialize};

/// A 0-indexed `{line, column}` location in a file
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open `[start, end)` span, expressed against the buffer before the change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Collapsed range at a single position
    pub fn caret(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// True when start == end (the change is a pure insertion)
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when both ends lie on the same line
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

/// One text mutation within a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChange {
    /// Key of the buffer this mutation applies to
    pub file_path: String,
    pub range: TextRange,
    /// Replacement text; empty for a pure deletion
    pub text: String,
}

impl ContentChange {
    /// Pure insertion of `text` at `position`
    pub fn insert(file_path: impl Into<String>, position: Position, text: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            range: TextRange::caret(position),
            text: text.into(),
        }
    }

    /// Pure deletion of `range`
    pub fn delete(file_path: impl Into<String>, range: TextRange) -> Self {
        Self {
            file_path: file_path.into(),
            range,
            text: String::new(),
        }
    }

    /// Delete `range`, then insert `text` at its start
    pub fn replace(file_path: impl Into<String>, range: TextRange, text: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            range,
            text: text.into(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        !self.range.is_empty() && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_line_major() {
        assert!(Position::new(0, 10) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_content_change_wire_shape() {
        let change = ContentChange::insert("src/main.rs", Position::new(3, 4), "x");
        let json = serde_json::to_value(&change).unwrap();

        assert_eq!(json["filePath"], "src/main.rs");
        assert_eq!(json["range"]["start"]["line"], 3);
        assert_eq!(json["range"]["end"]["column"], 4);
        assert_eq!(json["text"], "x");
    }

    #[test]
    fn test_change_kinds() {
        let range = TextRange::new(Position::new(0, 0), Position::new(0, 2));
        assert!(ContentChange::insert("a", Position::new(0, 0), "hi").is_insertion());
        assert!(ContentChange::delete("a", range).is_deletion());

        let replace = ContentChange::replace("a", range, "yo");
        assert!(!replace.is_insertion());
        assert!(!replace.is_deletion());
    }
}

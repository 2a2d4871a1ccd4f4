//! In-place insert/delete on a line buffer
//!
//! Columns are character offsets. Out-of-range lines read as empty and
//! out-of-range columns clamp to the end of the line, so a replay never
//! panics on a range that does not fit the buffer; `range_fits` reports
//! those cases separately.

use crate::types::{ContentChange, Position, TextRange};

/// Byte offset of the `column`-th character, clamped to the line end
fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len())
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Make sure `lines[index]` exists, padding with empty lines
fn ensure_line(lines: &mut Vec<String>, index: usize) {
    if lines.len() <= index {
        lines.resize(index + 1, String::new());
    }
}

/// Split merged text into lines; `\r\n` counts as a single break
fn split_lines(text: &str) -> Vec<String> {
    let mut parts: Vec<String> = text.split('\n').map(str::to_string).collect();
    let last = parts.len() - 1;
    for part in &mut parts[..last] {
        if part.ends_with('\r') {
            part.pop();
        }
    }
    parts
}

/// Splice `text` into the line at `position`, splitting on embedded newlines
pub fn insert_text(lines: &mut Vec<String>, position: Position, text: &str) {
    ensure_line(lines, position.line);

    let line = &lines[position.line];
    let split_at = byte_offset(line, position.column);

    let mut merged = String::with_capacity(line.len() + text.len());
    merged.push_str(&line[..split_at]);
    merged.push_str(text);
    merged.push_str(&line[split_at..]);

    if merged.contains('\n') {
        lines.splice(position.line..=position.line, split_lines(&merged));
    } else {
        lines[position.line] = merged;
    }
}

/// Remove the `[start, end)` span, merging the boundary lines
pub fn delete_text(lines: &mut Vec<String>, range: TextRange) {
    let (start, end) = if range.end < range.start {
        (range.end, range.start)
    } else {
        (range.start, range.end)
    };

    ensure_line(lines, start.line);

    if start.line == end.line {
        let line = &mut lines[start.line];
        let from = byte_offset(line, start.column);
        let to = byte_offset(line, end.column);
        if from < to {
            line.replace_range(from..to, "");
        }
        return;
    }

    let suffix = match lines.get(end.line) {
        Some(end_line) => end_line[byte_offset(end_line, end.column)..].to_string(),
        None => String::new(),
    };

    let keep = byte_offset(&lines[start.line], start.column);
    let start_line = &mut lines[start.line];
    start_line.truncate(keep);
    start_line.push_str(&suffix);

    let last_removed = end.line.min(lines.len() - 1);
    if last_removed > start.line {
        lines.drain(start.line + 1..=last_removed);
    }
}

/// Apply one change: delete its range (if any), then insert its text at the start
pub fn apply_change(lines: &mut Vec<String>, change: &ContentChange) {
    if !change.range.is_empty() {
        delete_text(lines, change.range);
    }
    if !change.text.is_empty() {
        insert_text(lines, change.range.start, &change.text);
    }
}

/// Whether `range` addresses existing lines and columns of `lines`
pub fn range_fits(lines: &[String], range: TextRange) -> bool {
    let fits = |p: Position| {
        lines
            .get(p.line)
            .map(|line| p.column <= char_len(line))
            .unwrap_or(false)
    };
    fits(range.start) && fits(range.end)
}

/// Position just past `text` once inserted at `position`
pub fn end_of_insertion(position: Position, text: &str) -> Position {
    let parts = split_lines(text);
    let newlines = parts.len() - 1;
    let tail = char_len(&parts[newlines]);

    if newlines == 0 {
        Position::new(position.line, position.column + tail)
    } else {
        Position::new(position.line + newlines, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn range(sl: usize, sc: usize, el: usize, ec: usize) -> TextRange {
        TextRange::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_insert_at_line_start() {
        let mut buf = lines(&["world"]);
        insert_text(&mut buf, Position::new(0, 0), "hello ");
        assert_eq!(buf, lines(&["hello world"]));
    }

    #[test]
    fn test_insert_multiline_text() {
        let mut buf = lines(&["start", "end"]);
        insert_text(&mut buf, Position::new(0, 5), "\nline1\nline2");
        assert_eq!(buf, lines(&["start", "line1", "line2", "end"]));
    }

    #[test]
    fn test_insert_line_with_trailing_indent() {
        // A whole-line reading would leave "  return true;" untouched, but the
        // splice keeps the suffix after column 0, so the trailing "  " lands in
        // front of it and the line becomes "    return true;".
        // test_insert_whole_line covers the form that leaves it untouched.
        let mut buf = lines(&["function test() {", "  return true;", "}"]);
        insert_text(&mut buf, Position::new(1, 0), "    console.log('test');\n  ");
        assert_eq!(
            buf,
            lines(&["function test() {", "    console.log('test');", "    return true;", "}"])
        );
    }

    #[test]
    fn test_insert_whole_line() {
        let mut buf = lines(&["function test() {", "  return true;", "}"]);
        insert_text(&mut buf, Position::new(1, 0), "    console.log('test');\n");
        assert_eq!(
            buf,
            lines(&["function test() {", "    console.log('test');", "  return true;", "}"])
        );
    }

    #[test]
    fn test_delete_whole_lines() {
        let mut buf = lines(&["line1", "line2", "line3", "line4", "line5"]);
        delete_text(&mut buf, range(1, 0, 4, 0));
        assert_eq!(buf, lines(&["line1", "line5"]));
    }

    #[test]
    fn test_delete_across_partial_lines() {
        let mut buf = lines(&[
            "function example() {",
            "  const x = 1;",
            "  const y = 2;",
            "  return x + y;",
            "}",
        ]);
        delete_text(&mut buf, range(1, 8, 3, 13));
        assert_eq!(buf, lines(&["function example() {", "  const y;", "}"]));
    }

    #[test]
    fn test_delete_within_line() {
        let mut buf = lines(&["let value = 10;"]);
        delete_text(&mut buf, range(0, 4, 0, 10));
        assert_eq!(buf, lines(&["let = 10;"]));
    }

    #[test]
    fn test_delete_newline_joins_lines() {
        let mut buf = lines(&["ab", "cd"]);
        delete_text(&mut buf, range(0, 2, 1, 0));
        assert_eq!(buf, lines(&["abcd"]));
    }

    #[test]
    fn test_replace_via_apply_change() {
        let mut buf = lines(&["const x = 1;"]);
        apply_change(&mut buf, &ContentChange::replace("f", range(0, 6, 0, 7), "total"));
        assert_eq!(buf, lines(&["const total = 1;"]));

        apply_change(&mut buf, &ContentChange::replace("f", range(0, 0, 0, 16), "a\nb"));
        assert_eq!(buf, lines(&["a", "b"]));
    }

    #[test]
    fn test_insert_then_delete_round_trip() {
        let cases: Vec<(Vec<String>, Position, &str)> = vec![
            (lines(&["hello world"]), Position::new(0, 5), ","),
            (lines(&["a", "b", "c"]), Position::new(1, 1), "\nxx\nyy"),
            (lines(&["fn main() {", "}"]), Position::new(0, 11), "\n    println!();"),
            (lines(&[""]), Position::new(0, 0), "one\ntwo\n"),
            (lines(&["héllo"]), Position::new(0, 2), "ü\nß"),
        ];

        for (original, at, text) in cases {
            let mut buf = original.clone();
            insert_text(&mut buf, at, text);
            delete_text(&mut buf, TextRange::new(at, end_of_insertion(at, text)));
            assert_eq!(buf, original, "round trip failed for {:?}", text);
        }
    }

    #[test]
    fn test_multibyte_columns_are_characters() {
        let mut buf = lines(&["añb"]);
        insert_text(&mut buf, Position::new(0, 2), "X");
        assert_eq!(buf, lines(&["añXb"]));

        delete_text(&mut buf, range(0, 1, 0, 3));
        assert_eq!(buf, lines(&["ab"]));
    }

    #[test]
    fn test_crlf_inserts_split_cleanly() {
        let mut buf = lines(&["ab"]);
        insert_text(&mut buf, Position::new(0, 1), "1\r\n2");
        assert_eq!(buf, lines(&["a1", "2b"]));
        assert_eq!(end_of_insertion(Position::new(0, 1), "1\r\n2"), Position::new(1, 1));
    }

    #[test]
    fn test_out_of_range_defaults_to_empty_lines() {
        let mut buf: Vec<String> = Vec::new();
        insert_text(&mut buf, Position::new(2, 4), "x");
        assert_eq!(buf, lines(&["", "", "x"]));

        let mut buf = lines(&["abc"]);
        insert_text(&mut buf, Position::new(0, 99), "d");
        assert_eq!(buf, lines(&["abcd"]));

        let mut buf = lines(&["abc", "def"]);
        delete_text(&mut buf, range(0, 1, 7, 0));
        assert_eq!(buf, lines(&["a"]));
    }

    #[test]
    fn test_range_fits() {
        let buf = lines(&["abc", ""]);
        assert!(range_fits(&buf, range(0, 0, 0, 3)));
        assert!(range_fits(&buf, range(0, 3, 1, 0)));
        assert!(!range_fits(&buf, range(0, 4, 0, 4)));
        assert!(!range_fits(&buf, range(1, 0, 2, 0)));
    }
}

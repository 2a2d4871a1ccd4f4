//! Which file the viewer is looking at
//!
//! Defaults to the first file edited in the window. While the user drags or
//! autoplay runs, the selection follows the file touched by the most recent
//! replayed event; a static position never switches it.

use serde::Serialize;

use crate::types::ReplayWindow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSelection {
    files: Vec<String>,
    selected: Option<String>,
}

impl FileSelection {
    pub fn from_window(window: &ReplayWindow) -> Self {
        let files = window.file_paths();
        let selected = files.first().cloned();
        Self { files, selected }
    }

    /// Adopt a replacement window, keeping the selection if it still exists
    pub fn refresh(&mut self, window: &ReplayWindow) {
        let files = window.file_paths();
        let keep = self
            .selected
            .as_ref()
            .filter(|s| files.contains(s))
            .cloned();
        self.selected = keep.or_else(|| files.first().cloned());
        self.files = files;
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Explicit user choice; returns true when the selection changed
    pub fn select(&mut self, file_path: &str) -> bool {
        if self.selected.as_deref() == Some(file_path) {
            return false;
        }
        self.selected = Some(file_path.to_string());
        true
    }

    /// Follow the file edited by event `k - 1` when `following`
    ///
    /// Returns true when the selection switched.
    pub fn follow(&mut self, window: &ReplayWindow, k: usize, following: bool) -> bool {
        if !following || k == 0 {
            return false;
        }
        let Some(latest) = window.get(k.min(window.len()).saturating_sub(1)) else {
            return false;
        };
        match latest.last_file() {
            Some(file) if self.selected.as_deref() != Some(file) => {
                self.selected = Some(file.to_string());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentChange, ContentChangeEvent, Position};

    fn window() -> ReplayWindow {
        let ev = |ts: i64, files: &[&str]| {
            ContentChangeEvent::new(
                "ws",
                ts,
                files
                    .iter()
                    .map(|f| ContentChange::insert(*f, Position::new(0, 0), "x"))
                    .collect(),
            )
        };
        ReplayWindow::new(
            "ws",
            100,
            vec![ev(1, &["main.py"]), ev(2, &["main.py", "util.py"]), ev(3, &[]), ev(4, &["main.py"])],
        )
    }

    #[test]
    fn test_defaults_to_first_file() {
        let selection = FileSelection::from_window(&window());
        assert_eq!(selection.selected(), Some("main.py"));
        assert_eq!(selection.files(), &["main.py".to_string(), "util.py".to_string()]);

        let empty = FileSelection::from_window(&ReplayWindow::empty("ws", 0));
        assert_eq!(empty.selected(), None);
    }

    #[test]
    fn test_follows_last_change_while_scrubbing() {
        let window = window();
        let mut selection = FileSelection::from_window(&window);

        assert!(selection.follow(&window, 2, true));
        assert_eq!(selection.selected(), Some("util.py"));

        // event 3 has no changes: stay put
        assert!(!selection.follow(&window, 3, true));
        assert_eq!(selection.selected(), Some("util.py"));

        assert!(selection.follow(&window, 4, true));
        assert_eq!(selection.selected(), Some("main.py"));
    }

    #[test]
    fn test_does_not_follow_when_idle() {
        let window = window();
        let mut selection = FileSelection::from_window(&window);

        assert!(!selection.follow(&window, 2, false));
        assert_eq!(selection.selected(), Some("main.py"));
        assert!(!selection.follow(&window, 0, true));
    }

    #[test]
    fn test_refresh_keeps_existing_selection() {
        let window = window();
        let mut selection = FileSelection::from_window(&window);
        selection.select("util.py");

        selection.refresh(&window);
        assert_eq!(selection.selected(), Some("util.py"));

        selection.refresh(&ReplayWindow::empty("ws", 0));
        assert_eq!(selection.selected(), None);
        assert!(selection.files().is_empty());
    }
}

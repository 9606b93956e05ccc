//! Application model: the rows on screen, the search text and the bits of
//! UI state the runtime and renderer share.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::library::{AudioMetadata, DisplayKind, SoundRecord};

/// The main application model.
pub struct App {
    pub records: Vec<SoundRecord>,
    pub selected: usize,
    pub search_text: String,
    /// Query of the search currently running, if any.
    pub searching: Option<String>,
    /// One-line message for the status box.
    pub status: Option<String>,
    pub metadata_window: bool,
    /// Filename whose metadata is being fetched for the popup.
    pub metadata_pending: Option<String>,
    pub show_library: bool,

    library: Vec<SoundRecord>,
    typed_at: Option<Instant>,
}

impl App {
    /// Create a new `App` showing the search prompt and the given library clips.
    pub fn new(library: Vec<SoundRecord>, show_library: bool) -> Self {
        let mut app = Self {
            records: Vec::new(),
            selected: 0,
            search_text: String::new(),
            searching: None,
            status: None,
            metadata_window: false,
            metadata_pending: None,
            show_library,
            library,
            typed_at: None,
        };
        app.reset_list();
        app
    }

    /// The prompt row, then downloaded clips under a section header.
    fn reset_list(&mut self) {
        let mut records = vec![SoundRecord::search_prompt()];
        if self.show_library && !self.library.is_empty() {
            records.push(SoundRecord::section_header("Downloaded"));
            records.extend(self.library.iter().cloned());
        }
        self.records = records;
        self.selected = 0;
    }

    /// True while the list shows the prompt (as opposed to search results).
    pub fn showing_prompt(&self) -> bool {
        self.records
            .first()
            .is_some_and(|r| r.kind == DisplayKind::SearchPrompt)
    }

    /// Replace the cached library listing; refreshes the list if it is showing the prompt.
    pub fn set_library(&mut self, library: Vec<SoundRecord>) {
        self.library = library;
        if self.showing_prompt() {
            let keep = self.selected_record().map(|r| r.filename.clone());
            self.reset_list();
            if let Some(filename) = keep.filter(|f| !f.is_empty()) {
                if let Some(idx) = self.records.iter().position(|r| r.filename == filename) {
                    self.selected = idx;
                }
            }
        }
    }

    pub fn on_search_text_changed(&mut self, text: String, now: Instant) {
        self.search_text = text;
        self.reset_list();
        self.typed_at = if self.search_text.trim().is_empty() {
            None
        } else {
            Some(now)
        };
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut text = self.search_text.clone();
        text.push(c);
        self.on_search_text_changed(text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = self.search_text.clone();
        text.pop();
        self.on_search_text_changed(text, now);
    }

    /// Query to search for once typing has paused for `debounce`. Zero disables auto search.
    pub fn due_search(&mut self, now: Instant, debounce: Duration) -> Option<String> {
        if debounce.is_zero() {
            return None;
        }
        let typed_at = self.typed_at?;
        if now.saturating_duration_since(typed_at) < debounce {
            return None;
        }
        self.typed_at = None;
        Some(self.search_text.trim().to_string())
    }

    /// Mark `query` as in flight. Returns `None` when there is nothing to search for.
    pub fn begin_search(&mut self) -> Option<String> {
        let query = self.search_text.trim().to_string();
        self.typed_at = None;
        if query.is_empty() {
            return None;
        }
        self.searching = Some(query.clone());
        Some(query)
    }

    /// Apply a finished search. Results for a query the user has since changed are dropped.
    pub fn finish_search(&mut self, query: &str, result: Result<Vec<SoundRecord>>) -> bool {
        if self.searching.as_deref() == Some(query) {
            self.searching = None;
        }
        if self.search_text.trim() != query {
            log::debug!("dropping results for stale query {query:?}");
            return false;
        }

        match result {
            Ok(records) => {
                self.status = if records.is_empty() {
                    Some(format!("No sounds found for \"{query}\""))
                } else {
                    None
                };
                self.records = records;
                self.selected = 0;
            }
            Err(e) => {
                log::warn!("search {query:?} failed: {e}");
                self.status = Some(format!("Search failed: {e}"));
            }
        }
        true
    }

    pub fn selected_record(&self) -> Option<&SoundRecord> {
        self.records.get(self.selected)
    }

    /// Drop every row (and library entry) for `filename`.
    pub fn remove_record(&mut self, filename: &str) -> bool {
        let before = self.records.len();
        self.records
            .retain(|r| !(r.kind == DisplayKind::Entry && r.filename == filename));
        self.library.retain(|r| r.filename != filename);
        if self.showing_prompt() && self.library.is_empty() {
            // No clips left under the header.
            self.records.retain(|r| r.kind != DisplayKind::SectionHeader);
        }
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
        self.records.len() != before
    }

    /// Attach loaded metadata to every record of that clip.
    pub fn apply_metadata(&mut self, filename: &str, metadata: AudioMetadata) {
        if self.metadata_pending.as_deref() == Some(filename) {
            self.metadata_pending = None;
        }
        for r in self
            .records
            .iter_mut()
            .chain(self.library.iter_mut())
            .filter(|r| r.filename == filename)
        {
            r.metadata = Some(metadata.clone());
        }
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Index of the next selectable row after `current`, wrapping around.
    fn step(&self, current: usize, forward: bool) -> Option<usize> {
        let n = self.records.len();
        if n == 0 {
            return None;
        }
        let mut idx = current.min(n - 1);
        for _ in 0..n {
            idx = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
            if self.records[idx].kind != DisplayKind::SectionHeader {
                return Some(idx);
            }
        }
        None
    }

    /// Move selection to the next row.
    pub fn next(&mut self) {
        if let Some(next) = self.step(self.selected, true) {
            self.selected = next;
        }
    }

    /// Move selection to the previous row.
    pub fn prev(&mut self) {
        if let Some(prev) = self.step(self.selected, false) {
            self.selected = prev;
        }
    }
}

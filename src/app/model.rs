//! Application model: which list has focus, what is selected in each, and
//! the state of the one-line input prompt.
//!
//! Lists themselves are owned by the `Session`; `App` only stores indices into
//! them and is handed the list when it needs to move a selection.

use crate::config::FocusSetting;
use crate::playlist::PlayList;
use crate::session::ListKind;

/// What keystrokes currently go to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a path or url to play.
    OpenUrl,
    /// Typing a fuzzy filter over titles.
    Filter,
}

pub struct App {
    pub focus: ListKind,
    pub playlist_selected: usize,
    pub history_selected: usize,

    pub input_mode: InputMode,
    pub input: String,
    pub filter_query: String,

    pub header_text: String,
    /// One-shot message shown in the status line until the next key.
    pub notice: Option<String>,
}

impl App {
    pub fn new(start_in: FocusSetting, header_text: String) -> Self {
        let focus = match start_in {
            FocusSetting::Playlist => ListKind::Playlist,
            FocusSetting::History => ListKind::History,
        };
        Self {
            focus,
            playlist_selected: 0,
            history_selected: 0,
            input_mode: InputMode::Normal,
            input: String::new(),
            filter_query: String::new(),
            header_text,
            notice: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ListKind::Playlist => ListKind::History,
            ListKind::History => ListKind::Playlist,
        };
    }

    /// Selected index in the focused list.
    pub fn selected(&self) -> usize {
        self.selected_in(self.focus)
    }

    pub fn selected_in(&self, kind: ListKind) -> usize {
        match kind {
            ListKind::Playlist => self.playlist_selected,
            ListKind::History => self.history_selected,
        }
    }

    pub fn set_selected(&mut self, idx: usize) {
        match self.focus {
            ListKind::Playlist => self.playlist_selected = idx,
            ListKind::History => self.history_selected = idx,
        }
    }

    /// Indices of `list` that pass the current filter, in list order.
    pub fn visible_indices(&self, list: &PlayList) -> Vec<usize> {
        let query = self.filter_query.trim();
        list.iter()
            .enumerate()
            .filter(|(_, item)| Self::fuzzy_match_positions(item.title(), query).is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// Move the selection of the focused pane to the next visible entry,
    /// wrapping to the first.
    pub fn next(&mut self, list: &PlayList) {
        let display = self.visible_indices(list);
        if display.is_empty() {
            return;
        }
        let next = match display.iter().position(|&i| i == self.selected()) {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
        self.set_selected(next);
    }

    /// Move the selection of the focused pane to the previous visible entry,
    /// wrapping to the last.
    pub fn prev(&mut self, list: &PlayList) {
        let display = self.visible_indices(list);
        let Some(&last) = display.last() else {
            return;
        };
        let prev = match display.iter().position(|&i| i == self.selected()) {
            Some(0) | None => last,
            Some(p) => display[p - 1],
        };
        self.set_selected(prev);
    }

    pub fn select_first(&mut self, list: &PlayList) {
        if let Some(&first) = self.visible_indices(list).first() {
            self.set_selected(first);
        }
    }

    pub fn select_last(&mut self, list: &PlayList) {
        if let Some(&last) = self.visible_indices(list).last() {
            self.set_selected(last);
        }
    }

    /// Keep the selection of `kind` on an entry the filter shows.
    ///
    /// A hidden or out-of-range selection moves to the next visible entry,
    /// or to the last one when none follows.
    pub fn sync_selection(&mut self, kind: ListKind, list: &PlayList) {
        let display = self.visible_indices(list);
        let sel = match kind {
            ListKind::Playlist => &mut self.playlist_selected,
            ListKind::History => &mut self.history_selected,
        };
        if display.contains(sel) {
            return;
        }
        *sel = display
            .iter()
            .find(|&&i| i >= *sel)
            .or(display.last())
            .copied()
            .unwrap_or(0);
    }

    /// The focused pane's selection, if it points at a visible entry.
    pub fn selected_visible(&self, list: &PlayList) -> Option<usize> {
        let sel = self.selected();
        self.visible_indices(list).contains(&sel).then_some(sel)
    }

    pub fn open_url_prompt(&mut self) {
        self.input_mode = InputMode::OpenUrl;
        self.input.clear();
    }

    pub fn enter_filter_mode(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    pub fn push_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::OpenUrl => self.input.push(c),
            InputMode::Filter => self.filter_query.push(c),
        }
    }

    pub fn pop_char(&mut self) {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::OpenUrl => {
                self.input.pop();
            }
            InputMode::Filter => {
                self.filter_query.pop();
            }
        }
    }

    /// Leave the prompt. For the url prompt, returns what was typed when it
    /// is not blank.
    pub fn submit_input(&mut self) -> Option<String> {
        let mode = std::mem::take(&mut self.input_mode);
        match mode {
            InputMode::OpenUrl => {
                let url = std::mem::take(&mut self.input);
                let url = url.trim();
                (!url.is_empty()).then(|| url.to_string())
            }
            _ => None,
        }
    }

    /// Abandon the prompt; cancelling the filter also clears it.
    pub fn cancel_input(&mut self) {
        if self.input_mode == InputMode::Filter {
            self.filter_query.clear();
        }
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }
}

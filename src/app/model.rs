//! Application model types: `App`, the editor's on-screen state and dialogs.

use std::path::PathBuf;

use crate::config::LibrarySettings;
use crate::cover::{CoverArtCache, CoverError, CoverFound};
use crate::editor::{CoverPrompt, FormField, SaveReport, SortColumn, TrackInfoEditor};
use crate::library::{Track, TrackId, display_from_fields};

use super::picker::FilePicker;

/// Which half of the editor receives navigation keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Fields,
    Cues,
}

/// What the line editor is currently writing to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputTarget {
    Field(FormField),
    CueHotcue,
    CueLabel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub target: InputTarget,
    pub buffer: String,
}

/// Cursor and line-editor state of the editor modal.
#[derive(Clone, Debug, Default)]
pub struct EditorView {
    pub focus: Focus,
    pub field: usize,
    pub cue: usize,
    pub input: Option<Input>,
}

/// A modal on top of the browser or the editor.
#[derive(Clone, Debug)]
pub enum Dialog {
    Confirm(CoverPrompt),
    Warning { title: String, message: String },
    CoverPicker(FilePicker),
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,

    lower_titles: Option<Vec<String>>,

    pub filter_mode: bool,
    pub filter_query: String,
    pub current_dir: Option<String>,

    pub editor: TrackInfoEditor,
    pub view: EditorView,
    pub dialog: Option<Dialog>,
}

impl App {
    /// Create a new `App` over `tracks` with an idle `editor`.
    pub fn new(tracks: Vec<Track>, editor: TrackInfoEditor) -> Self {
        // Precompute lowercase labels for larger libraries so filtering does
        // not lowercase every title on each keystroke.
        let lower_titles = if tracks.len() > 100 {
            Some(
                tracks
                    .iter()
                    .map(|t| t.display.to_ascii_lowercase())
                    .collect(),
            )
        } else {
            None
        };

        Self {
            tracks,
            selected: 0,
            lower_titles,
            filter_mode: false,
            filter_query: String::new(),
            current_dir: None,
            editor,
            view: EditorView::default(),
            dialog: None,
        }
    }

    /// Record the scanned directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Return true if the library contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Return the display order of track indices after filtering.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.tracks.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base.collect();
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                let query_lower = query.to_ascii_lowercase();
                base.filter(|&i| {
                    Self::fuzzy_match_positions_lower(&lower_titles[i], &query_lower).is_some()
                })
                .collect()
            }
            None => base
                .filter(|&i| Self::fuzzy_match_positions(&self.tracks[i].display, query).is_some())
                .collect(),
        }
    }

    /// Return true if this `App` uses precomputed lowercase titles.
    pub fn uses_lower_titles(&self) -> bool {
        self.lower_titles.is_some()
    }

    /// Fuzzy-match `query_lower` against a specific track by index.
    pub fn fuzzy_match_positions_for_track_lower(
        &self,
        track_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                Self::fuzzy_match_positions_lower(&lower_titles[track_index], query_lower)
            }
            None => Self::fuzzy_match_positions(&self.tracks[track_index].display, query_lower),
        }
    }

    /// Return the next visible index after `current`, wrapping around.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping around.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(0) | None => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
        }
    }

    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
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

    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
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

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Keep `selected` inside the filtered view.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }

    // --- editor ---

    pub fn is_editing(&self) -> bool {
        self.editor.is_loaded()
    }

    fn track_index(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    fn editing_index(&self) -> Option<usize> {
        self.editor.loaded_track().and_then(|id| self.track_index(id))
    }

    /// The track open in the editor.
    pub fn editing_track(&self) -> Option<&Track> {
        self.editing_index().map(|i| &self.tracks[i])
    }

    /// Open the editor on the selected track.
    pub fn open_editor(&mut self, cache: &CoverArtCache) {
        if !self.has_tracks() {
            return;
        }
        self.view = EditorView::default();
        self.editor.load_track(self.tracks.get(self.selected), cache);
    }

    /// Save the editor into its track and refresh the track's label.
    pub fn apply_edits(&mut self, settings: &LibrarySettings) -> SaveReport {
        let Some(idx) = self.editing_index() else {
            return SaveReport::default();
        };
        let report = self.editor.apply(&mut self.tracks[idx]);
        self.refresh_display(idx, settings);
        report
    }

    /// Save and close the editor.
    pub fn ok_edits(&mut self, settings: &LibrarySettings) -> SaveReport {
        let Some(idx) = self.editing_index() else {
            return SaveReport::default();
        };
        let report = self.editor.ok(&mut self.tracks[idx]);
        self.refresh_display(idx, settings);
        self.close_editor_view();
        report
    }

    /// Close the editor, discarding edits.
    pub fn cancel_edits(&mut self) {
        self.editor.cancel();
        self.close_editor_view();
    }

    fn close_editor_view(&mut self) {
        self.view = EditorView::default();
        self.dialog = None;
    }

    fn refresh_display(&mut self, idx: usize, settings: &LibrarySettings) {
        let track = &mut self.tracks[idx];
        track.display = display_from_fields(
            track,
            &settings.display_fields,
            &settings.display_separator,
        );
        if let Some(lower) = self.lower_titles.as_mut() {
            lower[idx] = self.tracks[idx].display.to_ascii_lowercase();
        }
    }

    /// Load the next track of the browser view without saving.
    pub fn edit_next(&mut self, cache: &CoverArtCache) {
        let Some(current) = self.editing_index() else {
            return;
        };
        if let Some(next) = self.next_in_view_from(current) {
            self.selected = next;
            self.open_editor(cache);
        }
    }

    /// Load the previous track of the browser view without saving.
    pub fn edit_prev(&mut self, cache: &CoverArtCache) {
        let Some(current) = self.editing_index() else {
            return;
        };
        if let Some(prev) = self.prev_in_view_from(current) {
            self.selected = prev;
            self.open_editor(cache);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.view.focus = match self.view.focus {
            Focus::Fields => Focus::Cues,
            Focus::Cues => Focus::Fields,
        };
    }

    pub fn cursor_down(&mut self) {
        match self.view.focus {
            Focus::Fields => {
                self.view.field = (self.view.field + 1) % FormField::ALL.len();
            }
            Focus::Cues => {
                let len = self.editor.cues().len();
                if len > 0 {
                    self.view.cue = (self.view.cue + 1) % len;
                }
            }
        }
    }

    pub fn cursor_up(&mut self) {
        match self.view.focus {
            Focus::Fields => {
                let len = FormField::ALL.len();
                self.view.field = (self.view.field + len - 1) % len;
            }
            Focus::Cues => {
                let len = self.editor.cues().len();
                if len > 0 {
                    self.view.cue = (self.view.cue + len - 1) % len;
                }
            }
        }
    }

    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.view.field.min(FormField::ALL.len() - 1)]
    }

    /// Start editing the focused field or the focused cue's label.
    pub fn begin_edit(&mut self) {
        match self.view.focus {
            Focus::Fields => {
                let field = self.selected_field();
                if field == FormField::Bpm && !self.editor.form().bpm_editable {
                    self.warn("BPM Locked", "The BPM of this track cannot be changed.");
                    return;
                }
                self.view.input = Some(Input {
                    target: InputTarget::Field(field),
                    buffer: self.editor.form().text(field),
                });
            }
            Focus::Cues => self.begin_cue_edit(InputTarget::CueLabel),
        }
    }

    /// Start editing the focused cue's hotcue or label column.
    pub fn begin_cue_edit(&mut self, target: InputTarget) {
        let Some(row) = self.editor.cues().rows().get(self.view.cue) else {
            return;
        };
        let buffer = match target {
            InputTarget::CueHotcue => row.hotcue.clone(),
            _ => row.label.clone(),
        };
        self.view.input = Some(Input { target, buffer });
    }

    /// Write the line editor's buffer to its target.
    pub fn commit_input(&mut self) {
        let Some(input) = self.view.input.take() else {
            return;
        };
        match input.target {
            InputTarget::Field(field) => {
                if !self.editor.form_mut().set_text(field, &input.buffer) {
                    self.warn("Invalid Value", &format!("{:?} is not a valid BPM.", input.buffer));
                }
            }
            InputTarget::CueHotcue => {
                self.editor.cues_mut().set_hotcue(self.view.cue, &input.buffer);
            }
            InputTarget::CueLabel => {
                self.editor.cues_mut().set_label(self.view.cue, &input.buffer);
            }
        }
    }

    pub fn abort_input(&mut self) {
        self.view.input = None;
    }

    /// Drop the focused cue row; the cue is removed on the next save.
    pub fn delete_cue_row(&mut self) {
        if self.editor.cues_mut().delete_row(self.view.cue).is_some() {
            let len = self.editor.cues().len();
            self.view.cue = self.view.cue.min(len.saturating_sub(1));
        }
    }

    pub fn cycle_cue_sort(&mut self) {
        let next: SortColumn = self.editor.cues().sort_column().next();
        self.editor.cues_mut().sort_by(next);
    }

    // --- cover art ---

    pub fn on_cover_found(&mut self, found: CoverFound) -> bool {
        self.editor.on_cover_found(found)
    }

    /// Show the cover image picker.
    pub fn open_cover_picker(&mut self, cache: &CoverArtCache) {
        let Some(track) = self.editing_track() else {
            return;
        };
        let dir = self
            .editor
            .cover_picker_dir(track)
            .unwrap_or_else(|| PathBuf::from("."));
        self.dialog = Some(Dialog::CoverPicker(FilePicker::open(
            dir,
            cache.image_extensions(),
        )));
    }

    pub fn change_cover(&mut self, cache: &CoverArtCache, path: PathBuf) {
        let Some(idx) = self.editing_index() else {
            return;
        };
        let result = self.editor.change_cover(cache, &self.tracks[idx], path);
        self.report_cover_result("Change Cover Art", result);
    }

    pub fn unset_cover(&mut self, cache: &CoverArtCache) {
        let Some(idx) = self.editing_index() else {
            return;
        };
        let result = self.editor.unset_cover(cache, &self.tracks[idx]);
        self.report_cover_result("Unset Cover Art", result);
    }

    /// Compare the embedded cover with the displayed one and ask what to do.
    pub fn reload_embedded_cover(&mut self) {
        let Some(idx) = self.editing_index() else {
            return;
        };
        if let Some(prompt) = self.editor.reload_embedded_cover(&self.tracks[idx]) {
            self.dialog = Some(Dialog::Confirm(prompt));
        }
    }

    pub fn reload_metadata(&mut self, settings: &LibrarySettings) {
        let Some(idx) = self.editing_index() else {
            return;
        };
        if let Some(prompt) = self.editor.reload_metadata(&self.tracks[idx], settings) {
            self.dialog = Some(Dialog::Confirm(prompt));
        }
    }

    /// Answer the open confirmation prompt.
    pub fn answer_prompt(&mut self, yes: bool, cache: &CoverArtCache) {
        let Some(Dialog::Confirm(prompt)) = self.dialog.take() else {
            return;
        };
        if !yes {
            return;
        }
        let Some(idx) = self.editing_index() else {
            return;
        };
        let title = prompt.title();
        let result = self
            .editor
            .confirm_cover_prompt(cache, &self.tracks[idx], prompt);
        self.report_cover_result(title, result);
    }

    fn report_cover_result(&mut self, title: &str, result: Result<(), CoverError>) {
        if let Err(e) = result {
            log::warn!("{title}: {e}");
            self.warn(title, &e.to_string());
        }
    }

    /// Show a non-blocking warning notice.
    pub fn warn(&mut self, title: &str, message: &str) {
        self.dialog = Some(Dialog::Warning {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }
}

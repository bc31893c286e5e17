use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Dialog, Focus, InputTarget};
use crate::config;
use crate::cover::CoverArtCache;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Main terminal event loop: draws the UI, applies covers delivered by the
/// cache and handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    cache: &CoverArtCache,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Results for tracks no longer shown are dropped by the editor.
        for found in cache.found().try_iter() {
            app.on_cover_found(found);
        }

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, cache, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Dispatch one key press. Returns true when the app should quit.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    cache: &CoverArtCache,
    state: &mut EventLoopState,
) -> bool {
    if app.dialog.is_some() {
        handle_dialog_key(key, app, cache);
        return false;
    }

    if app.is_editing() {
        state.pending_gg = false;
        if app.view.input.is_some() {
            handle_input_key(key, app);
        } else {
            handle_editor_key(key, settings, app, cache);
        }
        return false;
    }

    if app.filter_mode {
        state.pending_gg = false;
        handle_filter_key(key, app, cache);
        return false;
    }

    handle_browse_key(key, app, cache, state)
}

fn handle_dialog_key(key: KeyEvent, app: &mut App, cache: &CoverArtCache) {
    let Some(dialog) = app.dialog.as_mut() else {
        return;
    };

    match dialog {
        Dialog::Confirm(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.answer_prompt(true, cache);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.answer_prompt(false, cache);
            }
            _ => {}
        },
        Dialog::Warning { .. } => app.dismiss_dialog(),
        Dialog::CoverPicker(picker) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => picker.next(),
            KeyCode::Char('k') | KeyCode::Up => picker.prev(),
            KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => picker.parent(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(path) = picker.choose() {
                    app.dismiss_dialog();
                    app.change_cover(cache, path);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => app.dismiss_dialog(),
            _ => {}
        },
    }
}

fn handle_input_key(key: KeyEvent, app: &mut App) {
    let Some(input) = app.view.input.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Enter => app.commit_input(),
        KeyCode::Esc => app.abort_input(),
        KeyCode::Backspace => {
            input.buffer.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.clear();
        }
        KeyCode::Char(c) if !c.is_control() => input.buffer.push(c),
        _ => {}
    }
}

fn handle_editor_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    cache: &CoverArtCache,
) {
    // Keys that only make sense on the cue table.
    if app.view.focus == Focus::Cues {
        match key.code {
            KeyCode::Char('x') | KeyCode::Delete => {
                app.delete_cue_row();
                return;
            }
            KeyCode::Char('c') => {
                app.begin_cue_edit(InputTarget::CueHotcue);
                return;
            }
            KeyCode::Char('s') => {
                app.cycle_cue_sort();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Enter | KeyCode::Char('i') => app.begin_edit(),

        KeyCode::Char('t') => {
            if app.editor.tap().is_none() && !app.editor.form().bpm_editable {
                log::debug!("tap ignored: BPM is locked");
            }
        }
        KeyCode::Char('*') => {
            app.editor.bpm_double();
        }
        KeyCode::Char('/') => {
            app.editor.bpm_halve();
        }
        KeyCode::Char('2') => {
            app.editor.bpm_two_thirds();
        }
        KeyCode::Char('3') => {
            app.editor.bpm_three_fourths();
        }

        KeyCode::Char('a') => {
            app.apply_edits(&settings.library);
        }
        KeyCode::Char('w') => {
            app.ok_edits(&settings.library);
        }
        KeyCode::Char('q') | KeyCode::Esc => app.cancel_edits(),
        KeyCode::Char('n') => app.edit_next(cache),
        KeyCode::Char('p') => app.edit_prev(cache),

        KeyCode::Char('C') => app.open_cover_picker(cache),
        KeyCode::Char('U') => app.unset_cover(cache),
        KeyCode::Char('R') => app.reload_embedded_cover(),
        KeyCode::Char('M') => app.reload_metadata(&settings.library),
        _ => {}
    }
}

fn handle_filter_key(key: KeyEvent, app: &mut App, cache: &CoverArtCache) {
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('j') | KeyCode::Char('n')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Char('p')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.prev();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.push_filter_char(c);
            }
        }
        KeyCode::Enter => {
            if app.display_indices().is_empty() {
                return;
            }
            app.exit_filter_mode();
            app.open_editor(cache);
        }
        _ => {}
    }
}

fn handle_browse_key(
    key: KeyEvent,
    app: &mut App,
    cache: &CoverArtCache,
    state: &mut EventLoopState,
) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let display = app.display_indices();
                if let Some(&first) = display.first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            let display = app.display_indices();
            if let Some(&last) = display.last() {
                app.set_selected(last);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            state.pending_gg = false;
            app.open_editor(cache);
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}

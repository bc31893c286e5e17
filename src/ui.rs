//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! track browser, the track info editor modal and the dialogs on top of it.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Padding, Paragraph, Row, Table,
        TableState, Wrap,
    },
};

use crate::app::{App, Dialog, FilePicker, Focus, InputTarget};
use crate::config::UiSettings;
use crate::cover::{CoverArt, CoverSource};
use crate::editor::{FormField, SortColumn};

const BROWSE_CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("enter", "edit track"),
    ("/", "filter"),
    ("q", "quit"),
];

const EDITOR_CONTROLS: &[(&str, &str)] = &[
    ("tab", "fields/cues"),
    ("enter", "edit"),
    ("t", "tap"),
    ("*,/", "bpm x2,/2"),
    ("2,3", "bpm 2/3,3/4"),
    ("a", "apply"),
    ("w", "ok"),
    ("q", "cancel"),
    ("n/p", "next/prev"),
    ("C/U", "change/unset cover"),
    ("R", "reload cover"),
    ("M", "reload tags"),
];

const CUE_CONTROLS: &[(&str, &str)] = &[
    ("enter", "label"),
    ("c", "hotcue"),
    ("x", "delete"),
    ("s", "sort"),
];

fn controls_text(controls: &[(&str, &str)]) -> String {
    controls
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_padded(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

/// One-paragraph description of the displayed cover.
pub fn cover_summary(cover: &CoverArt) -> String {
    let source = match &cover.source {
        CoverSource::Default => return "(no cover art)".to_string(),
        CoverSource::Embedded => "embedded".to_string(),
        CoverSource::File(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
    };

    let mut lines = vec![
        format!("Source: {source}"),
        format!("Type: {}", cover.mime.as_deref().unwrap_or("unknown")),
        format!("Size: {}", human_size(cover.data.len())),
    ];
    if let Some(hash) = &cover.hash {
        lines.push(format!("md5: {hash}"));
    }
    lines.join("\n")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, display: &[usize], ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" trackinfo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_status(frame, app, display, chunks[1]);
    draw_track_list(frame, app, display, chunks[2]);

    if app.is_editing() {
        draw_editor(frame, app, chunks[2]);
    }

    let footer_text = if app.is_editing() {
        let mut text = controls_text(EDITOR_CONTROLS);
        if app.view.focus == Focus::Cues {
            text.push_str(" | ");
            text.push_str(&controls_text(CUE_CONTROLS));
        }
        text
    } else {
        controls_text(BROWSE_CONTROLS)
    };
    let footer = Paragraph::new(footer_text)
        .block(left_padded(" controls ".to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);

    if let Some(dialog) = &app.dialog {
        let area = frame.area();
        draw_dialog(frame, dialog, area);
    }
}

fn draw_status(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" TRACKS: {}/{}", display.len(), app.tracks.len()));

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if let Some(track) = app.editing_track() {
        parts.push(format!("EDITING: {}", track.display));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    let status = Paragraph::new(parts.join(" • "))
        .block(Block::bordered().title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_track_list(frame: &mut Frame, app: &App, display: &[usize], area: Rect) {
    let q = app.filter_query.trim();
    let query_lower = if q.is_empty() {
        None
    } else if app.uses_lower_titles() {
        Some(q.to_ascii_lowercase())
    } else {
        None
    };

    // Only build ListItems for the visible window, centred on the selection.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let title = &app.tracks[i].display;
            if q.is_empty() {
                return ListItem::new(title.as_str());
            }

            let positions = match query_lower.as_deref() {
                Some(ql) => app.fuzzy_match_positions_for_track_lower(i, ql),
                None => App::fuzzy_match_positions(title, q),
            };
            let Some(positions) = positions else {
                return ListItem::new(title.as_str());
            };

            let spans: Vec<Span> = title
                .chars()
                .enumerate()
                .map(|(ci, ch)| {
                    if positions.contains(&ci) {
                        Span::styled(ch.to_string(), Style::default().add_modifier(Modifier::BOLD))
                    } else {
                        Span::raw(ch.to_string())
                    }
                })
                .collect();
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(110, 30, area);
    frame.render_widget(Clear, popup);

    let form = app.editor.form();
    let title = if form.window_title.trim().is_empty() {
        " track info ".to_string()
    } else {
        format!(" {} ", form.window_title)
    };
    let outer = Block::bordered().title(title).title_alignment(Alignment::Center);
    let inner = outer.inner(popup);
    frame.render_widget(outer, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FormField::ALL.len() as u16 + 2),
            Constraint::Min(1),
        ])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(columns[1]);

    draw_form(frame, app, left[0]);

    let info = format!(
        "Duration: {}\nType: {}  Bitrate: {}\nBPM: {}  Key: {}\nLocation: {}",
        form.duration, form.file_type, form.bitrate, form.bpm_text, form.key, form.location
    );
    let info = Paragraph::new(info)
        .block(left_padded(" file ".to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(info, left[1]);

    let cover = Paragraph::new(cover_summary(app.editor.cover()))
        .block(left_padded(" cover art ".to_string()))
        .wrap(Wrap { trim: true });
    frame.render_widget(cover, right[0]);

    draw_cues(frame, app, right[1]);

    let input_line = match &app.view.input {
        Some(input) => {
            let what = match input.target {
                InputTarget::Field(field) => field.label(),
                InputTarget::CueHotcue => "Hotcue",
                InputTarget::CueLabel => "Label",
            };
            format!("{what}: {}_", input.buffer)
        }
        None => String::new(),
    };
    let input = Paragraph::new(input_line).block(left_padded(" edit ".to_string()));
    frame.render_widget(input, rows[1]);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = app.editor.form();
    let items: Vec<ListItem> = FormField::ALL
        .iter()
        .map(|&field| {
            let value = form.text(field);
            let line = format!("{:<13}{}", field.label(), value);
            if field == FormField::Bpm && !form.bpm_editable {
                ListItem::new(format!("{line} (locked)")).dim()
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let focused = app.view.focus == Focus::Fields;
    let list = List::new(items)
        .block(Block::bordered().title(" fields "))
        .highlight_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        })
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.view.field));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_cues(frame: &mut Frame, app: &App, area: Rect) {
    let cues = app.editor.cues();
    let sort = cues.sort_column();

    let header_cell = |column: SortColumn, text: &'static str| {
        if sort == column {
            Cell::from(format!("{text}*"))
        } else {
            Cell::from(text)
        }
    };
    let header = Row::new(vec![
        header_cell(SortColumn::Row, "#"),
        Cell::from("Position"),
        header_cell(SortColumn::Hotcue, "Hotcue"),
        header_cell(SortColumn::Label, "Label"),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = cues
        .rows()
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.row_id.0.to_string()),
                Cell::from(r.duration.clone()),
                Cell::from(r.hotcue.clone()),
                Cell::from(r.label.clone()),
            ])
        })
        .collect();

    let focused = app.view.focus == Focus::Cues;
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Min(5),
        ],
    )
    .header(header)
    .block(Block::bordered().title(format!(" cues (sort: {}) ", sort.label())))
    .row_highlight_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    })
    .highlight_symbol("> ");

    let mut state = TableState::default();
    if !cues.is_empty() {
        state.select(Some(app.view.cue.min(cues.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_dialog(frame: &mut Frame, dialog: &Dialog, area: Rect) {
    match dialog {
        Dialog::Confirm(prompt) => {
            let popup = centered_rect_sized(70, 7, area);
            frame.render_widget(Clear, popup);
            let text = format!("{}\n\n[y] yes  [n] no", prompt.message());
            let p = Paragraph::new(text)
                .block(left_padded(format!(" {} ", prompt.title())))
                .wrap(Wrap { trim: true });
            frame.render_widget(p, popup);
        }
        Dialog::Warning { title, message } => {
            let popup = centered_rect_sized(70, 7, area);
            frame.render_widget(Clear, popup);
            let p = Paragraph::new(format!("{message}\n\n(press any key)"))
                .block(left_padded(format!(" {title} ")).yellow())
                .wrap(Wrap { trim: true });
            frame.render_widget(p, popup);
        }
        Dialog::CoverPicker(picker) => draw_picker(frame, picker, area),
    }
}

fn draw_picker(frame: &mut Frame, picker: &FilePicker, area: Rect) {
    let popup = centered_rect_sized(80, 20, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = picker
        .entries()
        .iter()
        .map(|e| {
            if e.is_dir {
                ListItem::new(format!("{}/", e.name)).bold()
            } else {
                ListItem::new(e.name.as_str())
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::bordered().title(format!(" choose cover art: {} ", picker.dir().display())))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !picker.entries().is_empty() {
        state.select(Some(picker.selected()));
    }
    frame.render_stateful_widget(list, popup, &mut state);
}

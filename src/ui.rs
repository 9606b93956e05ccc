//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::UiSettings;
use crate::library::{DisplayKind, SoundRecord};
use crate::session::{ClipStatus, SessionManager};


const CONTROLS: &[(&str, &str)] = &[
    ("type", "search"),
    ("enter", "search / play / stop"),
    ("↑/↓ ^j/^k", "move"),
    ("^d", "delete"),
    ("^t", "metadata"),
    ("esc", "clear / quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// List label for a record, prefixed with its session status.
fn row_label(record: &SoundRecord, status: ClipStatus) -> String {
    match record.kind {
        DisplayKind::SearchPrompt => record.name.clone(),
        DisplayKind::SectionHeader => format!("── {} ──", record.name),
        DisplayKind::Entry => {
            let marker = match status {
                ClipStatus::Downloading => "⏳",
                ClipStatus::Playing => "🔊",
                ClipStatus::Idle => "▶",
            };
            format!("{marker} {}", record.name)
        }
    }
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Contents of the metadata popup for `record`.
fn metadata_text(record: Option<&SoundRecord>, pending: Option<&str>) -> String {
    let Some(record) = record.filter(|r| r.is_playable()) else {
        return "No clip selected".to_string();
    };
    if pending == Some(record.filename.as_str()) {
        return format!("Loading tags for {}…", record.filename);
    }
    let Some(meta) = record.metadata.as_ref() else {
        return format!("File: {}", record.filename);
    };

    let cover = match &meta.cover {
        Some(c) => format!(
            "{} ({})",
            format_size(c.data.len()),
            c.mime_type.as_deref().unwrap_or("unknown type")
        ),
        None => "-".to_string(),
    };
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nCover: {}\nFile: {}",
        meta.title.as_deref().unwrap_or("-"),
        meta.artist.as_deref().unwrap_or("-"),
        meta.album.as_deref().unwrap_or("-"),
        cover,
        record.filename,
    )
}

/// Status box line: pending search, last message, and what the session is doing.
fn status_text(app: &App, session: &SessionManager) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(q) = &app.searching {
        parts.push(format!("Searching \"{q}\"…"));
    }
    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    let state = session.state();
    if let Some(f) = state.downloading_filename() {
        parts.push(format!("Downloading: {f}"));
    } else if let Some(f) = state.active_filename() {
        parts.push(format!("Playing: {f}"));
    } else {
        parts.push("Idle".to_string());
    }

    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
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

fn left_padding() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame` using `app` and session state.
pub fn draw(frame: &mut Frame, app: &App, session: &SessionManager, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" klaxon ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let input = Paragraph::new(app.search_text.as_str()).block(
        Block::bordered()
            .padding(left_padding())
            .title(" search "),
    );
    frame.render_widget(input, chunks[1]);

    let mut status_par = Paragraph::new(status_text(app, session))
        .block(Block::bordered().padding(left_padding()).title(" status "))
        .wrap(Wrap { trim: true });
    if app.searching.is_some() || session.is_busy() {
        status_par = status_par.slow_blink();
    }
    frame.render_widget(status_par, chunks[2]);

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        let total = app.records.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, app.selected)
        } else {
            let half = list_height / 2;
            let mut start = app.selected.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, app.selected - start)
        };

        let visible_items: Vec<ListItem> = app.records[start..end]
            .iter()
            .map(|r| {
                let item = ListItem::new(row_label(r, session.status_of(&r.filename)));
                if r.kind == DisplayKind::SectionHeader {
                    item.style(Style::default().add_modifier(Modifier::DIM))
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" sounds "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 9, chunks[3]);
        frame.render_widget(Clear, popup_area);

        let meta = metadata_text(app.selected_record(), app.metadata_pending.as_deref());
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(left_padding())
                    .borders(Borders::ALL)
                    .title(" metadata (^t closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_padding()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, InputMode};
use crate::config::ControlsSettings;
use crate::engine::PlaybackEngine;
use crate::item::{PlayListItem, format_hms};
use crate::playlist::PlayList;
use crate::session::{ListKind, PlaybackState, Session};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("tab".to_string(), "switch list".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("s".to_string(), "stop".to_string());
    // h/l is filled dynamically from config.
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("[/]".to_string(), "speed".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("0-5".to_string(), "rate".to_string());
    map.insert("a".to_string(), "add to playlist".to_string());
    map.insert("d".to_string(), "remove".to_string());
    map.insert("o".to_string(), "open url".to_string());
    map.insert("t".to_string(), "audio track".to_string());
    map.insert("/".to_string(), "filter".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "tab", "enter", "space/p", "s", "h/l", "+/-", "[/]", "r", "0-5", "a", "d", "o",
        "t", "/", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn stars_text(stars: i32) -> String {
    let filled = stars.clamp(0, 5) as usize;
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

/// One row of a list pane: rating, title, then resume point and length when known.
fn item_line(item: &PlayListItem) -> String {
    let mut line = format!("{} {}", stars_text(item.stars()), item.title());
    match (item.last_time() > 0, item.duration() > 0) {
        (true, true) => line.push_str(&format!(
            "  [{} / {}]",
            item.last_time_string(),
            item.duration_string()
        )),
        (false, true) => line.push_str(&format!("  [{}]", item.duration_string())),
        (true, false) => line.push_str(&format!("  [{}]", item.last_time_string())),
        (false, false) => {}
    }
    line
}

/// Build the status line from the session's playback state.
fn status_text<E: PlaybackEngine>(app: &App, session: &Session<E>) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match session.state() {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    };
    parts.push(format!(" {state}"));

    if let Some(np) = session.now_playing() {
        if session.state() == PlaybackState::Stopped {
            parts.push(np.title.clone());
        } else {
            parts.push(format!(
                "{} [{} / {}]",
                np.title,
                format_hms(session.position_ms()),
                format_hms(session.duration_ms())
            ));
        }
    }

    parts.push(format!("VOL: {:.0}%", session.volume() * 100.0));
    parts.push(format!("SPEED: {:.2}x", session.speed()));

    let repeat = if !session.repeat_enabled() {
        "REPEAT: Off".to_string()
    } else if session.repeat_max() < 0 {
        "REPEAT: Forever".to_string()
    } else {
        format!("REPEAT: {}", session.repeat_max())
    };
    parts.push(repeat);

    let streams = session.engine().audio_stream_count();
    if streams > 0 {
        parts.push(format!(
            "TRACK: {}/{}",
            session.engine().current_audio_stream() + 1,
            streams
        ));
    }

    let q = app.filter_query.trim();
    if app.input_mode == InputMode::Filter || !q.is_empty() {
        parts.push(format!("FILTER: {q}"));
    }

    if let Some(notice) = &app.notice {
        parts.push(notice.clone());
    } else if let Some(err) = session.last_error() {
        parts.push(format!("ERROR: {err}"));
    }

    parts.join(" • ")
}

/// Render one list pane, windowed around the selection.
fn draw_list(frame: &mut Frame, area: Rect, app: &App, kind: ListKind, list: &PlayList) {
    let display = app.visible_indices(list);
    let selected = app.selected_in(kind);
    let focused = app.focus == kind;

    // Only build ListItems for the visible window.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == selected).unwrap_or(0);
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
        .filter_map(|&i| list.item_at(i).ok())
        .map(|item| ListItem::new(item_line(item)))
        .collect();

    let title = match kind {
        ListKind::Playlist => format!(" playlist ({}) ", list.len()),
        ListKind::History => format!(" history ({}) ", list.len()),
    };
    let border_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let widget = List::new(visible_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 && focused {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: PlaybackEngine>(
    frame: &mut Frame,
    app: &App,
    session: &Session<E>,
    controls_settings: &ControlsSettings,
) {
    let prompt_height = if app.input_mode == InputMode::OpenUrl {
        3
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(prompt_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(app.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" reprise ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, session))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_list(frame, panes[0], app, ListKind::Playlist, session.playlist());
    draw_list(frame, panes[1], app, ListKind::History, session.history());

    if app.input_mode == InputMode::OpenUrl {
        let prompt = Paragraph::new(format!("{}_", app.input)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" open (enter plays, esc cancels) "),
        );
        frame.render_widget(prompt, chunks[3]);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode};
use crate::config;
use crate::engine::{EngineEvent, PlaybackEngine};
use crate::session::{ListKind, Session};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: applies engine notifications, draws, and handles
/// input. Returns `Ok(())` when the user quits.
pub fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut Session<E>,
    events: &mpsc::Receiver<EngineEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Emission order matters: Stopped must land before the next Started.
        while let Ok(ev) = events.try_recv() {
            session.handle_event(ev);
        }
        // Lists and the filter change under the selection; keep both panes
        // pointing at something the filter shows.
        for kind in [ListKind::Playlist, ListKind::History] {
            app.sync_selection(kind, session.list(kind));
        }

        terminal.draw(|f| ui::draw(f, app, session, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, session, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle one key press. Returns true when the app should quit.
fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut Session<E>,
    state: &mut EventLoopState,
) -> bool {
    app.notice = None;

    if app.input_mode != InputMode::Normal {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Enter => {
                let kind = app.focus;
                if let Some(url) = app.submit_input() {
                    session.play(&url);
                    if kind == ListKind::History {
                        app.set_selected(0);
                    }
                } else {
                    app.select_first(session.list(kind));
                }
            }
            KeyCode::Char(c) if !c.is_control() => app.push_char(c),
            _ => {}
        }
        return false;
    }

    let kind = app.focus;
    let scrub_ms = i64::try_from(settings.controls.scrub_seconds.saturating_mul(1000))
        .unwrap_or(i64::MAX);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first(session.list(kind));
            } else {
                state.pending_gg = true;
            }
            return false;
        }
        KeyCode::Char('G') => app.select_last(session.list(kind)),
        KeyCode::Char('j') | KeyCode::Down => app.next(session.list(kind)),
        KeyCode::Char('k') | KeyCode::Up => app.prev(session.list(kind)),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => {
            let Some(index) = app.selected_visible(session.list(kind)) else {
                return false;
            };
            match session.play_at(kind, index) {
                // The played entry moved to the top of the history.
                Ok(()) if kind == ListKind::History => app.set_selected(0),
                Ok(()) => {}
                Err(e) => log::debug!("nothing to play: {e}"),
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => session.toggle_play_pause(),
        KeyCode::Char('s') => session.stop(),
        KeyCode::Char('l') | KeyCode::Right => session.seek_by(scrub_ms),
        KeyCode::Char('h') | KeyCode::Left => session.seek_by(-scrub_ms),
        KeyCode::Char('+') | KeyCode::Char('=') => session.volume_up(),
        KeyCode::Char('-') => session.volume_down(),
        KeyCode::Char(']') => session.adjust_speed(settings.controls.speed_step),
        KeyCode::Char('[') => session.adjust_speed(-settings.controls.speed_step),
        KeyCode::Backspace => session.reset_speed(),
        KeyCode::Char('r') => {
            let enabled = !session.repeat_enabled();
            session.toggle_repeat(enabled);
        }
        KeyCode::Char(c @ '0'..='5') => {
            let stars = i32::from(c as u8 - b'0');
            if let Some(index) = app.selected_visible(session.list(kind)) {
                if let Err(e) = session.rate(kind, index, stars) {
                    log::debug!("cannot rate: {e}");
                }
            }
        }
        KeyCode::Char('a') => {
            let added = match kind {
                ListKind::History => {
                    let item = app
                        .selected_visible(session.history())
                        .and_then(|i| session.history().item_at(i).ok())
                        .cloned();
                    match item {
                        Some(item) => {
                            session.add_to_playlist(item);
                            true
                        }
                        None => false,
                    }
                }
                ListKind::Playlist => session.add_current_to_playlist(),
            };
            if added {
                app.set_notice("added to playlist");
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            let removed = app
                .selected_visible(session.list(kind))
                .and_then(|i| session.remove_at(kind, i).ok());
            if let Some(item) = removed {
                app.set_notice(format!("removed {}", item.title()));
                app.sync_selection(kind, session.list(kind));
            }
        }
        KeyCode::Char('o') => app.open_url_prompt(),
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('t') => {
            if !session.cycle_audio_stream() {
                app.set_notice("only one audio track");
            }
        }
        _ => {}
    }

    state.pending_gg = false;
    false
}

use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::session::{SessionEvent, SessionManager};
use crate::ui;

use super::actions;
use super::background::{AppEvent, Background};

/// Main terminal event loop: applies background completions, fires debounced
/// searches, draws, and handles input. Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut SessionManager,
    background: &Background,
    session_rx: &mpsc::Receiver<SessionEvent>,
    app_rx: &mpsc::Receiver<AppEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let debounce = Duration::from_millis(settings.search.debounce_ms);

    loop {
        while let Ok(ev) = session_rx.try_recv() {
            actions::apply_session_event(app, session, background, ev);
        }
        while let Ok(ev) = app_rx.try_recv() {
            actions::apply_app_event(app, ev);
        }

        // Typing paused long enough: search without waiting for Enter.
        if let Some(query) = app.due_search(Instant::now(), debounce) {
            if app.begin_search().is_some() {
                log::debug!("debounced search for {query:?}");
                background.search(query);
            }
        }

        terminal.draw(|f| ui::draw(f, app, session, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, session, background) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    session: &mut SessionManager,
    background: &Background,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => app.next(),
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => app.prev(),
        KeyCode::Char('d') if ctrl => actions::on_item_delete_requested(app, session),
        KeyCode::Char('t') if ctrl => actions::on_metadata_requested(app, session, background),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Enter => actions::on_item_selected(app, session, background),
        KeyCode::Backspace => app.pop_search_char(Instant::now()),
        KeyCode::Esc => {
            if app.metadata_window {
                app.toggle_metadata_window();
            } else if !app.search_text.is_empty() {
                app.on_search_text_changed(String::new(), Instant::now());
            } else {
                return true;
            }
        }
        KeyCode::Char(c) if !ctrl && !c.is_control() => {
            app.push_search_char(c, Instant::now());
        }
        _ => {}
    }

    false
}

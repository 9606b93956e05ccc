use std::env;
use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::catalog::{HttpCatalog, build_http_client};
use crate::config::Settings;
use crate::library::{LibraryStore, MetadataReader};
use crate::session::{SessionManager, SystemRunner};

mod actions;
mod background;
mod event_loop;
mod logging;
mod settings;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    if env::args().skip(1).any(|a| a == "--dump-config") {
        print!("{}", Settings::default().to_toml()?);
        return Ok(());
    }

    let settings = settings::load_settings();
    if let Some(path) = logging::init(&settings.logging) {
        log::info!("klaxon {} starting, logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    }

    let http = build_http_client(&settings.catalog)?;
    let catalog = HttpCatalog::new(http.clone(), &settings.catalog)?;
    let store = LibraryStore::new(settings.library.resolved_dir());
    log::info!("library directory: {}", store.root().display());

    let (session_tx, session_rx) = mpsc::channel();
    let runner = Arc::new(SystemRunner::new(settings.commands.clone()));
    let mut session = SessionManager::new(store.clone(), runner, session_tx);

    let (app_tx, app_rx) = mpsc::channel();
    let background = background::Background::new(Arc::new(catalog), MetadataReader::new(http), app_tx);

    let mut app = App::new(store.local_records(), settings.ui.show_library);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut session,
        &background,
        &session_rx,
        &app_rx,
    );

    // Never leave a player running behind the shell.
    session.shutdown();
    log::info!("klaxon exiting");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

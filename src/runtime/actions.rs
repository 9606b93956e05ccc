//! The operations the TUI forwards user input to.

use crate::app::App;
use crate::error::Error;
use crate::library::MetadataSource;
use crate::session::{Activation, ClipStatus, SessionEvent, SessionManager};

use super::background::{AppEvent, Background};

/// Enter on a row: search from the prompt, or play / stop / replace a clip.
pub fn on_item_selected(app: &mut App, session: &mut SessionManager, background: &Background) {
    let Some(record) = app.selected_record().cloned() else {
        return;
    };

    match session.activate(&record) {
        Ok(Activation::Search) => {
            if let Some(query) = app.begin_search() {
                app.status = None;
                background.search(query);
            }
        }
        Ok(Activation::Ignored) => {}
        Ok(_) => app.status = None,
        Err(e) => {
            log::warn!("activating {} failed: {e}", record.filename);
            app.set_status(e.to_string());
        }
    }
}

/// Delete the selected clip from the library and the list.
pub fn on_item_delete_requested(app: &mut App, session: &SessionManager) {
    let Some(record) = app.selected_record().cloned() else {
        return;
    };
    if !record.is_playable() {
        return;
    }
    if session.is_downloading(&record.filename) {
        app.set_status(format!("\"{}\" is still downloading", record.name));
        return;
    }
    if session.status_of(&record.filename) != ClipStatus::Idle {
        app.set_status(format!("Stop \"{}\" before deleting it", record.name));
        return;
    }

    match session.store().delete(&record.filename) {
        Ok(()) => {
            app.remove_record(&record.filename);
            app.set_status(format!("Deleted \"{}\"", record.name));
        }
        Err(Error::DeleteNotFound(filename)) => {
            log::warn!("delete: {filename} is not in the library");
            // A library row whose file vanished is stale; catalog rows stay.
            if record.source_url.is_none() {
                app.remove_record(&filename);
            }
            app.set_status(format!("\"{}\" is not downloaded", record.name));
        }
        Err(e) => {
            log::error!("delete {} failed: {e}", record.filename);
            app.set_status(e.to_string());
        }
    }
}

/// Toggle the metadata popup, fetching tags for the selected clip if needed.
pub fn on_metadata_requested(app: &mut App, session: &SessionManager, background: &Background) {
    app.toggle_metadata_window();
    if !app.metadata_window {
        return;
    }
    let Some(record) = app.selected_record().cloned() else {
        return;
    };
    if !record.is_playable() || record.metadata.is_some() {
        return;
    }
    if app.metadata_pending.as_deref() == Some(record.filename.as_str()) {
        return;
    }

    let store = session.store();
    let source = if store.exists(&record.filename) {
        MetadataSource::Local(store.path_for(&record.filename))
    } else if let Some(url) = record.source_url.clone() {
        MetadataSource::Remote(url)
    } else {
        return;
    };

    app.metadata_pending = Some(record.filename.clone());
    background.load_metadata(record.filename, source);
}

/// Apply a search or metadata completion to the model.
pub fn apply_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::SearchFinished { query, result } => {
            app.finish_search(&query, result);
        }
        AppEvent::MetadataLoaded { filename, metadata } => {
            app.apply_metadata(&filename, metadata);
        }
        AppEvent::LibraryListed(records) => app.set_library(records),
    }
}

/// Apply a session completion; finished downloads refresh the library listing in the background.
pub fn apply_session_event(
    app: &mut App,
    session: &mut SessionManager,
    background: &Background,
    event: SessionEvent,
) {
    let downloaded = matches!(
        &event,
        SessionEvent::DownloadFinished { result: Ok(()), .. }
    );

    if let Err(e) = session.handle_event(event) {
        app.set_status(e.to_string());
    }

    if downloaded {
        background.list_library(session.store().clone());
    }
}

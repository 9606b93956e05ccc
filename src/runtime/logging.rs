use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::config::LoggingSettings;

/// Route `log` output to a file; the terminal belongs to the TUI.
///
/// Returns the log file path, or `None` when logging stays off.
pub fn init(settings: &LoggingSettings) -> Option<PathBuf> {
    let path = settings.resolved_file()?;
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("klaxon: cannot create log directory {}: {e}", parent.display());
            return None;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("klaxon: cannot open log file {}: {e}", path.display());
            return None;
        }
    };

    // Set RUST_LOG=debug for verbose output.
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.level.as_str()),
    )
    .format_timestamp_millis()
    .target(env_logger::Target::Pipe(Box::new(file)))
    .try_init();

    match result {
        Ok(()) => Some(path),
        Err(_) => None,
    }
}

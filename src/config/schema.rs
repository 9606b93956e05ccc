use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/klaxon/config.toml` or `~/.config/klaxon/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `KLAXON__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub library: LibrarySettings,
    pub commands: CommandSettings,
    pub search: SearchSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Scheme and host of the sound provider, without trailing slash.
    pub base_url: String,
    /// Locale path segment of the search page (`/<locale>/search/`).
    pub locale: String,
    /// CSS selector matching the play buttons on a results page.
    pub button_selector: String,
    /// Localized prefix stripped from each button's `title` attribute.
    pub title_prefix: String,
    /// Pattern applied to the `onclick` attribute; capture group 1 is the resource path.
    pub handler_pattern: String,
    /// Request timeout for searches and remote metadata fetches (seconds).
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.myinstants.com".to_string(),
            locale: "fr".to_string(),
            button_selector: "button.small-button".to_string(),
            title_prefix: "Jouer le son de ".to_string(),
            handler_pattern: r"play\('(.+?)',".to_string(),
            timeout_secs: 10,
            user_agent: concat!("klaxon/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory holding downloaded clips. Defaults to `<documents>/klaxon`.
    pub dir: Option<PathBuf>,
}

impl LibrarySettings {
    /// The configured directory, or the default one under the user's documents.
    pub fn resolved_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("klaxon")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandSettings {
    /// Program used to fetch a clip into the library.
    pub download_program: String,
    pub download_silent_flag: String,
    pub download_output_flag: String,
    /// Program used to play a clip; receives the file path as its only argument.
    pub player_program: String,
}

impl Default for CommandSettings {
    fn default() -> Self {
        let player = if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "paplay"
        };
        Self {
            download_program: "curl".to_string(),
            download_silent_flag: "--silent".to_string(),
            download_output_flag: "-o".to_string(),
            player_program: player.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Idle time after the last keystroke before searching automatically (milliseconds).
    /// Set to 0 to only search when the prompt row is activated.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether downloaded clips are listed under the search prompt.
    pub show_library: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Search for sounds... ~ ".to_string(),
            show_library: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log filter; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file. Defaults to `<cache dir>/klaxon/klaxon.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingSettings {
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("klaxon").join("klaxon.log")))
    }
}

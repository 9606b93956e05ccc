use std::{env, path::PathBuf};

use regex::Regex;

use super::schema::Settings;

/// Where klaxon's settings come from, lowest precedence first: built-in
/// defaults (what `--dump-config` prints), `config.toml`, then `KLAXON__SECTION__KEY`
/// environment variables such as `KLAXON__COMMANDS__PLAYER_PROGRAM=mpv`.
impl Settings {
    /// Layer the config file and environment over the defaults. A missing file is fine.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = resolve_config_path() {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("KLAXON")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject settings that would break every search or every activation: empty
    /// program names, a handler pattern without a capture group for the clip path,
    /// or a button selector that does not parse.
    pub fn validate(&self) -> Result<(), String> {
        if self.commands.player_program.trim().is_empty() {
            return Err("commands.player_program must not be empty".to_string());
        }
        if self.commands.download_program.trim().is_empty() {
            return Err("commands.download_program must not be empty".to_string());
        }
        match Regex::new(&self.catalog.handler_pattern) {
            Ok(re) if re.captures_len() >= 2 => {}
            Ok(_) => return Err("catalog.handler_pattern needs a capture group".to_string()),
            Err(e) => return Err(format!("catalog.handler_pattern is invalid: {e}")),
        }
        if scraper::Selector::parse(&self.catalog.button_selector).is_err() {
            return Err("catalog.button_selector is not a valid CSS selector".to_string());
        }
        Ok(())
    }

    /// Render these settings as TOML (used by `--dump-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `KLAXON_CONFIG_PATH` names the file outright; otherwise use the per-user default.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os("KLAXON_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `klaxon/config.toml` in the XDG config home (`~/.config` when unset).
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("klaxon").join("config.toml"))
}

use std::{env, path::PathBuf};

use super::schema::{MAX_SPEED, MIN_SPEED, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `REPRISE__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("REPRISE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.history.max_rows == 0 {
            return Err("history.max_rows must be >= 1".to_string());
        }
        if self.playlist.max_rows == Some(0) {
            return Err("playlist.max_rows must be >= 1 when set".to_string());
        }
        if self.playlist.file_name.trim().is_empty() || self.history.file_name.trim().is_empty() {
            return Err("playlist/history file_name must not be empty".to_string());
        }
        if self.playlist.file_name == self.history.file_name {
            return Err("playlist and history must use different files".to_string());
        }
        if !(self.audio.volume_step > 0.0) {
            return Err("audio.volume_step must be > 0".to_string());
        }
        if !(0.0..=self.audio.max_volume).contains(&self.audio.volume) {
            return Err("audio.volume must be within 0..=audio.max_volume".to_string());
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.audio.speed) {
            return Err(format!("audio.speed must be within {MIN_SPEED}..={MAX_SPEED}"));
        }
        let max_step = MAX_SPEED - MIN_SPEED;
        if !(self.controls.speed_step > 0.0 && self.controls.speed_step <= max_step) {
            return Err(format!("controls.speed_step must be within (0, {max_step}]"));
        }
        if self.repeat.count < -1 {
            return Err("repeat.count must be -1 (forever) or >= 0".to_string());
        }
        Ok(())
    }

    /// Directory holding the persisted lists and the log file.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(default_data_dir)
            .unwrap_or_else(|| PathBuf::from(".reprise"))
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.data_dir().join(&self.playlist.file_name)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir().join(&self.history.file_name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("reprise.log"))
    }
}

/// Resolve the config path from `REPRISE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("REPRISE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/reprise/config.toml`
/// or `~/.config/reprise/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_home("XDG_CONFIG_HOME", ".config").map(|d| d.join("reprise").join("config.toml"))
}

/// `$XDG_DATA_HOME/reprise` or `~/.local/share/reprise`.
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_home("XDG_DATA_HOME", ".local/share").map(|d| d.join("reprise"))
}

fn xdg_home(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}

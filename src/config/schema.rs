use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Slowest playback speed ratio accepted from config or the keyboard.
pub const MIN_SPEED: f32 = 0.25;
/// Fastest playback speed ratio accepted from config or the keyboard.
pub const MAX_SPEED: f32 = 4.0;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/reprise/config.toml` or `~/.config/reprise/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `REPRISE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub playlist: ListSettings,
    pub history: HistorySettings,
    pub audio: AudioSettings,
    pub controls: ControlsSettings,
    pub repeat: RepeatSettings,
    pub decoder: DecoderSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the playlist, history and log files.
    /// Defaults to `$XDG_DATA_HOME/reprise` or `~/.local/share/reprise`.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListSettings {
    /// File name inside the data directory.
    pub file_name: String,
    /// Optional cap on the number of entries.
    pub max_rows: Option<usize>,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            file_name: "playlist.jsonl".to_string(),
            max_rows: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistorySettings {
    pub file_name: String,
    pub max_rows: usize,
    /// Seek to the remembered position when replaying a history entry.
    pub resume: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            file_name: "history.jsonl".to_string(),
            max_rows: 20,
            resume: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial volume ratio (1.0 = unchanged).
    pub volume: f32,
    /// Volume change per key press.
    pub volume_step: f32,
    pub max_volume: f32,
    /// Initial playback speed ratio.
    pub speed: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            volume_step: 0.05,
            max_volume: 5.0,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `h` / `l`.
    pub scrub_seconds: u64,
    /// Speed change per key press.
    pub speed_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 10,
            speed_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepeatSettings {
    /// Whether repeat starts enabled.
    pub enabled: bool,
    /// Extra passes when repeat is enabled; -1 repeats forever.
    pub count: i32,
}

impl Default for RepeatSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            count: -1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderSettings {
    /// Decoder names handed to the engine, e.g. ["FFmpeg", "VAAPI"].
    pub priority: Vec<String>,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            priority: vec!["FFmpeg".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Which list has focus at startup.
    pub start_in: FocusSetting,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ pick up where you left off ~ ".to_string(),
            start_in: FocusSetting::Playlist,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusSetting {
    Playlist,
    #[serde(alias = "recent")]
    History,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter, e.g. "info" or "reprise=debug". `RUST_LOG` wins.
    pub level: String,
    /// Log file; defaults to `reprise.log` in the data directory.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

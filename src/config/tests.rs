use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_reprise_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("REPRISE_CONFIG_PATH", "/tmp/reprise-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/reprise-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("reprise")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_falls_back_to_home_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_data_dir().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".local/share")
            .join("reprise")
    );
}

#[test]
fn defaults_match_the_classic_player() {
    let s = Settings::default();
    assert_eq!(s.history.max_rows, 20);
    assert_eq!(s.playlist.max_rows, None);
    assert_eq!(s.audio.volume_step, 0.05);
    assert_eq!(s.repeat.count, -1);
    assert!(!s.repeat.enabled);
    assert!(s.validate().is_ok());
}

#[test]
fn list_paths_live_in_the_data_dir() {
    let mut s = Settings::default();
    s.storage.data_dir = Some(PathBuf::from("/tmp/reprise-data"));
    assert_eq!(
        s.playlist_path(),
        PathBuf::from("/tmp/reprise-data/playlist.jsonl")
    );
    assert_eq!(
        s.history_path(),
        PathBuf::from("/tmp/reprise-data/history.jsonl")
    );
    assert_eq!(s.log_path(), PathBuf::from("/tmp/reprise-data/reprise.log"));
}

#[test]
fn validate_rejects_zero_history_and_shared_files() {
    let mut s = Settings::default();
    s.history.max_rows = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.history.file_name = s.playlist.file_name.clone();
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.repeat.count = -2;
    assert!(s.validate().is_err());
}

#[test]
fn validate_keeps_speed_settings_within_the_playable_range() {
    for speed in [0.0, -1.0, 0.1, 4.5, 1e30, f32::NAN, f32::INFINITY] {
        let mut s = Settings::default();
        s.audio.speed = speed;
        assert!(s.validate().is_err(), "speed {speed} accepted");
    }
    for speed in [MIN_SPEED, 1.0, MAX_SPEED] {
        let mut s = Settings::default();
        s.audio.speed = speed;
        assert!(s.validate().is_ok(), "speed {speed} rejected");
    }

    for step in [0.0, -0.1, 100.0, f32::NAN] {
        let mut s = Settings::default();
        s.controls.speed_step = step;
        assert!(s.validate().is_err(), "step {step} accepted");
    }
    let mut s = Settings::default();
    s.controls.speed_step = 0.5;
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[storage]
data_dir = "/tmp/reprise-elsewhere"

[playlist]
file_name = "mine.jsonl"
max_rows = 500

[history]
max_rows = 5
resume = false

[audio]
volume = 0.5

[repeat]
enabled = true
count = 3

[decoder]
priority = ["VAAPI", "FFmpeg"]

[ui]
start_in = "recent"

[library]
extensions = ["mp3"]
recursive = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("REPRISE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("REPRISE__HISTORY__MAX_ROWS");

    let s = Settings::load().unwrap();
    assert_eq!(s.data_dir(), PathBuf::from("/tmp/reprise-elsewhere"));
    assert_eq!(s.playlist.file_name, "mine.jsonl");
    assert_eq!(s.playlist.max_rows, Some(500));
    assert_eq!(s.history.max_rows, 5);
    assert!(!s.history.resume);
    assert_eq!(s.history.file_name, "history.jsonl");
    assert_eq!(s.audio.volume, 0.5);
    assert!(s.repeat.enabled);
    assert_eq!(s.repeat.count, 3);
    assert_eq!(s.decoder.priority, vec!["VAAPI", "FFmpeg"]);
    assert_eq!(s.ui.start_in, FocusSetting::History);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[history]
max_rows = 50
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("REPRISE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("REPRISE__HISTORY__MAX_ROWS", "7");

    let s = Settings::load().unwrap();
    assert_eq!(s.history.max_rows, 7);
}

#[test]
fn settings_serialize_to_toml_and_back() {
    let s = Settings::default();
    let text = toml::to_string_pretty(&s).unwrap();
    assert!(text.contains("[history]"));
    let back: Settings = toml::from_str(&text).unwrap();
    assert_eq!(back.history.max_rows, s.history.max_rows);
    assert_eq!(back.decoder.priority, s.decoder.priority);
}

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::config;
use crate::engine::PlaybackEngine;
use crate::library;
use crate::session::Session;

/// Send log output to the configured file. The terminal belongs to the TUI.
///
/// `RUST_LOG` overrides `log.level`.
pub fn init_logging(settings: &config::Settings) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = settings.log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log.level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .format_timestamp_millis()
    .try_init()?;

    Ok(path)
}

/// Append every command-line argument to the playlist. Directories are
/// scanned for audio files; returns how many entries were added.
pub fn import_args<E: PlaybackEngine>(
    session: &mut Session<E>,
    args: &[String],
    settings: &config::LibrarySettings,
) -> usize {
    let mut added = 0;
    for arg in args {
        for item in library::import(arg, settings) {
            session.add_to_playlist(item);
            added += 1;
        }
    }
    if added > 0 {
        log::info!("added {added} entries from the command line");
    }
    added
}

//! Error types for the playlist store and the playback engine.

use std::io;
use std::path::PathBuf;

/// Errors raised by `PlayList` persistence and positional access.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode playlist record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("index {index} out of range for playlist of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no save file configured")]
    NoSaveFile,
}

/// Errors reported by the playback engine through `EngineEvent::Error`.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("unsupported url: {0}")]
    UnsupportedUrl(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;

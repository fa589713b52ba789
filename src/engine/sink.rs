//! Opening media for the audio thread.
//!
//! Resolves urls to local files, probes durations and prepares a paused `Sink`
//! at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::PlaybackError;
use crate::item::is_network_url;

/// Map a playable url to a local path. Network urls are not supported by the
/// audio engine.
pub(crate) fn local_path(url: &str) -> Result<PathBuf, PlaybackError> {
    if is_network_url(url) {
        return Err(PlaybackError::UnsupportedUrl(url.to_string()));
    }
    Ok(PathBuf::from(url.strip_prefix("file://").unwrap_or(url)))
}

/// Media duration from the file's tags/properties, if it can be read.
pub(crate) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the decoder's own duration estimate, for files `lofty` cannot
/// read.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), PlaybackError> {
    let file = File::open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| PlaybackError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

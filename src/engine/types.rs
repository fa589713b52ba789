//! Engine messages and shared playback status.

use std::sync::{Arc, Mutex};

use crate::decoder::VideoDecoderId;
use crate::error::PlaybackError;

/// Notifications from the engine to its host.
#[derive(Debug)]
pub enum EngineEvent {
    /// Media opened and the first pass began.
    Started,
    /// Playback ended (after all repeats) or was stopped.
    Stopped,
    Paused(bool),
    PositionChanged(i64),
    SpeedChanged(f32),
    Error(PlaybackError),
}

#[derive(Debug)]
pub(crate) enum EngineCmd {
    Play(String),
    Stop,
    Pause(bool),
    Seek(i64),
    SetVolume(f32),
    SetSpeed(f32),
    SetRepeat(i32),
    SetStartPosition(i64),
    SetStopPosition(i64),
    SetPriority(Vec<VideoDecoderId>),
    Quit,
}

/// Playback status published by the audio thread.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Url of the loaded media, if any.
    pub url: Option<String>,
    pub paused: bool,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub repeat: i32,
    pub current_repeat: i32,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            url: None,
            paused: false,
            position_ms: 0,
            duration_ms: 0,
            repeat: 0,
            current_repeat: 0,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Resolve a configured start position against the media duration.
///
/// Negative values count back from the end; the result lies in `0..=duration`
/// when the duration is known.
pub(crate) fn resolve_start_position(ms: i64, duration_ms: i64) -> i64 {
    let pos = if ms < 0 { duration_ms + ms } else { ms };
    if duration_ms > 0 {
        pos.clamp(0, duration_ms)
    } else {
        pos.max(0)
    }
}

/// Resolve a configured stop position. `None` means "play to the end".
pub(crate) fn resolve_stop_position(ms: i64, duration_ms: i64) -> Option<i64> {
    match ms {
        0 => None,
        ms if ms < 0 && duration_ms > 0 => Some((duration_ms + ms).max(0)),
        ms if ms < 0 => None,
        ms if duration_ms > 0 && ms >= duration_ms => None,
        ms => Some(ms),
    }
}

/// Whether another pass should start after one ended.
pub(crate) fn should_repeat(repeat: i32, current_repeat: i32) -> bool {
    repeat < 0 || current_repeat < repeat
}

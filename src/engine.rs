//! Playback engine boundary and its `rodio` implementation.
//!
//! The session drives an engine through the `PlaybackEngine` trait and learns
//! about playback progress from `EngineEvent`s, delivered in emission order over
//! an `mpsc` channel handed to the engine at construction.

mod player;
mod sink;
mod thread;
mod types;

pub use player::RodioEngine;
pub use types::*;

use crate::decoder::VideoDecoderId;

/// Commands and queries the host issues to a playback engine.
///
/// Positions and durations are milliseconds. `is_playing` is true while media is
/// loaded, paused or not.
pub trait PlaybackEngine {
    fn play(&mut self, url: &str);
    fn stop(&mut self);
    fn pause(&mut self, paused: bool);
    fn seek(&mut self, ms: i64);
    fn set_volume(&mut self, ratio: f32);
    fn set_speed(&mut self, ratio: f32);
    /// Extra passes after the first one; -1 repeats until stopped, 0 disables.
    fn set_repeat(&mut self, count: i32);
    fn set_start_position(&mut self, ms: i64);
    /// 0 means the end of the media, negative values count back from the end.
    fn set_stop_position(&mut self, ms: i64);
    fn current_audio_stream(&self) -> i32;
    fn audio_stream_count(&self) -> i32;
    fn set_audio_stream(&mut self, index: i32, immediate: bool) -> bool;
    fn set_priority(&mut self, priority: &[VideoDecoderId]);

    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    fn position(&self) -> i64;
    fn duration(&self) -> i64;
    fn repeat(&self) -> i32;
    fn current_repeat(&self) -> i32;
}

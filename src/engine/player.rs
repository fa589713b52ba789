use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::decoder::VideoDecoderId;

use super::PlaybackEngine;
use super::thread::spawn_audio_thread;
use super::types::{EngineCmd, EngineEvent, PlaybackHandle, PlaybackInfo};

/// Audio-only engine: a `rodio` output driven from a dedicated thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioEngine {
    /// Spawn the audio thread. Notifications go to `events`.
    pub fn new(events: Sender<EngineEvent>, volume: f32, speed: f32) -> Self {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(rx, events, playback.clone(), volume, speed);

        Self {
            tx,
            playback,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    fn send(&self, cmd: EngineCmd) {
        if let Err(e) = self.tx.send(cmd) {
            log::warn!("audio thread gone, dropped {:?}", e.0);
        }
    }

    fn snapshot(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(EngineCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl PlaybackEngine for RodioEngine {
    fn play(&mut self, url: &str) {
        self.send(EngineCmd::Play(url.to_string()));
    }

    fn stop(&mut self) {
        self.send(EngineCmd::Stop);
    }

    fn pause(&mut self, paused: bool) {
        self.send(EngineCmd::Pause(paused));
    }

    fn seek(&mut self, ms: i64) {
        self.send(EngineCmd::Seek(ms));
    }

    fn set_volume(&mut self, ratio: f32) {
        self.send(EngineCmd::SetVolume(ratio));
    }

    fn set_speed(&mut self, ratio: f32) {
        self.send(EngineCmd::SetSpeed(ratio));
    }

    fn set_repeat(&mut self, count: i32) {
        self.send(EngineCmd::SetRepeat(count));
    }

    fn set_start_position(&mut self, ms: i64) {
        self.send(EngineCmd::SetStartPosition(ms));
    }

    fn set_stop_position(&mut self, ms: i64) {
        self.send(EngineCmd::SetStopPosition(ms));
    }

    // rodio decodes a single audio stream per file.
    fn current_audio_stream(&self) -> i32 {
        if self.is_playing() { 0 } else { -1 }
    }

    fn audio_stream_count(&self) -> i32 {
        if self.is_playing() { 1 } else { 0 }
    }

    fn set_audio_stream(&mut self, index: i32, _immediate: bool) -> bool {
        index == 0 && self.is_playing()
    }

    fn set_priority(&mut self, priority: &[VideoDecoderId]) {
        self.send(EngineCmd::SetPriority(priority.to_vec()));
    }

    fn is_playing(&self) -> bool {
        self.snapshot().url.is_some()
    }

    fn is_paused(&self) -> bool {
        self.snapshot().paused
    }

    fn position(&self) -> i64 {
        self.snapshot().position_ms
    }

    fn duration(&self) -> i64 {
        self.snapshot().duration_ms
    }

    fn repeat(&self) -> i32 {
        self.snapshot().repeat
    }

    fn current_repeat(&self) -> i32 {
        self.snapshot().current_repeat
    }
}

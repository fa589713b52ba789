//! The playback session: owns the playlist, the history and the engine.
//!
//! A `Session` is created once at startup with `Session::open`, which loads both
//! lists, and torn down with `close`, which records the resume position of the
//! current media and saves both lists. Engine notifications are fed in through
//! `handle_event` in the order the engine emitted them.

use crate::config::{MAX_SPEED, MIN_SPEED, Settings};
use crate::decoder::{VideoDecoderId, priority_from_names};
use crate::engine::{EngineEvent, PlaybackEngine};
use crate::error::{PlaylistError, Result};
use crate::item::{PlayListItem, title_from_url};
use crate::playlist::{LoadOutcome, PlayList};

/// Playback closer than this to the end is treated as finished.
const FINISHED_MARGIN_MS: i64 = 2_000;
const MAX_STARS: i32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Which of the two lists an operation targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListKind {
    Playlist,
    History,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub url: String,
    pub title: String,
}

pub struct Session<E: PlaybackEngine> {
    engine: E,
    playlist: PlayList,
    history: PlayList,

    now_playing: Option<NowPlaying>,
    state: PlaybackState,
    position_ms: i64,
    duration_ms: i64,
    speed: f32,
    volume: f32,
    volume_step: f32,
    max_volume: f32,

    repeat_enabled: bool,
    repeat_max: i32,
    repeat_range: (i64, i64),
    decoder_priority: Vec<VideoDecoderId>,

    resume: bool,
    pending_resume: Option<i64>,
    /// A `play` was issued and its `Started` or `Error` has not arrived yet.
    awaiting_start: bool,
    last_error: Option<String>,
    closed: bool,
}

impl<E: PlaybackEngine> Session<E> {
    /// Build the session from `settings` and load both lists from disk.
    pub fn open(settings: &Settings, mut engine: E) -> Self {
        let mut playlist = PlayList::new();
        playlist.set_max_rows(settings.playlist.max_rows);
        playlist.set_save_file(settings.playlist_path());
        log_load("playlist", playlist.load());

        let mut history = PlayList::new();
        history.set_max_rows(Some(settings.history.max_rows));
        history.set_save_file(settings.history_path());
        log_load("history", history.load());

        engine.set_volume(settings.audio.volume);
        if settings.audio.speed != 1.0 {
            engine.set_speed(settings.audio.speed);
        }

        Self {
            engine,
            playlist,
            history,
            now_playing: None,
            state: PlaybackState::Stopped,
            position_ms: 0,
            duration_ms: 0,
            speed: settings.audio.speed,
            volume: settings.audio.volume,
            volume_step: settings.audio.volume_step,
            max_volume: settings.audio.max_volume,
            repeat_enabled: settings.repeat.enabled,
            repeat_max: settings.repeat.count,
            repeat_range: (0, 0),
            decoder_priority: priority_from_names(&settings.decoder.priority),
            resume: settings.history.resume,
            pending_resume: None,
            awaiting_start: false,
            last_error: None,
            closed: false,
        }
    }

    /// Start playing `url` and move it to the front of the history.
    pub fn play(&mut self, url: &str) {
        self.remember_position();

        let known = self.playlist.find(url).or_else(|| self.history.find(url));
        let title = known
            .map(|i| i.title().to_string())
            .unwrap_or_else(|| title_from_url(url));
        let previous = self.history.find(url).cloned();

        let mut item = PlayListItem::new(url);
        item.set_title(title.clone());
        item.set_last_time(0);
        if let Some(prev) = &previous {
            item.set_stars(prev.stars());
            item.set_duration(prev.duration());
        }

        self.pending_resume = previous
            .filter(|_| self.resume)
            .map(|prev| resume_point(prev.last_time(), prev.duration()))
            .filter(|&ms| ms > 0);

        self.history.remove(url);
        if let Err(e) = self.history.insert_item_at(item, 0) {
            log::error!("history insert failed: {e}");
        }

        self.engine
            .set_repeat(if self.repeat_enabled { self.repeat_max } else { 0 });
        self.engine.set_priority(&self.decoder_priority);

        self.now_playing = Some(NowPlaying {
            url: url.to_string(),
            title,
        });
        self.last_error = None;
        self.position_ms = 0;
        self.duration_ms = 0;
        self.awaiting_start = true;
        self.engine.play(url);
    }

    /// Play the entry at `index` of `kind`.
    pub fn play_at(&mut self, kind: ListKind, index: usize) -> Result<()> {
        let url = self.list(kind).item_at(index)?.url().to_string();
        self.play(&url);
        Ok(())
    }

    /// Apply an engine notification.
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => self.on_started(),
            EngineEvent::Stopped => self.on_stopped(),
            EngineEvent::Paused(p) => {
                if self.state != PlaybackState::Stopped {
                    self.state = if p {
                        PlaybackState::Paused
                    } else {
                        PlaybackState::Playing
                    };
                }
            }
            EngineEvent::PositionChanged(ms) => self.position_ms = ms,
            EngineEvent::SpeedChanged(s) => self.speed = s,
            EngineEvent::Error(e) => {
                log::error!("playback error: {e}");
                self.last_error = Some(e.to_string());
                self.awaiting_start = false;
                if !self.engine.is_playing() {
                    self.remember_position();
                    self.state = PlaybackState::Stopped;
                    self.pending_resume = None;
                }
            }
        }
    }

    fn on_started(&mut self) {
        self.awaiting_start = false;
        self.state = PlaybackState::Playing;
        self.position_ms = 0;
        self.duration_ms = self.engine.duration();

        let Some(np) = self.now_playing.clone() else {
            return;
        };
        let duration = self.duration_ms;
        let title = np.title.clone();
        self.update_entries(&np.url, |item| {
            item.set_title(title.clone());
            if duration > 0 {
                item.set_duration(duration);
            }
        });

        if let Some(ms) = self.pending_resume.take() {
            log::info!("resuming {} at {}", np.url, crate::item::format_hms(ms));
            self.engine.seek(ms);
            self.position_ms = ms;
        }
    }

    fn on_stopped(&mut self) {
        // A stop that lands between `play` and its `Started` ended the
        // previous media, not the one now loading.
        if self.awaiting_start {
            log::debug!("ignoring stop of replaced media");
            return;
        }
        self.remember_position();
        self.engine.set_priority(&self.decoder_priority);
        self.state = PlaybackState::Stopped;
        self.position_ms = 0;
        self.pending_resume = None;
        self.toggle_repeat(false);
    }

    /// Store the current position as the resume point of the playing media.
    fn remember_position(&mut self) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        let Some(np) = self.now_playing.clone() else {
            return;
        };
        let at = resume_point(self.position_ms, self.duration_ms);
        self.update_entries(&np.url, |item| item.set_last_time(at));
    }

    /// Apply `f` to the entry for `url` in both lists, where present.
    fn update_entries(&mut self, url: &str, f: impl Fn(&mut PlayListItem)) {
        for list in [&mut self.history, &mut self.playlist] {
            let Some(index) = list.position(url) else {
                continue;
            };
            let result = list.item_at(index).cloned().and_then(|mut item| {
                f(&mut item);
                list.set_item_at(item, index)
            });
            if let Err(e) = result {
                log::error!("failed to update {url}: {e}");
            }
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.engine.pause(true),
            PlaybackState::Paused => self.engine.pause(false),
            PlaybackState::Stopped => {
                if let Some(np) = self.now_playing.clone() {
                    self.play(&np.url);
                }
            }
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn seek_to(&mut self, ms: i64) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        let mut target = ms.max(0);
        if self.duration_ms > 0 {
            target = target.min(self.duration_ms);
        }
        self.engine.seek(target);
        self.position_ms = target;
    }

    pub fn seek_by(&mut self, delta_ms: i64) {
        self.seek_to(self.position_ms.saturating_add(delta_ms));
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, self.max_volume);
        self.engine.set_volume(self.volume);
    }

    pub fn volume_up(&mut self) {
        self.set_volume(self.volume + self.volume_step);
    }

    pub fn volume_down(&mut self) {
        self.set_volume(self.volume - self.volume_step);
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        let speed = (self.speed + delta).clamp(MIN_SPEED, MAX_SPEED);
        self.engine.set_speed(speed);
    }

    pub fn reset_speed(&mut self) {
        self.engine.set_speed(1.0);
    }

    /// Enable or disable repeating; takes effect on the engine immediately.
    pub fn toggle_repeat(&mut self, enabled: bool) {
        self.repeat_enabled = enabled;
        self.engine
            .set_repeat(if enabled { self.repeat_max } else { 0 });
    }

    pub fn set_repeat_max(&mut self, count: i32) {
        self.repeat_max = count.max(-1);
        if self.repeat_enabled {
            self.engine.set_repeat(self.repeat_max);
        }
    }

    /// Limit playback to `start_ms..stop_ms` (0 stop = media end, negative
    /// values count from the end).
    pub fn set_repeat_range(&mut self, start_ms: i64, stop_ms: i64) {
        self.repeat_range = (start_ms, stop_ms);
        self.engine.set_start_position(start_ms);
        self.engine.set_stop_position(stop_ms);
    }

    /// Switch to the next audio stream. Returns false when there is only one.
    pub fn cycle_audio_stream(&mut self) -> bool {
        let count = self.engine.audio_stream_count();
        if count <= 1 {
            return false;
        }
        let next = (self.engine.current_audio_stream().max(0) + 1) % count;
        self.engine.set_audio_stream(next, true)
    }

    /// Choose decoders by name; applied before the next play.
    pub fn set_decoder_names<S: AsRef<str>>(&mut self, names: &[S]) {
        self.decoder_priority = priority_from_names(names);
    }

    /// Set the rating of an entry, mirrored to the other list's entry for the
    /// same url.
    pub fn rate(&mut self, kind: ListKind, index: usize, stars: i32) -> Result<()> {
        let url = self.list(kind).item_at(index)?.url().to_string();
        let stars = stars.clamp(0, MAX_STARS);
        self.update_entries(&url, |item| item.set_stars(stars));
        Ok(())
    }

    /// Append `item` to the playlist, replacing an older entry for the same url.
    pub fn add_to_playlist(&mut self, item: PlayListItem) {
        self.playlist.append_unique(item);
    }

    /// Copy the currently playing media into the playlist.
    pub fn add_current_to_playlist(&mut self) -> bool {
        let Some(np) = self.now_playing.as_ref() else {
            return false;
        };
        let item = self.history.find(&np.url).cloned().unwrap_or_else(|| {
            let mut item = PlayListItem::new(np.url.clone());
            item.set_title(np.title.clone());
            item
        });
        self.playlist.append_unique(item);
        true
    }

    pub fn remove_at(&mut self, kind: ListKind, index: usize) -> Result<PlayListItem> {
        self.list_mut(kind).remove_at(index)
    }

    /// Save both lists. Both are attempted; the first failure is returned.
    pub fn save(&self) -> Result<()> {
        let history = self.history.save();
        let playlist = self.playlist.save();
        history.and(playlist)
    }

    /// Record the resume position and persist both lists. Failures are logged.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.remember_position();
        for (name, result) in [("history", self.history.save()), ("playlist", self.playlist.save())]
        {
            match result {
                Ok(()) => {}
                Err(PlaylistError::NoSaveFile) => log::debug!("{name} has no save file"),
                Err(e) => log::error!("failed to save {name}: {e}"),
            }
        }
        self.closed = true;
    }

    pub fn list(&self, kind: ListKind) -> &PlayList {
        match kind {
            ListKind::Playlist => &self.playlist,
            ListKind::History => &self.history,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut PlayList {
        match kind {
            ListKind::Playlist => &mut self.playlist,
            ListKind::History => &mut self.history,
        }
    }

    pub fn playlist(&self) -> &PlayList {
        &self.playlist
    }

    pub fn history(&self) -> &PlayList {
        &self.history
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn position_ms(&self) -> i64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }

    pub fn repeat_max(&self) -> i32 {
        self.repeat_max
    }

    pub fn repeat_range(&self) -> (i64, i64) {
        self.repeat_range
    }

    pub fn decoder_priority(&self) -> &[VideoDecoderId] {
        &self.decoder_priority
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<E: PlaybackEngine> Drop for Session<E> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Position worth resuming from; 0 once playback reached the end.
fn resume_point(position_ms: i64, duration_ms: i64) -> i64 {
    if position_ms <= 0 || (duration_ms > 0 && position_ms + FINISHED_MARGIN_MS >= duration_ms) {
        0
    } else {
        position_ms
    }
}

fn log_load(name: &str, outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Missing => log::info!("{name}: starting empty"),
        LoadOutcome::Unreadable => log::warn!("{name}: unreadable, starting empty"),
        LoadOutcome::Loaded { items } => log::info!("{name}: {items} entries"),
        LoadOutcome::Recovered { items, discarded } => {
            log::warn!("{name}: recovered {items} entries, dropped {discarded} damaged lines")
        }
    }
}

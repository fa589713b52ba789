use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::decoder::VideoDecoderId;
use crate::error::PlaybackError;

use super::sink::{create_sink_at, local_path, probe_duration};
use super::types::{
    EngineCmd, EngineEvent, PlaybackHandle, PlaybackInfo, resolve_start_position,
    resolve_stop_position, should_repeat,
};

/// Position updates and end-of-media checks run at this interval.
const TICK: Duration = Duration::from_millis(200);

/// The media currently loaded in the audio thread.
struct Current {
    url: String,
    path: PathBuf,
    sink: Sink,
    /// Media position at which `sink` started.
    offset: Duration,
    /// Wall time played by `sink` before the last pause.
    accumulated: Duration,
    /// `None` while paused.
    started_at: Option<Instant>,
    duration: Option<Duration>,
}

impl Current {
    fn position(&self, speed: f32) -> Duration {
        let played = self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        let pos = self.offset + played.mul_f32(speed);
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn paused(&self) -> bool {
        self.started_at.is_none()
    }

    fn duration_ms(&self) -> i64 {
        self.duration.map_or(0, to_ms)
    }
}

struct AudioThread {
    stream: Option<OutputStream>,
    events: Sender<EngineEvent>,
    info: PlaybackHandle,
    current: Option<Current>,
    volume: f32,
    speed: f32,
    repeat: i32,
    current_repeat: i32,
    start_ms: i64,
    stop_ms: i64,
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    events: Sender<EngineEvent>,
    info: PlaybackHandle,
    volume: f32,
    speed: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when the stream is dropped, which garbles the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                log::error!("no audio output device: {e}");
                let _ = events.send(EngineEvent::Error(PlaybackError::NoOutputDevice(
                    e.to_string(),
                )));
                None
            }
        };

        let mut audio = AudioThread {
            stream,
            events,
            info,
            current: None,
            volume,
            speed,
            repeat: 0,
            current_repeat: 0,
            start_ms: 0,
            stop_ms: 0,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(EngineCmd::Quit) => {
                    if let Some(cur) = audio.current.take() {
                        cur.sink.stop();
                    }
                    audio.publish();
                    break;
                }
                Ok(cmd) => audio.handle(cmd),
                Err(RecvTimeoutError::Timeout) => audio.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("audio thread finished");
    })
}

impl AudioThread {
    fn handle(&mut self, cmd: EngineCmd) {
        match cmd {
            EngineCmd::Play(url) => self.play(url),
            EngineCmd::Stop => self.stop(),
            EngineCmd::Pause(p) => self.pause(p),
            EngineCmd::Seek(ms) => self.seek(ms),
            EngineCmd::SetVolume(v) => {
                self.volume = v;
                if let Some(cur) = &self.current {
                    cur.sink.set_volume(v);
                }
            }
            EngineCmd::SetSpeed(s) => self.set_speed(s),
            EngineCmd::SetRepeat(n) => {
                self.repeat = n;
                self.publish();
            }
            EngineCmd::SetStartPosition(ms) => self.start_ms = ms,
            EngineCmd::SetStopPosition(ms) => self.stop_ms = ms,
            EngineCmd::SetPriority(p) => {
                // Audio decoding goes through rodio; the priority only matters
                // to video-capable engines.
                log::debug!("decoder priority: {}", describe_priority(&p));
            }
            EngineCmd::Quit => {}
        }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        let snapshot = PlaybackInfo {
            url: self.current.as_ref().map(|c| c.url.clone()),
            paused: self.current.as_ref().is_some_and(Current::paused),
            position_ms: self
                .current
                .as_ref()
                .map_or(0, |c| to_ms(c.position(self.speed))),
            duration_ms: self.current.as_ref().map_or(0, Current::duration_ms),
            repeat: self.repeat,
            current_repeat: self.current_repeat,
        };
        if let Ok(mut info) = self.info.lock() {
            *info = snapshot;
        }
    }

    fn play(&mut self, url: String) {
        // Replacing media is not a stop from the host's point of view.
        if let Some(cur) = self.current.take() {
            cur.sink.stop();
        }
        self.current_repeat = 0;

        let result = local_path(&url).and_then(|path| {
            let duration = probe_duration(&path);
            self.start_pass(url.clone(), path, duration)
        });
        self.publish();

        match result {
            Ok(()) => {
                log::info!("playing {url}");
                self.emit(EngineEvent::Started);
            }
            Err(e) => {
                log::warn!("cannot play {url}: {e}");
                self.emit(EngineEvent::Error(e));
            }
        }
    }

    fn start_pass(
        &mut self,
        url: String,
        path: PathBuf,
        duration: Option<Duration>,
    ) -> Result<(), PlaybackError> {
        let known_ms = duration.map_or(0, to_ms);
        let start = from_ms(resolve_start_position(self.start_ms, known_ms));

        let stream = self.stream.as_ref().ok_or_else(|| {
            PlaybackError::NoOutputDevice("output stream unavailable".to_string())
        })?;
        let (sink, total) = create_sink_at(stream, &path, start)?;
        sink.set_volume(self.volume);
        sink.set_speed(self.speed);
        sink.play();

        self.current = Some(Current {
            url,
            path,
            sink,
            offset: start,
            accumulated: Duration::ZERO,
            started_at: Some(Instant::now()),
            duration: duration.or(total),
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(cur) = self.current.take() else {
            return;
        };
        cur.sink.stop();
        self.current_repeat = 0;
        self.publish();
        self.emit(EngineEvent::Stopped);
    }

    fn pause(&mut self, paused: bool) {
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        if cur.paused() == paused {
            return;
        }
        if paused {
            cur.sink.pause();
            if let Some(st) = cur.started_at.take() {
                cur.accumulated += st.elapsed();
            }
        } else {
            cur.sink.play();
            cur.started_at = Some(Instant::now());
        }
        self.publish();
        self.emit(EngineEvent::Paused(paused));
    }

    fn seek(&mut self, ms: i64) {
        let Some(cur) = self.current.take() else {
            return;
        };
        let mut target = from_ms(ms);
        if let Some(d) = cur.duration {
            target = target.min(d);
        }
        let was_paused = cur.paused();
        cur.sink.stop();

        // Rebuild the sink and skip into the file.
        let Some(stream) = self.stream.as_ref() else {
            return;
        };
        match create_sink_at(stream, &cur.path, target) {
            Ok((sink, _)) => {
                sink.set_volume(self.volume);
                sink.set_speed(self.speed);
                if !was_paused {
                    sink.play();
                }
                self.current = Some(Current {
                    sink,
                    offset: target,
                    accumulated: Duration::ZERO,
                    started_at: (!was_paused).then(Instant::now),
                    ..cur
                });
                self.publish();
                self.emit(EngineEvent::PositionChanged(to_ms(target)));
            }
            Err(e) => {
                log::warn!("seek failed for {}: {e}", cur.url);
                self.current_repeat = 0;
                self.publish();
                self.emit(EngineEvent::Error(e));
                self.emit(EngineEvent::Stopped);
            }
        }
    }

    fn set_speed(&mut self, speed: f32) {
        let old = self.speed;
        self.speed = speed;
        if let Some(cur) = self.current.as_mut() {
            // Fold the time played at the old speed into the offset.
            let pos = cur.position(old);
            cur.offset = pos;
            cur.accumulated = Duration::ZERO;
            if cur.started_at.is_some() {
                cur.started_at = Some(Instant::now());
            }
            cur.sink.set_speed(speed);
        }
        self.publish();
        self.emit(EngineEvent::SpeedChanged(speed));
    }

    fn tick(&mut self) {
        let Some(cur) = self.current.as_ref() else {
            return;
        };
        if cur.paused() {
            return;
        }

        let pos = to_ms(cur.position(self.speed));
        let stop_at = resolve_stop_position(self.stop_ms, cur.duration_ms());
        let ended = cur.sink.empty() || stop_at.is_some_and(|s| pos >= s);

        self.publish();
        self.emit(EngineEvent::PositionChanged(pos));

        if ended {
            self.finish_pass();
        }
    }

    fn finish_pass(&mut self) {
        if !should_repeat(self.repeat, self.current_repeat) {
            self.stop();
            return;
        }

        let Some(cur) = self.current.take() else {
            return;
        };
        cur.sink.stop();
        self.current_repeat += 1;
        log::debug!("repeat {}/{} of {}", self.current_repeat, self.repeat, cur.url);

        if let Err(e) = self.start_pass(cur.url, cur.path, cur.duration) {
            log::warn!("repeat failed: {e}");
            self.current_repeat = 0;
            self.publish();
            self.emit(EngineEvent::Error(e));
            self.emit(EngineEvent::Stopped);
            return;
        }
        self.publish();
    }
}

fn describe_priority(p: &[VideoDecoderId]) -> String {
    if p.is_empty() {
        return "default".to_string();
    }
    p.iter().map(|id| id.name()).collect::<Vec<_>>().join(", ")
}

fn to_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

fn from_ms(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

//! A single playable entry of a playlist or of the history.
//!
//! `PlayListItem` is a plain value: the url identifies the entry, the rest is
//! user/session metadata (rating, resume position, known duration).

use std::path::Path;

use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One media reference plus its rating, resume position and duration.
///
/// Field order is the persisted record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayListItem {
    url: String,
    title: String,
    stars: i32,
    last_time: i64,
    duration: i64,
}

impl PlayListItem {
    /// Create an item for `url`, deriving the title from it.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let title = title_from_url(&url);
        Self {
            url,
            title,
            ..Self::default()
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn stars(&self) -> i32 {
        self.stars
    }
    pub fn set_stars(&mut self, stars: i32) {
        self.stars = stars;
    }

    /// Last playback position in milliseconds.
    pub fn last_time(&self) -> i64 {
        self.last_time
    }
    pub fn set_last_time(&mut self, ms: i64) {
        self.last_time = ms;
    }

    /// Total media length in milliseconds, 0 while unknown.
    pub fn duration(&self) -> i64 {
        self.duration
    }
    pub fn set_duration(&mut self, ms: i64) {
        self.duration = ms;
    }

    pub fn last_time_string(&self) -> String {
        format_hms(self.last_time)
    }

    pub fn duration_string(&self) -> String {
        format_hms(self.duration)
    }
}

/// Format milliseconds as a zero-padded `HH:mm:ss` time of day.
///
/// Values wrap at 24h; negative values count back from midnight.
pub fn format_hms(ms: i64) -> String {
    let secs = ms.rem_euclid(MS_PER_DAY) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

/// True when `url` points at a network resource rather than a local file.
pub fn is_network_url(url: &str) -> bool {
    url.contains("://") && !url.starts_with("file://")
}

/// Default display title for `url`: the file name for local media, the url itself
/// for network streams.
pub fn title_from_url(url: &str) -> String {
    if is_network_url(url) {
        return url.to_string();
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string())
}

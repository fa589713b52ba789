//! Video decoder identifiers and priority selection.
//!
//! Decoders are a closed set, registered in a fixed order. Configuration names
//! them by string; `priority_from_names` maps those names back to ids.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoDecoderId {
    FFmpeg,
    FFmpegDxva,
    FFmpegVaapi,
    FFmpegVdpau,
    FFmpegVda,
    Cuda,
}

/// Registration order and display names.
const REGISTRY: &[(VideoDecoderId, &str)] = &[
    (VideoDecoderId::FFmpeg, "FFmpeg"),
    (VideoDecoderId::FFmpegDxva, "DXVA"),
    (VideoDecoderId::FFmpegVaapi, "VAAPI"),
    (VideoDecoderId::FFmpegVdpau, "VDPAU"),
    (VideoDecoderId::FFmpegVda, "VDA"),
    (VideoDecoderId::Cuda, "CUDA"),
];

impl VideoDecoderId {
    /// All registered ids, in registration order.
    pub fn all() -> impl Iterator<Item = VideoDecoderId> {
        REGISTRY.iter().map(|(id, _)| *id)
    }

    pub fn name(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        REGISTRY
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}

impl fmt::Display for VideoDecoderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve configured decoder names to ids.
///
/// The result keeps registration order regardless of the order of `names`;
/// unknown names are ignored.
pub fn priority_from_names<S: AsRef<str>>(names: &[S]) -> Vec<VideoDecoderId> {
    let wanted: Vec<String> = names
        .iter()
        .map(|n| n.as_ref().trim().to_ascii_lowercase())
        .collect();

    VideoDecoderId::all()
        .filter(|id| wanted.iter().any(|w| *w == id.name().to_ascii_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_case_insensitively() {
        for id in VideoDecoderId::all() {
            assert_eq!(VideoDecoderId::from_name(id.name()), Some(id));
            assert_eq!(
                VideoDecoderId::from_name(&id.name().to_lowercase()),
                Some(id)
            );
        }
        assert_eq!(VideoDecoderId::from_name("opengl"), None);
    }

    #[test]
    fn priority_keeps_registration_order_and_skips_unknown() {
        let p = priority_from_names(&["cuda", "bogus", "ffmpeg", "VAAPI"]);
        assert_eq!(
            p,
            vec![
                VideoDecoderId::FFmpeg,
                VideoDecoderId::FFmpegVaapi,
                VideoDecoderId::Cuda
            ]
        );
        assert!(priority_from_names::<&str>(&[]).is_empty());
    }
}

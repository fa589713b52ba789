use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::item::{PlayListItem, is_network_url};

fn make_title(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build an item for a local file, taking title and duration from its tags
/// when they can be read.
pub fn item_for_file(path: &Path) -> PlayListItem {
    let url = path.to_string_lossy().into_owned();
    let mut item = PlayListItem::new(url);

    if let Ok(tagged) = lofty::read_from_path(path) {
        let duration = tagged.properties().duration();
        item.set_duration(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX));

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            let title = tag.title().map(|t| t.trim().to_string());
            if let Some(title) = title.filter(|t| !t.is_empty()) {
                let artist = tag.artist().map(|a| a.to_string());
                item.set_title(make_title(&title, artist.as_deref()));
            }
        }
    }
    item
}

/// Collect audio files under `dir` as playlist items, sorted by title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<PlayListItem> {
    let mut items: Vec<PlayListItem> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            items.push(item_for_file(path));
        }
    }

    items.sort_by(|a, b| a.title().to_lowercase().cmp(&b.title().to_lowercase()));
    items
}

/// Expand one command-line argument: directories are scanned, files and urls
/// become a single item.
pub fn import(arg: &str, settings: &LibrarySettings) -> Vec<PlayListItem> {
    if is_network_url(arg) {
        return vec![PlayListItem::new(arg)];
    }

    let path = Path::new(arg.strip_prefix("file://").unwrap_or(arg));
    if path.is_dir() {
        let items = scan(path, settings);
        log::info!("imported {} files from {}", items.len(), path.display());
        items
    } else if path.is_file() {
        vec![item_for_file(path)]
    } else {
        log::warn!("skipping {arg}: no such file or directory");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn make_title_prefers_artist_dash_title() {
        assert_eq!(make_title("Song", Some("Artist")), "Artist - Song");
        assert_eq!(make_title("Song", Some("  Artist  ")), "Artist - Song");
        assert_eq!(make_title("Song", None), "Song");
        assert_eq!(make_title("Song", Some("   ")), "Song");
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_title_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let items = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title(), "A.ogg");
        assert_eq!(items[1].title(), "b.MP3");
        assert_eq!(items[0].duration(), 0);
        assert!(items[0].url().ends_with("A.ogg"));
    }

    #[test]
    fn scan_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let items = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "visible.mp3");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let items = scan(dir.path(), &settings);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "root.mp3");
    }
}

//! On-disk encoding of a playlist.
//!
//! JSON Lines: a header line carrying the format tag and version, then one record
//! per line in list order. A torn write can only damage the trailing record, and
//! decoding stops at the first record it cannot read.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlaylistError, Result};
use crate::item::PlayListItem;

pub(super) const FORMAT: &str = "reprise-playlist";
pub(super) const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format: String,
    version: u32,
}

/// Records recovered from a store file.
#[derive(Debug)]
pub(super) struct Decoded {
    pub items: Vec<PlayListItem>,
    /// Non-empty lines dropped at and after the first unreadable record.
    pub discarded: usize,
}

/// Serialize `items` with a header into a single buffer.
pub(super) fn encode(items: &[PlayListItem]) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec(&Header {
        format: FORMAT.to_string(),
        version: VERSION,
    })?;
    buf.push(b'\n');
    for item in items {
        serde_json::to_writer(&mut buf, item)?;
        buf.push(b'\n');
    }
    Ok(buf)
}

/// Decode a store file. `None` means the header is missing, foreign or from a
/// newer version.
pub(super) fn decode(bytes: &[u8]) -> Option<Decoded> {
    let mut lines = bytes
        .split(|&b| b == b'\n')
        .map(trim_line)
        .filter(|l| !l.is_empty());

    let header: Header = serde_json::from_slice(lines.next()?).ok()?;
    if header.format != FORMAT || header.version == 0 || header.version > VERSION {
        return None;
    }

    let mut items = Vec::new();
    let mut discarded = 0;
    for line in lines.by_ref() {
        match serde_json::from_slice::<PlayListItem>(line) {
            Ok(item) => items.push(item),
            Err(_) => {
                discarded = 1;
                break;
            }
        }
    }
    discarded += lines.count();

    Some(Decoded { items, discarded })
}

/// Replace `path` with the encoded list through a synced sibling temp file.
pub(super) fn write(path: &Path, items: &[PlayListItem]) -> Result<()> {
    let buf = encode(items)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PlaylistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp = temp_path(path);
    let io_err = |source| PlaylistError::Io {
        path: tmp.clone(),
        source,
    };
    let mut file = File::create(&tmp).map_err(io_err)?;
    file.write_all(&buf).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(&tmp, path).map_err(|source| PlaylistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn trim_line(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> PlayListItem {
        PlayListItem::new(url)
    }

    #[test]
    fn encode_writes_header_then_one_record_per_line() {
        let mut a = item("/m/a.mp3");
        a.set_stars(3);
        a.set_duration(1_000);
        let buf = encode(&[a, item("/m/b.mp3")]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"format":"reprise-playlist","version":1}"#);
        assert_eq!(
            lines[1],
            r#"{"url":"/m/a.mp3","title":"a.mp3","stars":3,"last_time":0,"duration":1000}"#
        );
    }

    #[test]
    fn decode_rejects_foreign_and_newer_headers() {
        assert!(decode(b"").is_none());
        assert!(decode(b"not json\n").is_none());
        assert!(decode(b"{\"format\":\"other\",\"version\":1}\n").is_none());
        assert!(decode(b"{\"format\":\"reprise-playlist\",\"version\":2}\n").is_none());
    }

    #[test]
    fn decode_stops_at_first_unreadable_record() {
        let mut buf = encode(&[item("a"), item("b")]).unwrap();
        buf.extend_from_slice(b"{\"url\":\"c\",\"tit");
        buf.extend_from_slice(b"\n");
        buf.extend_from_slice(&serde_json::to_vec(&item("d")).unwrap());

        let decoded = decode(&buf).unwrap();
        let urls: Vec<&str> = decoded.items.iter().map(|i| i.url()).collect();
        assert_eq!(urls, vec!["a", "b"]);
        assert_eq!(decoded.discarded, 2);
    }

    #[test]
    fn decode_accepts_crlf_line_endings() {
        let text = "{\"format\":\"reprise-playlist\",\"version\":1}\r\n\
                    {\"url\":\"a\",\"title\":\"A\",\"stars\":1,\"last_time\":2,\"duration\":3}\r\n";
        let decoded = decode(text.as_bytes()).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].title(), "A");
        assert_eq!(decoded.discarded, 0);
    }

    #[test]
    fn write_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.jsonl");
        write(&path, &[item("a")]).unwrap();
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }
}

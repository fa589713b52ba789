use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PlaylistError, Result};
use crate::item::PlayListItem;

use super::store;

/// What `PlayList::load` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No save file configured, or the file does not exist yet.
    Missing,
    /// The file exists but could not be read or has no valid header.
    Unreadable,
    /// Every record was read.
    Loaded { items: usize },
    /// Reading stopped at a damaged record; later lines were dropped.
    Recovered { items: usize, discarded: usize },
}

/// An ordered list of items, optionally capped, backed by a save file.
///
/// Call `load()` before using the list: mutations made before it operate on an
/// empty list and are replaced by whatever `load()` reads.
#[derive(Debug, Default)]
pub struct PlayList {
    items: Vec<PlayListItem>,
    max_rows: Option<usize>,
    save_file: Option<PathBuf>,
    loaded: bool,
}

impl PlayList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row cap. The cap is enforced on the next insert, not here.
    pub fn set_max_rows(&mut self, max_rows: Option<usize>) {
        self.max_rows = max_rows;
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    /// Set the persistence target without loading or saving.
    pub fn set_save_file(&mut self, path: impl Into<PathBuf>) {
        self.save_file = Some(path.into());
    }

    pub fn save_file(&self) -> Option<&Path> {
        self.save_file.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the in-memory list with the contents of the save file.
    ///
    /// Never fails: a missing or unreadable file yields an empty list, a damaged
    /// file keeps the records before the first damaged one.
    pub fn load(&mut self) -> LoadOutcome {
        self.loaded = true;
        self.items.clear();

        let Some(path) = self.save_file.as_deref() else {
            log::warn!("playlist load requested without a save file");
            return LoadOutcome::Missing;
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no playlist at {}, starting empty", path.display());
                return LoadOutcome::Missing;
            }
            Err(e) => {
                log::warn!("failed to read playlist {}: {e}", path.display());
                return LoadOutcome::Unreadable;
            }
        };

        let Some(decoded) = store::decode(&bytes) else {
            log::warn!(
                "{} is not a readable playlist, starting empty",
                path.display()
            );
            return LoadOutcome::Unreadable;
        };

        self.items = decoded.items;
        let items = self.items.len();
        if decoded.discarded > 0 {
            log::warn!(
                "recovered {items} items from {}, dropped {} damaged lines",
                path.display(),
                decoded.discarded
            );
            LoadOutcome::Recovered {
                items,
                discarded: decoded.discarded,
            }
        } else {
            log::debug!("loaded {items} items from {}", path.display());
            LoadOutcome::Loaded { items }
        }
    }

    /// Overwrite the save file with the whole list.
    pub fn save(&self) -> Result<()> {
        let path = self.save_file.as_deref().ok_or(PlaylistError::NoSaveFile)?;
        store::write(path, &self.items)?;
        log::debug!("saved {} items to {}", self.items.len(), path.display());
        Ok(())
    }

    /// Insert `item` at `index` (`index <= len`), then drop tail entries beyond
    /// the row cap.
    pub fn insert_item_at(&mut self, item: PlayListItem, index: usize) -> Result<()> {
        if index > self.items.len() {
            return Err(self.out_of_range(index));
        }
        self.items.insert(index, item);
        if let Some(max) = self.max_rows {
            self.items.truncate(max);
        }
        Ok(())
    }

    /// Remove every entry whose url equals `url`. Returns how many were removed.
    pub fn remove(&mut self, url: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i.url() != url);
        before - self.items.len()
    }

    pub fn remove_at(&mut self, index: usize) -> Result<PlayListItem> {
        if index >= self.items.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn item_at(&self, index: usize) -> Result<&PlayListItem> {
        self.items
            .get(index)
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn set_item_at(&mut self, item: PlayListItem, index: usize) -> Result<()> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(PlaylistError::IndexOutOfRange { index, len }),
        }
    }

    /// Move `item` to the front, dropping any older entry with the same url.
    pub fn insert_front_unique(&mut self, item: PlayListItem) {
        self.remove(item.url());
        self.items.insert(0, item);
        if let Some(max) = self.max_rows {
            self.items.truncate(max);
        }
    }

    /// Put `item` at the end, dropping any older entry with the same url.
    ///
    /// With a row cap the oldest entries, at the front, are evicted.
    pub fn append_unique(&mut self, item: PlayListItem) {
        self.remove(item.url());
        self.items.push(item);
        if let Some(max) = self.max_rows {
            let excess = self.items.len().saturating_sub(max);
            self.items.drain(..excess);
        }
    }

    pub fn position(&self, url: &str) -> Option<usize> {
        self.items.iter().position(|i| i.url() == url)
    }

    pub fn find(&self, url: &str) -> Option<&PlayListItem> {
        self.items.iter().find(|i| i.url() == url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PlayListItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayListItem> {
        self.items.iter()
    }

    fn out_of_range(&self, index: usize) -> PlaylistError {
        PlaylistError::IndexOutOfRange {
            index,
            len: self.items.len(),
        }
    }
}

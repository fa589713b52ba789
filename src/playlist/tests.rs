use super::*;
use crate::error::PlaylistError;
use crate::item::PlayListItem;
use std::fs;
use tempfile::tempdir;

fn item(url: &str) -> PlayListItem {
    PlayListItem::new(url)
}

fn urls(list: &PlayList) -> Vec<&str> {
    list.iter().map(|i| i.url()).collect()
}

fn history_in(dir: &std::path::Path) -> PlayList {
    let mut list = PlayList::new();
    list.set_max_rows(Some(20));
    list.set_save_file(dir.join("history.jsonl"));
    list
}

#[test]
fn item_at_returns_what_was_inserted() {
    let mut list = PlayList::new();
    let mut a = item("/m/a.mp4");
    a.set_stars(4);
    a.set_last_time(12_000);
    a.set_duration(60_000);
    list.insert_item_at(a.clone(), 0).unwrap();
    list.insert_item_at(item("/m/b.mp4"), 1).unwrap();

    assert_eq!(list.item_at(0).unwrap(), &a);
    assert_eq!(list.item_at(1).unwrap().url(), "/m/b.mp4");
}

#[test]
fn inserting_at_front_reverses_insertion_order() {
    let mut list = PlayList::new();
    for u in ["a.mp4", "b.mp4", "c.mp4"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    assert_eq!(urls(&list), vec!["c.mp4", "b.mp4", "a.mp4"]);
}

#[test]
fn remove_then_insert_keeps_a_single_entry_at_front() {
    let mut list = PlayList::new();
    for u in ["a", "b", "c"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    assert_eq!(list.remove("a"), 1);
    list.insert_item_at(item("a"), 0).unwrap();

    assert_eq!(urls(&list), vec!["a", "c", "b"]);
    assert_eq!(list.iter().filter(|i| i.url() == "a").count(), 1);
}

#[test]
fn remove_matches_urls_exactly() {
    let mut list = PlayList::new();
    list.insert_item_at(item("/m/A.mp3"), 0).unwrap();
    list.insert_item_at(item("/m/a.mp3"), 0).unwrap();
    assert_eq!(list.remove("/m/a.MP3"), 0);
    assert_eq!(list.remove("/m/a.mp3"), 1);
    assert_eq!(urls(&list), vec!["/m/A.mp3"]);
}

#[test]
fn insert_front_unique_is_the_dedup_law() {
    let mut list = PlayList::new();
    list.insert_front_unique(item("x"));
    list.insert_front_unique(item("y"));
    list.insert_front_unique(item("x"));
    assert_eq!(urls(&list), vec!["x", "y"]);
}

#[test]
fn append_unique_moves_existing_entry_to_the_end() {
    let mut list = PlayList::new();
    list.append_unique(item("x"));
    list.append_unique(item("y"));
    list.append_unique(item("x"));
    assert_eq!(urls(&list), vec!["y", "x"]);
}

#[test]
fn append_unique_with_a_cap_evicts_from_the_front() {
    let mut list = PlayList::new();
    list.set_max_rows(Some(2));
    for u in ["a", "b", "c"] {
        list.append_unique(item(u));
    }
    assert_eq!(urls(&list), vec!["b", "c"]);
}

#[test]
fn max_rows_two_evicts_the_oldest() {
    let mut list = PlayList::new();
    list.set_max_rows(Some(2));
    for u in ["a", "b", "c"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    assert_eq!(urls(&list), vec!["c", "b"]);
}

#[test]
fn history_cap_holds_at_twenty() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    for n in 0..35 {
        list.insert_item_at(item(&format!("track-{n}")), 0).unwrap();
        assert!(list.len() <= 20);
    }
    assert_eq!(list.len(), 20);
    assert_eq!(list.item_at(0).unwrap().url(), "track-34");
    assert_eq!(list.item_at(19).unwrap().url(), "track-15");
}

#[test]
fn set_max_rows_is_enforced_on_next_insert_only() {
    let mut list = PlayList::new();
    for u in ["a", "b", "c", "d"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    list.set_max_rows(Some(2));
    assert_eq!(list.len(), 4);

    list.insert_item_at(item("e"), 0).unwrap();
    assert_eq!(urls(&list), vec!["e", "d"]);
}

#[test]
fn out_of_range_access_is_an_error() {
    let mut list = PlayList::new();
    list.insert_item_at(item("a"), 0).unwrap();

    assert!(matches!(
        list.item_at(1),
        Err(PlaylistError::IndexOutOfRange { index: 1, len: 1 })
    ));
    assert!(matches!(
        list.set_item_at(item("b"), 3),
        Err(PlaylistError::IndexOutOfRange { index: 3, len: 1 })
    ));
    assert!(matches!(
        list.insert_item_at(item("c"), 5),
        Err(PlaylistError::IndexOutOfRange { index: 5, len: 1 })
    ));
    assert!(list.remove_at(1).is_err());
    assert_eq!(urls(&list), vec!["a"]);
}

#[test]
fn set_item_at_replaces_in_place() {
    let mut list = PlayList::new();
    list.insert_item_at(item("a"), 0).unwrap();
    let mut updated = list.item_at(0).unwrap().clone();
    updated.set_duration(42_000);
    list.set_item_at(updated, 0).unwrap();
    assert_eq!(list.item_at(0).unwrap().duration(), 42_000);
}

#[test]
fn save_then_load_reproduces_order_and_fields() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    for u in ["a.mp4", "b.mp4", "c.mp4"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    let mut rated = list.item_at(1).unwrap().clone();
    rated.set_stars(5);
    rated.set_last_time(7_000);
    rated.set_duration(90_000);
    list.set_item_at(rated, 1).unwrap();
    list.save().unwrap();

    let mut reloaded = history_in(dir.path());
    let outcome = reloaded.load();
    assert_eq!(outcome, LoadOutcome::Loaded { items: 3 });
    assert_eq!(reloaded.items(), list.items());
    assert_eq!(urls(&reloaded), vec!["c.mp4", "b.mp4", "a.mp4"]);
}

#[test]
fn round_trip_holds_for_empty_and_longer_lists() {
    let dir = tempdir().unwrap();
    for n in [0usize, 1, 7, 20] {
        let mut list = PlayList::new();
        list.set_save_file(dir.path().join(format!("list-{n}.jsonl")));
        for i in 0..n {
            let mut it = item(&format!("/m/{i}.ogg"));
            it.set_title(format!("Track \"{i}\"\n"));
            it.set_stars(i as i32);
            list.insert_item_at(it, 0).unwrap();
        }
        list.save().unwrap();

        let mut reloaded = PlayList::new();
        reloaded.set_save_file(dir.path().join(format!("list-{n}.jsonl")));
        reloaded.load();
        assert_eq!(reloaded.items(), list.items());
    }
}

#[test]
fn load_twice_yields_the_same_list() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    list.insert_item_at(item("a"), 0).unwrap();
    list.insert_item_at(item("b"), 0).unwrap();
    list.save().unwrap();

    let mut reloaded = history_in(dir.path());
    let first = reloaded.load();
    let snapshot = reloaded.items().to_vec();
    let second = reloaded.load();
    assert_eq!(first, second);
    assert_eq!(reloaded.items(), snapshot.as_slice());
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    assert!(!list.is_loaded());
    assert_eq!(list.load(), LoadOutcome::Missing);
    assert!(list.is_loaded());
    assert!(list.is_empty());
}

#[test]
fn load_without_save_file_is_missing() {
    let mut list = PlayList::new();
    assert_eq!(list.load(), LoadOutcome::Missing);
    assert!(matches!(list.save(), Err(PlaylistError::NoSaveFile)));
}

#[test]
fn garbage_file_loads_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.jsonl");
    fs::write(&path, b"\x00\x01not a playlist at all").unwrap();

    let mut list = history_in(dir.path());
    assert_eq!(list.load(), LoadOutcome::Unreadable);
    assert!(list.is_empty());
}

#[test]
fn truncated_trailing_record_is_dropped() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    for u in ["a", "b", "c"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    list.save().unwrap();

    let path = dir.path().join("history.jsonl");
    let bytes = fs::read(&path).unwrap();
    // Cut the last record in half, as a crash mid-write would.
    fs::write(&path, &bytes[..bytes.len() - 20]).unwrap();

    let mut reloaded = history_in(dir.path());
    assert_eq!(
        reloaded.load(),
        LoadOutcome::Recovered {
            items: 2,
            discarded: 1
        }
    );
    assert_eq!(urls(&reloaded), vec!["c", "b"]);
}

#[test]
fn load_replaces_items_added_before_it() {
    let dir = tempdir().unwrap();
    let mut saved = history_in(dir.path());
    saved.insert_item_at(item("on-disk"), 0).unwrap();
    saved.save().unwrap();

    let mut list = history_in(dir.path());
    list.insert_item_at(item("early"), 0).unwrap();
    list.load();
    assert_eq!(urls(&list), vec!["on-disk"]);
}

#[test]
fn save_overwrites_previous_contents() {
    let dir = tempdir().unwrap();
    let mut list = history_in(dir.path());
    for u in ["a", "b", "c"] {
        list.insert_item_at(item(u), 0).unwrap();
    }
    list.save().unwrap();
    list.remove("b");
    list.save().unwrap();

    let mut reloaded = history_in(dir.path());
    reloaded.load();
    assert_eq!(urls(&reloaded), vec!["c", "a"]);
}

#[test]
fn save_to_unwritable_location_reports_io_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"file, not a dir").unwrap();

    let mut list = PlayList::new();
    list.set_save_file(blocker.join("history.jsonl"));
    list.insert_item_at(item("a"), 0).unwrap();
    assert!(matches!(list.save(), Err(PlaylistError::Io { .. })));
}

// Gallery scenarios: store, collection and viewer working together.

use super::*;
use crate::db::DbLocation;
use crate::store::memory::MemoryRepository;
use crate::store::{GeoFix, ImageStore};

/// SQLite store in memory, with one row per uri.
fn sqlite_gallery(uris: &[&str]) -> Gallery<ImageStore> {
    let store = ImageStore::open(DbLocation::Memory);
    store.initialize().unwrap();
    for uri in uris {
        store
            .insert(uri, Some(GeoFix { latitude: 1.0, longitude: 2.0 }), None, None)
            .unwrap();
    }
    let mut gallery = Gallery::new(store);
    assert!(gallery.load());
    gallery
}

fn loaded(uris: &[&str]) -> Gallery<MemoryRepository> {
    let mut gallery = Gallery::new(MemoryRepository::with_uris(uris));
    assert!(gallery.load());
    gallery
}

fn ids<R: ImageRepository>(gallery: &Gallery<R>) -> Vec<i64> {
    gallery.collection().ids().to_vec()
}

// ---------------------------------------------------------------
// Delete the middle record while viewing it
// ---------------------------------------------------------------
#[test]
fn test_delete_viewed_middle_record_shows_next() {
    let mut gallery = sqlite_gallery(&["one", "two", "three"]);
    assert_eq!(ids(&gallery), vec![1, 2, 3]);

    gallery.open_viewer(1);
    assert_eq!(gallery.current().unwrap().id, 2);

    assert!(gallery.remove_current());

    assert_eq!(gallery.viewer().state(), ViewerState::Open { index: 1 });
    assert_eq!(gallery.current().unwrap().id, 3);
    assert!(gallery.position().next_disabled);
    assert_eq!(gallery.position().slide_number, 2);
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery.repository().fetch_all().unwrap().len(), 2);
}

#[test]
fn test_delete_only_record_closes_viewer() {
    let mut gallery = sqlite_gallery(&["only"]);
    gallery.open_viewer(0);

    assert!(gallery.remove_current());

    assert_eq!(gallery.viewer().state(), ViewerState::Closed);
    assert!(gallery.is_empty());
    assert!(gallery.current().is_none());
}

#[test]
fn test_delete_viewed_last_record_moves_back() {
    let mut gallery = loaded(&["a", "b", "c"]);
    gallery.open_viewer(2);

    gallery.remove_current();

    assert_eq!(gallery.viewer().current_index(), Some(1));
    assert_eq!(gallery.current().unwrap().uri, "b");
    assert!(gallery.viewer().is_consistent(gallery.len()));
}

#[test]
fn test_delete_other_record_keeps_shown_photo() {
    let mut gallery = loaded(&["a", "b", "c"]);
    gallery.open_viewer(2);

    assert!(gallery.remove(1));

    assert_eq!(gallery.current().unwrap().uri, "c");
    assert_eq!(gallery.take_scroll(), Some(ScrollCommand::ToIndex { index: 1, animated: false }));
}

#[test]
fn test_delete_success_notice() {
    let mut gallery = loaded(&["a"]);
    gallery.remove(1);

    let notices = gallery.take_notices();
    assert_eq!(notices, vec![Notice::success("Image deleted successfully.")]);
    assert!(gallery.take_notices().is_empty(), "notices are drained once");
}

// ---------------------------------------------------------------
// Failure paths leave the screen untouched
// ---------------------------------------------------------------
#[test]
fn test_failed_delete_leaves_state_unchanged() {
    let mut gallery = loaded(&["a", "b"]);
    gallery.open_viewer(1);
    gallery.repository().fail_writes.set(true);

    assert!(!gallery.remove_current());

    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery.viewer().current_index(), Some(1));
    assert_eq!(gallery.repository().len(), 2);
    let notices = gallery.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Failed to delete the image.");
}

#[test]
fn test_failed_load_keeps_previous_collection() {
    let mut gallery = loaded(&["a", "b", "c"]);
    let before = ids(&gallery);

    gallery.repository().fail_reads.set(true);
    assert!(!gallery.refresh());

    assert_eq!(ids(&gallery), before);
    let notices = gallery.take_notices();
    assert_eq!(notices, vec![Notice::error("Failed to load gallery images.")]);
}

#[test]
fn test_failed_favorite_leaves_record_unchanged() {
    let mut gallery = loaded(&["a"]);
    gallery.open_viewer(0);
    gallery.repository().fail_writes.set(true);

    assert_eq!(gallery.toggle_favorite_current(), None);
    assert!(!gallery.current().unwrap().is_favorite);
    assert_eq!(gallery.take_notices()[0].level, NoticeLevel::Error);
}

// ---------------------------------------------------------------
// Loading
// ---------------------------------------------------------------
#[test]
fn test_empty_store_is_no_photos_state() {
    let mut gallery = sqlite_gallery(&[]);
    assert!(gallery.load());
    assert!(gallery.is_empty());
    assert!(gallery.take_notices().is_empty());
    assert_eq!(gallery.grid(4).empty_message.as_deref(), Some("No photos available."));
}

#[test]
fn test_refresh_after_capture_picks_up_new_row() {
    let mut gallery = loaded(&["a"]);
    let id = gallery.repository().insert("b", None, None, None).unwrap();

    assert!(gallery.on_captured(&crate::capture::CaptureEvent { id, uri: "b".to_string() }));
    assert_eq!(gallery.len(), 2);
}

#[test]
fn test_refresh_while_viewing_follows_record() {
    let mut gallery = loaded(&["a", "b", "c"]);
    gallery.open_viewer(2);
    // Another row disappears behind the gallery's back
    gallery.repository().delete_by_id(1).unwrap();

    gallery.refresh();

    assert_eq!(gallery.current().unwrap().uri, "c");
    assert_eq!(gallery.viewer().current_index(), Some(1));
}

#[test]
fn test_album_load_and_refresh_keep_filter() {
    let repo = MemoryRepository::new();
    repo.insert("a", None, None, Some("Trip")).unwrap();
    repo.insert("b", None, None, Some("Home")).unwrap();
    repo.insert("c", None, None, Some("Trip")).unwrap();
    let mut gallery = Gallery::new(repo);

    assert!(gallery.load_album("Trip"));
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery.album(), Some("Trip"));

    gallery.refresh();
    assert_eq!(gallery.len(), 2);

    gallery.load();
    assert_eq!(gallery.len(), 3);
    assert_eq!(gallery.album(), None);
}

// ---------------------------------------------------------------
// Viewer driven through the gallery
// ---------------------------------------------------------------
#[test]
fn test_swipe_then_buttons_agree() {
    let mut gallery = loaded(&["a", "b", "c", "d"]);
    gallery.open_viewer(0);

    gallery.scrolled(820.0, 400.0);
    assert_eq!(gallery.current().unwrap().uri, "c");

    gallery.next();
    assert_eq!(gallery.current().unwrap().uri, "d");
    assert!(gallery.position().next_disabled);
    assert_eq!(gallery.next(), None);

    gallery.previous();
    assert_eq!(gallery.position().slide_number, 3);
}

#[test]
fn test_close_then_info_is_none() {
    let mut gallery = loaded(&["a"]);
    gallery.open_viewer(0);
    assert_eq!(gallery.current_info().unwrap().uri, "a");

    gallery.close_viewer();
    assert!(gallery.current_info().is_none());
    assert_eq!(gallery.position().slide_number, 1);
}

#[test]
fn test_map_pin_for_current_record() {
    let mut gallery = sqlite_gallery(&["a"]);
    gallery.open_viewer(0);

    let pin = gallery.current_map_pin().unwrap();
    assert_eq!((pin.latitude, pin.longitude), (1.0, 2.0));
    assert!(pin.title.starts_with("Galleria_Img_"));
}

#[test]
fn test_toggle_favorite_roundtrip() {
    let mut gallery = sqlite_gallery(&["a"]);
    gallery.open_viewer(0);

    assert_eq!(gallery.toggle_favorite_current(), Some(true));
    assert!(gallery.repository().fetch_by_id(1).unwrap().unwrap().is_favorite);
    assert_eq!(gallery.toggle_favorite_current(), Some(false));
}

#[test]
fn test_scroll_failure_sets_offset_fallback() {
    let mut gallery = loaded(&["a", "b", "c"]);
    gallery.open_viewer(2);
    gallery.take_scroll();

    let cmd = gallery.scroll_failed(ScrollFailure { index: 2, average_item_length: 400.0 });

    assert_eq!(cmd, ScrollCommand::ToOffset { offset: 800.0, animated: true });
    assert_eq!(gallery.take_scroll(), Some(cmd));
}

#[test]
fn test_delete_sequence_keeps_viewer_consistent() {
    let mut gallery = loaded(&["a", "b", "c", "d", "e"]);
    gallery.open_viewer(3);

    while !gallery.is_empty() {
        if !gallery.viewer().is_open() {
            gallery.open_viewer(0);
        }
        gallery.remove_current();
        assert!(gallery.viewer().is_consistent(gallery.len()));
        assert_eq!(gallery.len(), gallery.repository().len());
    }
    assert_eq!(gallery.viewer().state(), ViewerState::Closed);
}

#[test]
fn test_map_pins_cover_located_photos() {
    let mut gallery = sqlite_gallery(&["a", "b"]);
    gallery.repository().insert("no-fix", None, None, None).unwrap();
    gallery.refresh();

    assert_eq!(gallery.len(), 3);
    assert_eq!(gallery.map_pins().len(), 2);
}

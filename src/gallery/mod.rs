// Galleria - Gallery Collection Manager
// The single in-memory source of truth for what the gallery shows. Memory is
// only mutated after the store confirms, so a failed call leaves the screen
// exactly as it was.

pub mod collection;
pub mod viewer;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::capture::CaptureEvent;
use crate::constants::{MSG_DELETE_FAILED, MSG_DELETE_OK, MSG_FAVORITE_FAILED, MSG_LOAD_FAILED};
use crate::db::schema::ImageRecord;
use crate::presentation::{GridLayout, ImageInfo, MapPin};
use crate::store::ImageRepository;

pub use collection::GalleryCollection;
pub use viewer::{ScrollCommand, ScrollFailure, Viewer, ViewerEvent, ViewerPosition, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Non-blocking user notification, drained by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            message: message.to_string(),
        }
    }
}

/// Which rows the collection mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    All,
    Album(String),
}

pub struct Gallery<R: ImageRepository> {
    repo: R,
    collection: GalleryCollection,
    viewer: Viewer,
    source: Source,
    notices: Vec<Notice>,
    pending_scroll: Option<ScrollCommand>,
}

impl<R: ImageRepository> Gallery<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            collection: GalleryCollection::new(),
            viewer: Viewer::new(),
            source: Source::All,
            notices: Vec::new(),
            pending_scroll: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn collection(&self) -> &GalleryCollection {
        &self.collection
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    /// Drives the grid's "no photos" state.
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn album(&self) -> Option<&str> {
        match &self.source {
            Source::All => None,
            Source::Album(album) => Some(album),
        }
    }

    /// Replace the collection with every stored record.
    /// On failure the previous collection stays and an error notice is queued.
    pub fn load(&mut self) -> bool {
        self.load_from(Source::All)
    }

    /// Like `load`, restricted to one album.
    pub fn load_album(&mut self, album: &str) -> bool {
        self.load_from(Source::Album(album.to_string()))
    }

    /// Reload with the current source. Called after a capture or when the
    /// capture surface closes.
    pub fn refresh(&mut self) -> bool {
        self.load_from(self.source.clone())
    }

    /// Capture-completed signal.
    pub fn on_captured(&mut self, event: &CaptureEvent) -> bool {
        log::debug!("Refreshing gallery after capture of image {}", event.id);
        self.refresh()
    }

    fn load_from(&mut self, source: Source) -> bool {
        let fetched = match &source {
            Source::All => self.repo.fetch_all(),
            Source::Album(album) => self.repo.fetch_by_album(album),
        };

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                log::error!("Error fetching images: {}", e);
                self.notices.push(Notice::error(MSG_LOAD_FAILED));
                return false;
            }
        };

        let shown = self.current().map(|record| record.id);
        self.collection.replace_all(records);
        self.source = source;

        if self.viewer.is_open() {
            let keep = shown.and_then(|id| self.collection.index_of(id));
            self.dispatch(ViewerEvent::Reloaded { keep });
        }
        true
    }

    /// Delete a record from the store, then from memory. Nothing changes in
    /// memory unless the store confirms. Not retried.
    pub fn remove(&mut self, id: i64) -> bool {
        if let Err(e) = self.repo.delete_by_id(id) {
            log::error!("Error deleting image {}: {}", id, e);
            self.notices.push(Notice::error(MSG_DELETE_FAILED));
            return false;
        }

        if let Some(index) = self.collection.remove(id) {
            self.dispatch(ViewerEvent::Removed { index });
        }
        self.notices.push(Notice::success(MSG_DELETE_OK));
        true
    }

    /// Delete the record the viewer shows.
    pub fn remove_current(&mut self) -> bool {
        match self.current().map(|record| record.id) {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    /// Flip the favorite flag of the shown record. Returns the new value.
    pub fn toggle_favorite_current(&mut self) -> Option<bool> {
        let (id, favorite) = self.current().map(|record| (record.id, !record.is_favorite))?;

        if let Err(e) = self.repo.set_favorite(id, favorite) {
            log::error!("Error updating favorite for image {}: {}", id, e);
            self.notices.push(Notice::error(MSG_FAVORITE_FAILED));
            return None;
        }

        if let Some(record) = self.collection.get_by_id_mut(id) {
            record.is_favorite = favorite;
        }
        Some(favorite)
    }

    // ----- Viewer -----

    pub fn open_viewer(&mut self, index: usize) -> Option<ScrollCommand> {
        self.dispatch(ViewerEvent::Open(index))
    }

    pub fn next(&mut self) -> Option<ScrollCommand> {
        self.dispatch(ViewerEvent::Next)
    }

    pub fn previous(&mut self) -> Option<ScrollCommand> {
        self.dispatch(ViewerEvent::Previous)
    }

    pub fn scrolled(&mut self, offset: f64, page_width: f64) -> Option<ScrollCommand> {
        self.dispatch(ViewerEvent::Scrolled { offset, page_width })
    }

    pub fn page_settled(&mut self, page: usize) -> Option<ScrollCommand> {
        self.dispatch(ViewerEvent::PageSettled(page))
    }

    pub fn close_viewer(&mut self) {
        self.dispatch(ViewerEvent::Close);
    }

    /// The surface could not scroll to an unmeasured row; retry by offset.
    pub fn scroll_failed(&mut self, failure: ScrollFailure) -> ScrollCommand {
        let command = Viewer::scroll_failed(failure);
        self.pending_scroll = Some(command);
        command
    }

    pub fn position(&self) -> ViewerPosition {
        self.viewer.position()
    }

    /// Record the viewer is showing, if open.
    pub fn current(&self) -> Option<&ImageRecord> {
        self.viewer
            .current_index()
            .and_then(|index| self.collection.get(index))
    }

    pub fn current_info(&self) -> Option<ImageInfo> {
        self.current().map(ImageInfo::from)
    }

    pub fn current_map_pin(&self) -> Option<MapPin> {
        self.current().and_then(MapPin::for_record)
    }

    /// Pins for the all-photos map.
    pub fn map_pins(&self) -> Vec<MapPin> {
        MapPin::for_collection(&self.collection)
    }

    pub fn grid(&self, columns: usize) -> GridLayout {
        GridLayout::new(&self.collection, columns)
    }

    /// Scroll the paging surface still has to perform, if any.
    pub fn take_scroll(&mut self) -> Option<ScrollCommand> {
        self.pending_scroll.take()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn dispatch(&mut self, event: ViewerEvent) -> Option<ScrollCommand> {
        let command = self.viewer.apply(event, self.collection.len());
        if command.is_some() {
            self.pending_scroll = command;
        }
        debug_assert!(self.viewer.is_consistent(self.collection.len()));
        command
    }
}

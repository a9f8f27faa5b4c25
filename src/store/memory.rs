// In-memory repository with scripted failures, for gallery and capture tests.

use std::cell::{Cell, RefCell};

use super::{GeoFix, ImageRepository};
use crate::db::schema::ImageRecord;
use crate::error::{GalleriaError, Result};

#[derive(Debug, Default)]
pub struct MemoryRepository {
    rows: RefCell<Vec<ImageRecord>>,
    next_id: Cell<i64>,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub inserts: Cell<usize>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Default::default()
        }
    }

    /// Repository pre-filled with one row per uri.
    pub fn with_uris(uris: &[&str]) -> Self {
        let repo = Self::new();
        for uri in uris {
            repo.insert(uri, None, None, None).unwrap();
        }
        repo.inserts.set(0);
        repo
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(GalleriaError::StoreWrite("simulated write failure".to_string()));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.get() {
            return Err(GalleriaError::StoreRead("simulated read failure".to_string()));
        }
        Ok(())
    }
}

impl ImageRepository for MemoryRepository {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn insert(
        &self,
        uri: &str,
        location: Option<GeoFix>,
        tag: Option<&str>,
        album: Option<&str>,
    ) -> Result<i64> {
        self.check_write()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.rows.borrow_mut().push(ImageRecord {
            id,
            uri: uri.to_string(),
            latitude: location.map(|fix| fix.latitude),
            longitude: location.map(|fix| fix.longitude),
            name: Some(format!("Galleria_Img_{}", id)),
            tag: tag.map(str::to_string),
            album: album.map(str::to_string),
            timestamp: Some("2024-01-01 00:00:00".to_string()),
            is_favorite: false,
        });
        self.inserts.set(self.inserts.get() + 1);
        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<ImageRecord>> {
        self.check_read()?;
        Ok(self.rows.borrow().clone())
    }

    fn fetch_by_album(&self, album: &str) -> Result<Vec<ImageRecord>> {
        self.check_read()?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.album.as_deref() == Some(album))
            .cloned()
            .collect())
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<ImageRecord>> {
        self.check_read()?;
        Ok(self.rows.borrow().iter().find(|row| row.id == id).cloned())
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.check_write()?;
        self.rows.borrow_mut().retain(|row| row.id != id);
        Ok(())
    }

    fn update_uri(&self, id: i64, new_uri: &str) -> Result<()> {
        self.check_write()?;
        if let Some(row) = self.rows.borrow_mut().iter_mut().find(|row| row.id == id) {
            row.uri = new_uri.to_string();
        }
        Ok(())
    }

    fn set_favorite(&self, id: i64, favorite: bool) -> Result<()> {
        self.check_write()?;
        if let Some(row) = self.rows.borrow_mut().iter_mut().find(|row| row.id == id) {
            row.is_favorite = favorite;
        }
        Ok(())
    }
}

// Galleria - Image Store
// Durable CRUD over image rows. All calls go through one cached connection.

use std::sync::Arc;

use chrono::Local;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::constants::IMAGE_NAME_PREFIX;
use crate::db::schema::{self, ImageRecord, NewImage};
use crate::db::{ConnectionCache, DbLocation};
use crate::error::{GalleriaError, Result};

#[cfg(test)]
pub mod memory;

/// A location fix taken when the capture surface became active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// The storage seam used by the gallery and capture layers.
pub trait ImageRepository {
    /// Ensure the table exists. Idempotent.
    fn initialize(&self) -> Result<()>;

    /// Write one row and return its new id.
    fn insert(
        &self,
        uri: &str,
        location: Option<GeoFix>,
        tag: Option<&str>,
        album: Option<&str>,
    ) -> Result<i64>;

    fn fetch_all(&self) -> Result<Vec<ImageRecord>>;

    fn fetch_by_album(&self, album: &str) -> Result<Vec<ImageRecord>>;

    fn fetch_by_id(&self, id: i64) -> Result<Option<ImageRecord>>;

    /// Unknown ids are a no-op, not an error.
    fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Unknown ids are a no-op, not an error.
    fn update_uri(&self, id: i64, new_uri: &str) -> Result<()>;

    /// Unknown ids are a no-op, not an error.
    fn set_favorite(&self, id: i64, favorite: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Init,
    Read,
    Write,
}

impl Op {
    fn wrap(self, message: String) -> GalleriaError {
        match self {
            Op::Init => GalleriaError::StoreInit(message),
            Op::Read => GalleriaError::StoreRead(message),
            Op::Write => GalleriaError::StoreWrite(message),
        }
    }
}

/// SQLite-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    cache: Arc<ConnectionCache>,
    name_prefix: String,
}

impl ImageStore {
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self {
            cache,
            name_prefix: IMAGE_NAME_PREFIX.to_string(),
        }
    }

    /// Store over a private connection cache for `location`.
    pub fn open(location: DbLocation) -> Self {
        Self::new(Arc::new(ConnectionCache::new(location)))
    }

    /// Store over the process-wide connection.
    pub fn shared(location: DbLocation) -> Self {
        Self::new(crate::db::shared(location))
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn cache(&self) -> &Arc<ConnectionCache> {
        &self.cache
    }

    /// Release the connection. The next call reopens it.
    pub fn close(&self) -> bool {
        self.cache.close()
    }

    pub fn fetch_first(&self) -> Result<Option<ImageRecord>> {
        self.run(Op::Read, "fetch first image", schema::get_first_image)
    }

    pub fn count(&self) -> Result<i64> {
        self.run(Op::Read, "count images", schema::count_images)
    }

    pub fn list_albums(&self) -> Result<Vec<String>> {
        self.run(Op::Read, "list albums", schema::list_albums)
    }

    fn run<T>(
        &self,
        op: Op,
        what: &str,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let shared = self.cache.get_or_open().map_err(|e| {
            log::error!("Error opening database to {}: {}", what, e);
            op.wrap(e.to_string())
        })?;
        let conn = shared.lock().map_err(|_| {
            log::error!("Error locking database to {}", what);
            op.wrap("connection lock poisoned".to_string())
        })?;

        f(&*conn).map_err(|e| {
            log::error!("Error trying to {}: {}", what, e);
            match e {
                GalleriaError::Database(db) => op.wrap(db.to_string()),
                other => other,
            }
        })
    }
}

impl ImageRepository for ImageStore {
    fn initialize(&self) -> Result<()> {
        // Opening runs the migrations, which create the table if absent
        self.run(Op::Init, "initialize the database", |conn| {
            crate::db::migrations::run_migrations(conn)
                .map_err(|e| GalleriaError::StoreInit(e.to_string()))
        })?;
        log::info!("Database initialized successfully.");
        Ok(())
    }

    fn insert(
        &self,
        uri: &str,
        location: Option<GeoFix>,
        tag: Option<&str>,
        album: Option<&str>,
    ) -> Result<i64> {
        let image = NewImage {
            uri: uri.to_string(),
            latitude: location.map(|fix| fix.latitude),
            longitude: location.map(|fix| fix.longitude),
            name: schema::generate_image_name(&self.name_prefix, &Local::now()),
            tag: tag.map(str::to_string),
            album: album.map(str::to_string),
        };

        let id = self.run(Op::Write, "insert image", |conn| schema::insert_image(conn, &image))?;
        log::info!("Image inserted with ID: {}", id);
        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<ImageRecord>> {
        let images = self.run(Op::Read, "fetch images", schema::list_images)?;
        log::debug!("Fetched {} images", images.len());
        Ok(images)
    }

    fn fetch_by_album(&self, album: &str) -> Result<Vec<ImageRecord>> {
        self.run(Op::Read, "fetch album images", |conn| {
            schema::list_images_by_album(conn, album)
        })
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<ImageRecord>> {
        self.run(Op::Read, "fetch image", |conn| schema::get_image(conn, id))
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        let removed = self.run(Op::Write, "delete image", |conn| schema::delete_image(conn, id))?;
        if removed == 0 {
            log::debug!("Delete of unknown image {} ignored", id);
        } else {
            log::info!("Image with ID: {} deleted.", id);
        }
        Ok(())
    }

    fn update_uri(&self, id: i64, new_uri: &str) -> Result<()> {
        let changed = self.run(Op::Write, "update image uri", |conn| {
            schema::update_image_uri(conn, id, new_uri)
        })?;
        if changed > 0 {
            log::info!("Image with ID: {} updated to new URI: {}", id, new_uri);
        }
        Ok(())
    }

    fn set_favorite(&self, id: i64, favorite: bool) -> Result<()> {
        self.run(Op::Write, "update favorite", |conn| {
            schema::set_image_favorite(conn, id, favorite)
        })?;
        Ok(())
    }
}

// Database module

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use once_cell::sync::OnceCell;
use rusqlite::Connection;

use crate::constants::{DB_BUSY_TIMEOUT_MS, DB_FILENAME, GALLERIA_FOLDER, PHOTOS_FOLDER};

/// A connection shared by every store call for the life of the process.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database, for tests and throwaway sessions.
    Memory,
}

/// Open or create a database and bring its schema up to date
pub fn open_db(location: &DbLocation) -> Result<Connection> {
    let conn = match location {
        DbLocation::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!(
                        "Cannot create database directory {}: {}. Check directory permissions.",
                        parent.display(),
                        e
                    )
                })?;
            }
            let conn = Connection::open(path)?;
            // WAL is not available for in-memory databases
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn
        }
        DbLocation::Memory => Connection::open_in_memory()?,
    };

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(std::time::Duration::from_millis(DB_BUSY_TIMEOUT_MS as u64))?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Get the database path for a library root
pub fn get_db_path(library_root: &Path) -> PathBuf {
    get_db_path_named(library_root, DB_FILENAME)
}

pub fn get_db_path_named(library_root: &Path, filename: &str) -> PathBuf {
    library_root.join(GALLERIA_FOLDER).join(filename)
}

/// Initialize library folder structure
pub fn init_library_folders(library_root: &Path) -> Result<()> {
    std::fs::create_dir_all(library_root.join(GALLERIA_FOLDER))?;
    std::fs::create_dir_all(library_root.join(PHOTOS_FOLDER))?;
    Ok(())
}

/// Lazily opened connection, created once and then reused.
///
/// `get_or_open` only opens when no handle is held, so repeated calls hand
/// back the same `Arc`. `close` drops the cached handle; the next call opens
/// a fresh one.
pub struct ConnectionCache {
    location: DbLocation,
    slot: Mutex<Option<SharedConnection>>,
}

impl ConnectionCache {
    pub fn new(location: DbLocation) -> Self {
        Self {
            location,
            slot: Mutex::new(None),
        }
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn get_or_open(&self) -> Result<SharedConnection> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Connection cache lock poisoned"))?;

        if let Some(conn) = slot.as_ref() {
            return Ok(Arc::clone(conn));
        }

        let conn = Arc::new(Mutex::new(open_db(&self.location)?));
        match &self.location {
            DbLocation::File(path) => log::info!("Database {} opened.", path.display()),
            DbLocation::Memory => log::info!("In-memory database opened."),
        }
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Drop the cached handle. Returns false if nothing was open.
    pub fn close(&self) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => slot.take().is_some(),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("location", &self.location)
            .field("open", &self.is_open())
            .finish()
    }
}

static SHARED_CACHES: OnceCell<Mutex<HashMap<DbLocation, Arc<ConnectionCache>>>> =
    OnceCell::new();

/// Process-wide cache for `location`. The same location always gets the same
/// cache; each distinct location gets its own.
pub fn shared(location: DbLocation) -> Arc<ConnectionCache> {
    let caches = SHARED_CACHES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut caches = caches.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(caches.entry(location).or_insert_with_key(|location| {
        log::debug!("Shared connection cache created for {:?}", location);
        Arc::new(ConnectionCache::new(location.clone()))
    }))
}

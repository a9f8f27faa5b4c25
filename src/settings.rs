// Galleria - Library settings
// Stored as JSON next to the catalog: <library>/.galleria/settings.json.
// A missing file means defaults; unknown keys are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::MissingLocation;
use crate::constants::{
    DB_FILENAME, DEFAULT_GRID_COLUMNS, DEFAULT_LIBRARY_DIR, GALLERIA_FOLDER, IMAGE_NAME_PREFIX,
    PHOTOS_FOLDER, SETTINGS_FILENAME, SETTINGS_VERSION,
};
use crate::db::{self, DbLocation};
use crate::error::{GalleriaError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: u32,
    pub db_filename: String,
    pub name_prefix: String,
    pub missing_location: MissingLocation,
    pub organize_by_date: bool,
    pub grid_columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            db_filename: DB_FILENAME.to_string(),
            name_prefix: IMAGE_NAME_PREFIX.to_string(),
            missing_location: MissingLocation::Store,
            organize_by_date: true,
            grid_columns: DEFAULT_GRID_COLUMNS,
        }
    }
}

impl Settings {
    pub fn path(library_root: &Path) -> PathBuf {
        library_root.join(GALLERIA_FOLDER).join(SETTINGS_FILENAME)
    }

    /// Load the library's settings, falling back to defaults when absent.
    pub fn load(library_root: &Path) -> Result<Self> {
        let path = Self::path(library_root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&raw)?;

        if settings.version > SETTINGS_VERSION {
            log::warn!(
                "Settings version {} is newer than this build ({}); unknown options ignored",
                settings.version,
                SETTINGS_VERSION
            );
        }
        Ok(settings)
    }

    pub fn save(&self, library_root: &Path) -> Result<()> {
        let path = Self::path(library_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn db_location(&self, library_root: &Path) -> DbLocation {
        DbLocation::File(db::get_db_path_named(library_root, &self.db_filename))
    }

    pub fn photos_dir(&self, library_root: &Path) -> PathBuf {
        library_root.join(PHOTOS_FOLDER)
    }
}

/// Platform data directory for a library when none is given.
pub fn default_library_root() -> Result<PathBuf> {
    let dirs = directories::UserDirs::new()
        .ok_or_else(|| GalleriaError::Other("Could not determine home directory".to_string()))?;
    let base = dirs
        .picture_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs.home_dir().to_path_buf());
    Ok(base.join(DEFAULT_LIBRARY_DIR))
}

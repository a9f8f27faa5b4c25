// Moving captured photos into the library's permanent photos folder

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};

use super::{FileRelocator, TransientImage};
use crate::constants::MAX_UNIQUE_NAME_ATTEMPTS;
use crate::error::{GalleriaError, Result};

const FILE_SCHEME: &str = "file://";

/// Relocates transient camera files under `photos_dir`, optionally in
/// `<year>/<month>` subfolders.
#[derive(Debug, Clone)]
pub struct FsRelocator {
    photos_dir: PathBuf,
    organize_by_date: bool,
}

impl FsRelocator {
    pub fn new(photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
            organize_by_date: true,
        }
    }

    pub fn organize_by_date(mut self, enabled: bool) -> Self {
        self.organize_by_date = enabled;
        self
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Move `source` into the photos folder and return the new path.
    pub fn move_file(&self, source: &Path) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(GalleriaError::InvalidPath(format!(
                "Transient image not found: {}",
                source.display()
            )));
        }

        let dest_dir = if self.organize_by_date {
            self.photos_dir.join(date_folder(source))
        } else {
            self.photos_dir.clone()
        };
        fs::create_dir_all(&dest_dir)?;

        let filename = source
            .file_name()
            .ok_or_else(|| GalleriaError::InvalidPath("No filename".to_string()))?;

        let mut dest_path = dest_dir.join(filename);
        if dest_path.exists() {
            dest_path = generate_unique_path(&dest_path)?;
        }

        // A rename is atomic on the same volume; fall back to copy + delete
        if fs::rename(source, &dest_path).is_err() {
            copy_with_verify(source, &dest_path)?;
            fs::remove_file(source)?;
        }

        log::debug!("Moved {} -> {}", source.display(), dest_path.display());
        Ok(dest_path)
    }
}

impl FileRelocator for FsRelocator {
    fn move_to_permanent_storage(&self, transient: &TransientImage) -> Result<String> {
        let (had_scheme, raw) = match transient.uri.strip_prefix(FILE_SCHEME) {
            Some(path) => (true, path),
            None => (false, transient.uri.as_str()),
        };

        let dest = self.move_file(Path::new(raw))?;
        let dest = dest.to_string_lossy();
        Ok(if had_scheme {
            format!("{}{}", FILE_SCHEME, dest)
        } else {
            dest.into_owned()
        })
    }
}

/// `<year>/<month>` from the file's modification time, or today.
fn date_folder(source: &Path) -> PathBuf {
    let modified = fs::metadata(source).and_then(|m| m.modified()).ok();

    let datetime: chrono::DateTime<Local> = match modified {
        Some(modified) => modified.into(),
        None => Local::now(),
    };
    PathBuf::from(format!("{}", datetime.year())).join(format!("{:02}", datetime.month()))
}

/// Generate a unique path by appending a number
fn generate_unique_path(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    for i in 1..MAX_UNIQUE_NAME_ATTEMPTS {
        let new_name = if ext.is_empty() {
            format!("{}_{}", stem, i)
        } else {
            format!("{}_{}.{}", stem, i, ext)
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(GalleriaError::Other("Could not generate unique filename".to_string()))
}

/// Copy file with size verification, keeping the modification time
fn copy_with_verify(source: &Path, dest: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    fs::File::open(source)?.read_to_end(&mut buffer)?;

    let mut dest_file = fs::File::create(dest)?;
    dest_file.write_all(&buffer)?;
    dest_file.sync_all()?;

    let source_size = fs::metadata(source)?.len();
    let dest_size = fs::metadata(dest)?.len();
    if source_size != dest_size {
        if let Err(e) = fs::remove_file(dest) {
            log::warn!("Could not remove partial copy {}: {}", dest.display(), e);
        }
        return Err(GalleriaError::Capture(format!(
            "Verification failed: size mismatch ({} vs {})",
            source_size, dest_size
        )));
    }

    if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
        let mtime = filetime::FileTime::from_system_time(modified);
        if let Err(e) = filetime::set_file_mtime(dest, mtime) {
            log::warn!("Could not keep modification time on {}: {}", dest.display(), e);
        }
    }

    Ok(())
}

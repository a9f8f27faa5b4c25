// Galleria - Library Entry Point
// Local photo gallery core: image store, capture coordinator, gallery
// collection and viewer. Rendering is left to the embedding shell.

pub mod constants;
pub mod error;
pub mod settings;
pub mod db;
pub mod store;
pub mod capture;
pub mod gallery;
pub mod presentation;

pub use capture::{CameraFacing, CaptureCoordinator, CaptureEvent, CaptureOutcome, MissingLocation};
pub use db::schema::ImageRecord;
pub use error::{GalleriaError, Result};
pub use gallery::{Gallery, Notice, NoticeLevel};
pub use settings::Settings;
pub use store::{GeoFix, ImageRepository, ImageStore};

use std::path::Path;

/// Open the library at `library_root` over the process-wide connection and
/// make sure its table exists. Returns the store and the library settings.
pub fn open_library(library_root: &Path) -> Result<(ImageStore, Settings)> {
    let settings = Settings::load(library_root)?;
    let store = ImageStore::shared(settings.db_location(library_root))
        .with_name_prefix(settings.name_prefix.clone());
    store.initialize()?;
    Ok((store, settings))
}

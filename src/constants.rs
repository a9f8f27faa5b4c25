// Galleria Constants
// Names and formats shared by the store, capture and shell. Changing the
// on-disk names orphans existing libraries.

// Paths
pub const GALLERIA_FOLDER: &str = ".galleria";
pub const DB_FILENAME: &str = "galleryApp.db";
pub const SETTINGS_FILENAME: &str = "settings.json";
pub const PHOTOS_FOLDER: &str = "photos";
pub const DEFAULT_LIBRARY_DIR: &str = "Galleria";

// Naming
pub const IMAGE_NAME_PREFIX: &str = "Galleria_Img_";
/// month-day-year_hour-minute-second
pub const IMAGE_NAME_FORMAT: &str = "%m-%d-%Y_%H-%M-%S";

// Database
pub const DB_BUSY_TIMEOUT_MS: u32 = 5000;

// Settings
pub const SETTINGS_VERSION: u32 = 1;
pub const DEFAULT_GRID_COLUMNS: usize = 4;

// Relocation
pub const MAX_UNIQUE_NAME_ATTEMPTS: u32 = 1000;

// User-visible notices
pub const MSG_LOAD_FAILED: &str = "Failed to load gallery images.";
pub const MSG_DELETE_FAILED: &str = "Failed to delete the image.";
pub const MSG_DELETE_OK: &str = "Image deleted successfully.";
pub const MSG_FAVORITE_FAILED: &str = "Failed to update favorite.";
pub const MSG_CAPTURE_FAILED: &str = "Failed to save the photo.";
pub const MSG_NO_PHOTOS: &str = "No photos available.";

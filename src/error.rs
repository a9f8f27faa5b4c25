// Galleria Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleriaError {
    #[error("Store initialization failed: {0}")]
    StoreInit(String),

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    #[error("Store read failed: {0}")]
    StoreRead(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("A capture is already in progress")]
    CaptureInFlight,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image not found: {0}")]
    ImageNotFound(i64),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

impl GalleriaError {
    /// True for the store failure kinds a screen reports as a notice.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            GalleriaError::StoreInit(_)
                | GalleriaError::StoreWrite(_)
                | GalleriaError::StoreRead(_)
                | GalleriaError::Database(_)
        )
    }

    /// True when a shutter press ended without a saved photo and the user
    /// should be told so.
    pub fn is_capture_failure(&self) -> bool {
        matches!(self, GalleriaError::Capture(_)) || self.is_store_error()
    }
}

impl From<anyhow::Error> for GalleriaError {
    fn from(err: anyhow::Error) -> Self {
        GalleriaError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GalleriaError>;

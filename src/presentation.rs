// Galleria - View models for the presentation shell
// Plain data handed to the grid, info panel and map widgets. Nothing here
// renders; the shell decides how these look.

use serde::Serialize;

use crate::constants::MSG_NO_PHOTOS;
use crate::db::schema::ImageRecord;
use crate::gallery::GalleryCollection;

/// Map region span around a pin, in degrees.
pub const MAP_LATITUDE_DELTA: f64 = 0.0922;
pub const MAP_LONGITUDE_DELTA: f64 = 0.0421;

/// Everything the info panel shows for one photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub id: i64,
    pub uri: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<String>,
    pub tag: Option<String>,
    pub album: Option<String>,
    pub is_favorite: bool,
}

impl From<&ImageRecord> for ImageInfo {
    fn from(record: &ImageRecord) -> Self {
        Self {
            id: record.id,
            uri: record.uri.clone(),
            name: record.name.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            timestamp: record.timestamp.clone(),
            tag: record.tag.clone(),
            album: record.album.clone(),
            is_favorite: record.is_favorite,
        }
    }
}

impl ImageInfo {
    /// Label/value lines in panel order. Absent values show as "-".
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        fn or_dash<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        }

        vec![
            ("URI", self.uri.clone()),
            ("Name", or_dash(self.name.as_deref())),
            ("Latitude", or_dash(self.latitude)),
            ("Longitude", or_dash(self.longitude)),
            ("Timestamp", or_dash(self.timestamp.as_deref())),
            ("Tag", or_dash(self.tag.as_deref())),
            ("Album", or_dash(self.album.as_deref())),
            ("Favorite", if self.is_favorite { "yes" } else { "no" }.to_string()),
        ]
    }
}

/// Input for the map widget: one pin and the region around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPin {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapPin {
    /// None when the photo was taken without a location fix.
    pub fn for_record(record: &ImageRecord) -> Option<Self> {
        let (latitude, longitude) = record.coordinates()?;
        let title = record
            .name
            .clone()
            .unwrap_or_else(|| format!("Photo {}", record.id));

        Some(Self {
            latitude,
            longitude,
            title,
            latitude_delta: MAP_LATITUDE_DELTA,
            longitude_delta: MAP_LONGITUDE_DELTA,
        })
    }

    /// One pin per located photo, in collection order.
    pub fn for_collection(collection: &GalleryCollection) -> Vec<Self> {
        collection.iter().filter_map(Self::for_record).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// Position to open the viewer at when tapped
    pub index: usize,
    pub id: i64,
    pub uri: String,
    pub is_favorite: bool,
}

/// Fixed-column grid of the collection, row by row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub columns: usize,
    pub rows: Vec<Vec<GridCell>>,
    /// Set when there is nothing to show
    pub empty_message: Option<String>,
}

impl GridLayout {
    pub fn new(collection: &GalleryCollection, columns: usize) -> Self {
        let columns = columns.max(1);

        if collection.is_empty() {
            return Self {
                columns,
                rows: Vec::new(),
                empty_message: Some(MSG_NO_PHOTOS.to_string()),
            };
        }

        let cells: Vec<GridCell> = collection
            .iter()
            .enumerate()
            .map(|(index, record)| GridCell {
                index,
                id: record.id,
                uri: record.uri.clone(),
                is_favorite: record.is_favorite,
            })
            .collect();

        Self {
            columns,
            rows: cells.chunks(columns).map(<[GridCell]>::to_vec).collect(),
            empty_message: None,
        }
    }
}

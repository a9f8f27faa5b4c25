// Database schema types and query helpers

use chrono::{DateTime, TimeZone};
use rusqlite::{Connection, params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::constants::IMAGE_NAME_FORMAT;
use crate::error::Result;

// ----- Image -----

/// One captured photo and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: i64,
    pub uri: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub album: Option<String>,
    pub timestamp: Option<String>,
    pub is_favorite: bool,
}

impl ImageRecord {
    /// Both coordinates, when the capture had a location fix.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewImage {
    pub uri: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: String,
    pub tag: Option<String>,
    pub album: Option<String>,
}

const IMAGE_COLUMNS: &str =
    "id, uri, latitude, longitude, name, tag, album, timestamp, is_favorite";

fn row_to_image(row: &Row) -> rusqlite::Result<ImageRecord> {
    Ok(ImageRecord {
        id: row.get(0)?,
        uri: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        name: row.get(4)?,
        tag: row.get(5)?,
        album: row.get(6)?,
        timestamp: row.get(7)?,
        is_favorite: row.get::<_, i64>(8)? != 0,
    })
}

/// Build the display name for a capture taken at `at`.
pub fn generate_image_name<Tz>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", prefix, at.format(IMAGE_NAME_FORMAT))
}

/// Single-statement insert; the row exists in full or not at all.
pub fn insert_image(conn: &Connection, image: &NewImage) -> Result<i64> {
    conn.execute(
        "INSERT INTO images (uri, latitude, longitude, name, tag, album)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            image.uri,
            image.latitude,
            image.longitude,
            image.name,
            image.tag,
            image.album,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_image(conn: &Connection, id: i64) -> Result<Option<ImageRecord>> {
    let sql = format!("SELECT {} FROM images WHERE id = ?1", IMAGE_COLUMNS);
    let result = conn.query_row(&sql, params![id], row_to_image).optional()?;
    Ok(result)
}

pub fn get_first_image(conn: &Connection) -> Result<Option<ImageRecord>> {
    let sql = format!("SELECT {} FROM images ORDER BY id LIMIT 1", IMAGE_COLUMNS);
    let result = conn.query_row(&sql, [], row_to_image).optional()?;
    Ok(result)
}

/// All images in insertion order.
pub fn list_images(conn: &Connection) -> Result<Vec<ImageRecord>> {
    let sql = format!("SELECT {} FROM images ORDER BY id", IMAGE_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let images = stmt
        .query_map([], row_to_image)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(images)
}

pub fn list_images_by_album(conn: &Connection, album: &str) -> Result<Vec<ImageRecord>> {
    let sql = format!("SELECT {} FROM images WHERE album = ?1 ORDER BY id", IMAGE_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let images = stmt
        .query_map(params![album], row_to_image)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(images)
}

pub fn list_albums(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT album FROM images WHERE album IS NOT NULL ORDER BY album",
    )?;
    let albums = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(albums)
}

pub fn count_images(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
    Ok(count)
}

/// Returns the number of rows removed (0 when the id is unknown).
pub fn delete_image(conn: &Connection, id: i64) -> Result<usize> {
    let changed = conn.execute("DELETE FROM images WHERE id = ?1", params![id])?;
    Ok(changed)
}

pub fn update_image_uri(conn: &Connection, id: i64, uri: &str) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE images SET uri = ?1 WHERE id = ?2",
        params![uri, id],
    )?;
    Ok(changed)
}

pub fn set_image_favorite(conn: &Connection, id: i64, favorite: bool) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE images SET is_favorite = ?1 WHERE id = ?2",
        params![favorite as i64, id],
    )?;
    Ok(changed)
}

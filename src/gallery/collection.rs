// Galleria - Gallery collection
// Records keyed by id, plus the ordered id list the grid and viewer index into.

use std::collections::HashMap;

use crate::db::schema::ImageRecord;

/// In-memory mirror of the loaded records.
///
/// Positions are only meaningful against `order`; anything that needs to
/// survive a mutation must hold an id, not an index.
#[derive(Debug, Clone, Default)]
pub struct GalleryCollection {
    records: HashMap<i64, ImageRecord>,
    order: Vec<i64>,
}

impl GalleryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(records);
        collection
    }

    /// Replace the whole contents, keeping the given order.
    pub fn replace_all(&mut self, records: Vec<ImageRecord>) {
        self.records.clear();
        self.order.clear();
        for record in records {
            let id = record.id;
            // A repeated id keeps its first position and the latest data
            if self.records.insert(id, record).is_none() {
                self.order.push(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[i64] {
        &self.order
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.order.get(index).and_then(|id| self.records.get(id))
    }

    pub fn get_by_id(&self, id: i64) -> Option<&ImageRecord> {
        self.records.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: i64) -> Option<&mut ImageRecord> {
        self.records.get_mut(&id)
    }

    pub fn index_of(&self, id: i64) -> Option<usize> {
        self.order.iter().position(|&candidate| candidate == id)
    }

    /// Remove by id. Returns the position the record occupied.
    pub fn remove(&mut self, id: i64) -> Option<usize> {
        self.records.remove(&id)?;
        let index = self.index_of(id)?;
        self.order.remove(index);
        Some(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> + '_ {
        self.order.iter().filter_map(move |id| self.records.get(id))
    }
}

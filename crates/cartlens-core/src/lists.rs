// Durable list storage facade - normalizes image fields on the way in
use std::path::Path;

use cartlens_store::ListDb;
use tracing::info;

use crate::image;
use crate::models::{ImageField, Item};
use crate::{Error, Result};

/// Named-list store. Wraps the SQLite layer and guarantees that nothing
/// but encoded image text ever reaches disk.
pub struct ListStore {
    db: ListDb,
}

impl ListStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = ListDb::open(path).map_err(|e| Error::Persistence(e.to_string()))?;
        Ok(Self { db })
    }

    /// Backed by memory only, handy for tests
    pub fn open_in_memory() -> Result<Self> {
        let db = ListDb::open_in_memory().map_err(|e| Error::Persistence(e.to_string()))?;
        Ok(Self { db })
    }

    /// Save a collection under a name, overwriting any previous version.
    /// Live image handles are encoded first; already-encoded text goes
    /// through unchanged. The caller's collection is never modified, and
    /// a failed save leaves it the source of truth.
    pub fn save(&self, name: &str, items: &[Item]) -> Result<()> {
        let stored = items
            .iter()
            .map(normalize_images)
            .collect::<Result<Vec<_>>>()?;
        let payload = serde_json::to_string(&stored)?;
        self.db
            .put(name, &payload)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        info!("Saved list '{}' with {} items", name, stored.len());
        Ok(())
    }

    /// Load a named collection. Image fields come back encoded, never as
    /// live handles - the original capture is gone for good. `None` when
    /// the name was never saved.
    pub fn load(&self, name: &str) -> Result<Option<Vec<Item>>> {
        let Some(payload) = self
            .db
            .get(name)
            .map_err(|e| Error::Persistence(e.to_string()))?
        else {
            return Ok(None);
        };
        let items: Vec<Item> = serde_json::from_str(&payload)?;
        Ok(Some(items))
    }

    /// All saved list names
    pub fn names(&self) -> Result<Vec<String>> {
        self.db.names().map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Delete a list. A name that was never saved is not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.db
            .remove(name)
            .map_err(|e| Error::Persistence(e.to_string()))
    }
}

/// Clone an item with every image field in its storable form
fn normalize_images(item: &Item) -> Result<Item> {
    let mut stored = item.clone();
    stored.product_image = normalize_field(&item.product_image)?;
    stored.nutrition_image = normalize_field(&item.nutrition_image)?;
    Ok(stored)
}

fn normalize_field(field: &ImageField) -> Result<ImageField> {
    match field {
        ImageField::Live(blob) => Ok(ImageField::Encoded(image::encode(blob)?)),
        other => Ok(other.clone()),
    }
}

//! # Item Type Catalog
//!
//! The item factory consumed by spawning, plus a JSON-backed implementation.

use crate::{Item, ItemType, LoadResult, TimePoint};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Source of item types and fresh item instances.
///
/// Spawning only ever asks three things of the item side: does a type exist,
/// give me a new instance of it, and give me a generic corpse.
pub trait ItemFactory {
    /// Looks up an item type by id.
    fn item_type(&self, id: &str) -> Option<Arc<ItemType>>;

    /// Whether an item type with this id exists.
    fn has_type(&self, id: &str) -> bool {
        self.item_type(id).is_some()
    }

    /// Instantiates a new item of the given type.
    fn spawn(&self, id: &str, birthday: TimePoint) -> Option<Item> {
        self.item_type(id).map(|kind| Item::new(kind, birthday))
    }

    /// Creates a generic corpse.
    fn make_corpse(&self, birthday: TimePoint) -> Item;
}

/// Item types indexed by id.
#[derive(Debug, Clone)]
pub struct ItemTypeCatalog {
    types: HashMap<String, Arc<ItemType>>,
    corpse: Arc<ItemType>,
}

impl Default for ItemTypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemTypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            corpse: Arc::new(ItemType::corpse()),
        }
    }

    /// Adds or replaces an item type.
    pub fn insert(&mut self, kind: ItemType) {
        let kind = Arc::new(kind);
        if kind.id == crate::config::CORPSE_ID {
            self.corpse = Arc::clone(&kind);
        }
        self.types.insert(kind.id.clone(), kind);
    }

    /// Removes an item type, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Arc<ItemType>> {
        self.types.remove(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parses a JSON array of item types.
    ///
    /// # Examples
    ///
    /// ```
    /// use item_groups::{ItemFactory, ItemTypeCatalog};
    ///
    /// let catalog = ItemTypeCatalog::from_json_str(r#"[{ "id": "rock" }]"#).unwrap();
    /// assert!(catalog.has_type("rock"));
    /// assert!(!catalog.has_type("paper"));
    /// ```
    pub fn from_json_str(json: &str) -> LoadResult<Self> {
        let kinds: Vec<ItemType> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for kind in kinds {
            catalog.insert(kind);
        }
        log::debug!("Loaded {} item types", catalog.len());
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    pub fn load_file(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl ItemFactory for ItemTypeCatalog {
    fn item_type(&self, id: &str) -> Option<Arc<ItemType>> {
        self.types.get(id).cloned()
    }

    fn make_corpse(&self, birthday: TimePoint) -> Item {
        Item::new(Arc::clone(&self.corpse), birthday)
    }
}

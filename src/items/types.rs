//! # Item Types
//!
//! Static item type definitions as loaded from the item catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Broad item category, deciding how charges and ammo behave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Anything without special charge handling
    #[default]
    Generic,
    /// Ranged weapon firing ammo, either directly or from a magazine
    Gun,
    /// Tool that may consume charges or ammo
    Tool,
    /// Detachable ammo holder
    Magazine,
    /// Ammunition, counted by charges
    Ammo,
    /// Food and drink
    Comestible,
    /// Item whose purpose is holding other items
    Container,
}

/// Definition of an item type.
///
/// Only the properties the spawn pipeline consults are modelled. Every field
/// has a default so catalog entries only need to spell out what matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemType {
    /// Unique type id
    pub id: String,
    /// Broad category
    pub category: ItemCategory,
    /// Flags every instance of this type carries
    pub flags: BTreeSet<String>,
    /// Whether the type is made of liquid
    pub liquid: bool,
    /// Whether instances are stacked and counted by charges
    pub count_by_charges: bool,
    /// Volume of one stack, in container capacity units
    pub volume: i32,
    /// Charges in one stack of `volume`
    pub stack_size: i32,
    /// Ammo types this item accepts
    pub ammo_types: Vec<String>,
    /// Ammo item loaded when none is requested explicitly
    pub ammo_default: Option<String>,
    /// Maximum loaded ammo (or tool charges)
    pub ammo_capacity: i32,
    /// Magazine inserted by default; guns with one are magazine-fed
    pub magazine_default: Option<String>,
    /// Container the item spawns in when nothing else is requested
    pub default_container: Option<String>,
    /// How much volume this item can hold as a container
    pub container_capacity: i32,
    /// Randomized charge table owned by the tool itself
    pub rand_charges: Vec<i32>,
}

impl Default for ItemType {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: ItemCategory::Generic,
            flags: BTreeSet::new(),
            liquid: false,
            count_by_charges: false,
            volume: 1,
            stack_size: 1,
            ammo_types: Vec::new(),
            ammo_default: None,
            ammo_capacity: 0,
            magazine_default: None,
            default_container: None,
            container_capacity: 0,
            rand_charges: Vec::new(),
        }
    }
}

impl ItemType {
    /// Creates a generic item type with the given id.
    ///
    /// # Examples
    ///
    /// ```
    /// use item_groups::{ItemCategory, ItemType};
    ///
    /// let rock = ItemType::new("rock");
    /// assert_eq!(rock.id, "rock");
    /// assert_eq!(rock.category, ItemCategory::Generic);
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    /// Adds a type-level flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Type of the generic corpse spawned for the `corpse` id.
    pub fn corpse() -> Self {
        Self::new(crate::config::CORPSE_ID)
    }

    /// Whether instances of this type can carry charges at all.
    pub fn can_have_charges(&self) -> bool {
        self.count_by_charges || self.ammo_capacity > 0
    }
}

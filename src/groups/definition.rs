//! # Group Definitions
//!
//! Serde shapes of the JSON group format. These are plain data; turning them
//! into spawn trees is the loader's job.

use serde::Deserialize;
use serde_json::Value;

/// An integer or an inclusive `[min, max]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RangeDef {
    Exact(i32),
    Span([i32; 2]),
}

impl RangeDef {
    pub fn bounds(self) -> (i32, i32) {
        match self {
            Self::Exact(value) => (value, value),
            Self::Span([min, max]) => (min, max),
        }
    }
}

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Element of an `items` or `groups` list, or of the array group form.
///
/// A bare id, an `[id, probability]` pair or a full entry object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShortEntry {
    Id(String),
    Weighted(String, i32),
    Full(Box<EntryDef>),
}

/// A full entry object.
///
/// Exactly one of `item`, `group`, `distribution` and `collection` names what
/// the entry spawns; the remaining fields make up its modifier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EntryDef {
    pub item: Option<String>,
    /// Group id, or an inline group object or array
    pub group: Option<Value>,
    pub distribution: Option<Vec<Value>>,
    pub collection: Option<Vec<Value>>,

    #[serde(alias = "probability")]
    pub prob: Option<i32>,

    pub damage: Option<RangeDef>,
    pub damage_min: Option<i32>,
    pub damage_max: Option<i32>,
    pub charges: Option<RangeDef>,
    pub charges_min: Option<i32>,
    pub charges_max: Option<i32>,
    pub count: Option<RangeDef>,
    pub count_min: Option<i32>,
    pub count_max: Option<i32>,
    pub dirt: Option<RangeDef>,

    pub ammo: Option<i32>,
    pub magazine: Option<i32>,
    pub ammo_item: Option<String>,
    pub ammo_group: Option<Value>,
    pub container_item: Option<String>,
    pub container_group: Option<Value>,
    pub contents_item: Option<OneOrMany>,
    pub contents_group: Option<Value>,
    pub custom_flags: Vec<String>,
}

impl EntryDef {
    /// Whether any modifier field is present.
    pub fn has_modifier(&self) -> bool {
        self.damage.is_some()
            || self.damage_min.is_some()
            || self.damage_max.is_some()
            || self.charges.is_some()
            || self.charges_min.is_some()
            || self.charges_max.is_some()
            || self.count.is_some()
            || self.count_min.is_some()
            || self.count_max.is_some()
            || self.dirt.is_some()
            || self.ammo.is_some()
            || self.magazine.is_some()
            || self.ammo_item.is_some()
            || self.ammo_group.is_some()
            || self.container_item.is_some()
            || self.container_group.is_some()
            || self.contents_item.is_some()
            || self.contents_group.is_some()
            || !self.custom_flags.is_empty()
    }
}

/// A group object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupDef {
    pub id: Option<String>,
    pub subtype: Option<String>,
    /// Ammo chance pushed down to every single entry
    pub ammo: i32,
    /// Magazine chance pushed down to every single entry
    pub magazine: i32,
    pub items: Vec<ShortEntry>,
    pub groups: Vec<ShortEntry>,
    pub entries: Vec<EntryDef>,
}

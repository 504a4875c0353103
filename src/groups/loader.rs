//! # Group Loading
//!
//! Builds spawn trees from JSON definitions and registers them.

use super::definition::{EntryDef, GroupDef, RangeDef, ShortEntry};
use super::GroupRegistry;
use crate::config::{DEFAULT_PROBABILITY, SYNTHETIC_GROUP_PREFIX, UNSET_CHARGES};
use crate::{
    GroupKind, GroupLookup, ItemGroup, ItemModifier, LoadError, LoadResult, SingleSpawn, SpawnError, SpawnNode,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// Hint for the next synthetic group id. Taken ids are skipped.
static NEXT_SYNTHETIC_ID: AtomicU32 = AtomicU32::new(0);

/// Subtype of inline groups given for single-result fields (ammo, container).
const SINGLE_RESULT_SUBTYPE: &str = "distribution";

/// Subtype of inline groups given for multi-result fields (group, contents).
const MANY_RESULT_SUBTYPE: &str = "collection";

impl GroupRegistry {
    /// Mints an id for an anonymous group that is not defined yet.
    pub fn unique_group_id(&self) -> String {
        loop {
            let next = NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::Relaxed);
            let id = format!("{}{}", SYNTHETIC_GROUP_PREFIX, next);
            if !self.is_defined(&id) {
                return id;
            }
        }
    }

    /// Loads a group object and registers it under `group_id`.
    ///
    /// The object's own `subtype` wins over `default_subtype`.
    ///
    /// On failure nothing stays registered, including anonymous groups
    /// minted by entries that loaded before the failing one.
    pub fn load_group_object(&mut self, group_id: &str, value: &Value, default_subtype: &str) -> LoadResult<()> {
        self.rolling_back(|registry| registry.build_group_object(group_id, value, default_subtype))
    }

    fn build_group_object(&mut self, group_id: &str, value: &Value, default_subtype: &str) -> LoadResult<()> {
        let def: GroupDef = serde_json::from_value(value.clone())?;
        let subtype = def.subtype.as_deref().unwrap_or(default_subtype);
        let kind = GroupKind::from_subtype(subtype).ok_or_else(|| {
            LoadError::InvalidDefinition(format!("unknown subtype {} for item group {}", subtype, group_id))
        })?;

        let mut group = ItemGroup::new(kind, DEFAULT_PROBABILITY, def.ammo, def.magazine);
        for entry in &def.items {
            let node = self.short_entry(entry, false, def.ammo, def.magazine)?;
            group.add_entry(node);
        }
        for entry in &def.groups {
            let node = self.short_entry(entry, true, def.ammo, def.magazine)?;
            group.add_entry(node);
        }
        for entry in &def.entries {
            let node = self.entry(entry, def.ammo, def.magazine)?;
            group.add_entry(node);
        }

        self.register(group_id, group);
        Ok(())
    }

    /// Loads the array form: a plain list of entries.
    pub fn load_group_array(
        &mut self,
        group_id: &str,
        entries: &[Value],
        is_collection: bool,
        ammo_chance: i32,
        magazine_chance: i32,
    ) -> LoadResult<()> {
        let kind = if is_collection {
            GroupKind::Collection
        } else {
            GroupKind::Distribution
        };
        let group = self.rolling_back(|registry| {
            registry.inline_group(kind, entries, DEFAULT_PROBABILITY, ammo_chance, magazine_chance)
        })?;
        self.register(group_id, group);
        Ok(())
    }

    /// Runs a load step, unregistering the anonymous groups it minted if it
    /// fails.
    fn rolling_back<T>(&mut self, load: impl FnOnce(&mut Self) -> LoadResult<T>) -> LoadResult<T> {
        let mark = self.anonymous.len();
        let result = load(self);
        if result.is_err() {
            let minted: Vec<String> = self.anonymous.drain(mark..).collect();
            for id in minted {
                log::debug!("Dropping anonymous item group {:?} of a failed definition", id);
                self.unregister(&id);
            }
        }
        result
    }

    /// Resolves a group field to a group id.
    ///
    /// A string is an id and is returned as is. An object or array is an
    /// anonymous group: it is registered under a freshly minted id, which is
    /// returned.
    pub fn load_item_group(&mut self, value: &Value, default_subtype: &str) -> LoadResult<String> {
        match value {
            Value::String(id) => Ok(id.clone()),
            Value::Object(_) => {
                let id = self.unique_group_id();
                self.load_group_object(&id, value, default_subtype)?;
                self.anonymous.push(id.clone());
                log::debug!("Loaded anonymous item group {:?}", id);
                Ok(id)
            }
            Value::Array(entries) => {
                let id = self.unique_group_id();
                let is_collection = match default_subtype {
                    "collection" => true,
                    "distribution" => false,
                    other => {
                        log::error!("{}", SpawnError::InvalidSubtype(other.to_string()));
                        false
                    }
                };
                self.load_group_array(&id, entries, is_collection, 0, 0)?;
                self.anonymous.push(id.clone());
                log::debug!("Loaded anonymous item group {:?}", id);
                Ok(id)
            }
            _ => Err(LoadError::InvalidDefinition(
                "item group must be a string (group id) or an object/array (the group data)".to_string(),
            )),
        }
    }

    /// Loads an array of group objects, each carrying its `id`.
    ///
    /// Returns the ids loaded, in order.
    pub fn load_definitions(&mut self, value: &Value) -> LoadResult<Vec<String>> {
        let Value::Array(definitions) = value else {
            return Err(LoadError::InvalidDefinition(
                "group definitions must be an array of group objects".to_string(),
            ));
        };

        let mut loaded = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let id = definition
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::InvalidDefinition("group definition without an id".to_string()))?
                .to_string();
            self.load_group_object(&id, definition, "old")?;
            loaded.push(id);
        }
        log::info!("Loaded {} item groups", loaded.len());
        Ok(loaded)
    }

    /// Loads group definitions from a JSON file.
    pub fn load_file(&mut self, path: &Path) -> LoadResult<Vec<String>> {
        let contents = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        self.load_definitions(&value)
    }

    fn inline_group(
        &mut self,
        kind: GroupKind,
        entries: &[Value],
        probability: i32,
        ammo_chance: i32,
        magazine_chance: i32,
    ) -> LoadResult<ItemGroup> {
        let mut group = ItemGroup::new(kind, probability, ammo_chance, magazine_chance);
        for value in entries {
            let entry: ShortEntry = serde_json::from_value(value.clone())?;
            let node = self.short_entry(&entry, false, ammo_chance, magazine_chance)?;
            group.add_entry(node);
        }
        Ok(group)
    }

    /// Builds a node from an `items`/`groups` element. Bare ids name groups
    /// when `is_group` is set.
    fn short_entry(&mut self, entry: &ShortEntry, is_group: bool, ammo: i32, magazine: i32) -> LoadResult<SpawnNode> {
        let (id, probability) = match entry {
            ShortEntry::Id(id) => (id, DEFAULT_PROBABILITY),
            ShortEntry::Weighted(id, probability) => (id, *probability),
            ShortEntry::Full(def) => return self.entry(def, ammo, magazine),
        };
        let single = if is_group {
            SingleSpawn::group(id.as_str(), probability)
        } else {
            SingleSpawn::item(id.as_str(), probability)
        };
        Ok(single.into())
    }

    /// Builds a node from a full entry object.
    fn entry(&mut self, def: &EntryDef, ammo: i32, magazine: i32) -> LoadResult<SpawnNode> {
        let probability = def.prob.unwrap_or(DEFAULT_PROBABILITY);
        let mut single = match (&def.item, &def.group, &def.distribution, &def.collection) {
            (Some(item), None, None, None) => SingleSpawn::item(item.as_str(), probability),
            (None, Some(group), None, None) => {
                SingleSpawn::group(self.load_item_group(group, MANY_RESULT_SUBTYPE)?, probability)
            }
            (None, None, Some(entries), None) => {
                let group = self.inline_group(GroupKind::Distribution, entries, probability, ammo, magazine)?;
                return Ok(group.into());
            }
            (None, None, None, Some(entries)) => {
                let group = self.inline_group(GroupKind::Collection, entries, probability, ammo, magazine)?;
                return Ok(group.into());
            }
            _ => {
                return Err(LoadError::InvalidDefinition(
                    "entry needs exactly one of item, group, distribution or collection".to_string(),
                ))
            }
        };

        if def.has_modifier() {
            single.modifier = Some(self.modifier(def)?);
        }
        Ok(single.into())
    }

    fn modifier(&mut self, def: &EntryDef) -> LoadResult<ItemModifier> {
        let mut modifier = ItemModifier::default();

        if let Some(damage) = span(def.damage, def.damage_min, def.damage_max, 0) {
            modifier.damage = damage;
        }
        if let Some(count) = span(def.count, def.count_min, def.count_max, 1) {
            modifier.count = count;
        }
        if let Some(dirt) = def.dirt {
            modifier.dirt = dirt.bounds();
        }
        modifier.charges = match def.charges {
            Some(charges) => charges.bounds(),
            None => (
                def.charges_min.unwrap_or(UNSET_CHARGES),
                def.charges_max.unwrap_or(UNSET_CHARGES),
            ),
        };
        modifier.with_ammo = def.ammo.unwrap_or(0);
        modifier.with_magazine = def.magazine.unwrap_or(0);

        modifier.ammo = self.nested_node(def.ammo_item.as_deref(), def.ammo_group.as_ref(), SINGLE_RESULT_SUBTYPE)?;
        modifier.container =
            self.nested_node(def.container_item.as_deref(), def.container_group.as_ref(), SINGLE_RESULT_SUBTYPE)?;

        if let Some(contents) = &def.contents_item {
            let mut group = ItemGroup::collection(DEFAULT_PROBABILITY);
            for id in contents.clone().into_vec() {
                group.add_item_entry(&id, DEFAULT_PROBABILITY);
            }
            modifier.contents = Some(Box::new(group.into()));
        } else if let Some(contents) = &def.contents_group {
            let id = self.load_item_group(contents, MANY_RESULT_SUBTYPE)?;
            modifier.contents = Some(Box::new(SingleSpawn::group(id, DEFAULT_PROBABILITY).into()));
        }

        modifier.custom_flags = def.custom_flags.iter().cloned().collect();
        Ok(modifier)
    }

    /// A nested node given either as an item id or as a group.
    fn nested_node(
        &mut self,
        item: Option<&str>,
        group: Option<&Value>,
        default_subtype: &str,
    ) -> LoadResult<Option<Box<SpawnNode>>> {
        if let Some(item) = item {
            return Ok(Some(Box::new(SingleSpawn::item(item, DEFAULT_PROBABILITY).into())));
        }
        match group {
            Some(group) => {
                let id = self.load_item_group(group, default_subtype)?;
                Ok(Some(Box::new(SingleSpawn::group(id, DEFAULT_PROBABILITY).into())))
            }
            None => Ok(None),
        }
    }
}

/// Range from an exact/span field or from separate min/max fields.
///
/// A missing min takes `default_min`; a missing max equals the min.
fn span(exact: Option<RangeDef>, min: Option<i32>, max: Option<i32>, default_min: i32) -> Option<(i32, i32)> {
    if let Some(exact) = exact {
        return Some(exact.bounds());
    }
    if min.is_none() && max.is_none() {
        return None;
    }
    let min = min.unwrap_or(default_min);
    Some((min, max.unwrap_or(min)))
}

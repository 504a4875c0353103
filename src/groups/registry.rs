//! # Group Registry
//!
//! Named groups and the top-level spawn operations built on them.

use crate::{
    ConsistencyCheck, GroupLookup, Item, ItemFactory, SpawnContext, SpawnError, SpawnNode, SpawnRng,
    TimePoint,
};
use std::collections::{BTreeSet, HashMap};

/// Every defined item group, by id.
///
/// Groups reference each other by id, so the registry is the only owner of
/// group trees and cross-group cycles never become ownership cycles.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<String, SpawnNode>,
    /// Anonymous groups minted while loading, in load order
    pub(super) anonymous: Vec<String>,
}

impl GroupLookup for GroupRegistry {
    fn group(&self, group_id: &str) -> Option<&SpawnNode> {
        self.groups.get(group_id)
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines a group, returning the previous definition.
    pub fn register(&mut self, group_id: impl Into<String>, node: impl Into<SpawnNode>) -> Option<SpawnNode> {
        let group_id = group_id.into();
        log::debug!("Registering item group {}", group_id);
        self.groups.insert(group_id, node.into())
    }

    /// Drops a group definition.
    pub fn unregister(&mut self, group_id: &str) -> Option<SpawnNode> {
        self.anonymous.retain(|id| id != group_id);
        self.groups.remove(group_id)
    }

    /// Ids of the anonymous groups minted for inline group definitions.
    pub fn anonymous_ids(&self) -> &[String] {
        &self.anonymous
    }

    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut SpawnNode> {
        self.groups.get_mut(group_id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Validates every group, using the group id as context.
    pub fn check_consistency(&self, items: &dyn ItemFactory) -> Vec<SpawnError> {
        let mut check = ConsistencyCheck::new(self, items);
        for id in self.ids() {
            if let Some(node) = self.group(id) {
                node.check_consistency(id, &mut check);
            }
        }
        check.into_errors()
    }

    /// Removes `type_id` from every group.
    ///
    /// Entries whose item (or container) was removed are dropped. Group
    /// references are reached through the referenced group's own definition.
    pub fn remove_item(&mut self, type_id: &str) {
        for node in self.groups.values_mut() {
            node.remove_item(type_id);
        }
    }

    /// Rewrites every reference to `old_id` as `new_id` in every group.
    pub fn replace_item(&mut self, old_id: &str, new_id: &str) {
        for node in self.groups.values_mut() {
            node.replace_item(old_id, new_id);
        }
    }

    /// Spawns every item the group produces, born at [`TimePoint::EPOCH`].
    pub fn items_from(&self, items: &dyn ItemFactory, group_id: &str, rng: &mut dyn SpawnRng) -> Vec<Item> {
        self.items_from_at(items, group_id, TimePoint::EPOCH, rng)
    }

    /// Spawns every item the group produces.
    pub fn items_from_at(
        &self,
        items: &dyn ItemFactory,
        group_id: &str,
        birthday: TimePoint,
        rng: &mut dyn SpawnRng,
    ) -> Vec<Item> {
        self.items_from_diagnosed(items, group_id, birthday, rng).0
    }

    /// Spawns every item the group produces, along with the diagnostics
    /// raised on the way.
    ///
    /// # Examples
    ///
    /// ```
    /// use item_groups::{GroupRegistry, ItemGroup, ItemTypeCatalog, ScriptedRng, SpawnError, TimePoint};
    ///
    /// let mut registry = GroupRegistry::new();
    /// let mut loop_group = ItemGroup::collection(100);
    /// loop_group.add_group_entry("loop", 100);
    /// registry.register("loop", loop_group);
    ///
    /// let catalog = ItemTypeCatalog::new();
    /// let mut rng = ScriptedRng::new([]);
    /// let (items, diagnostics) = registry.items_from_diagnosed(&catalog, "loop", TimePoint::EPOCH, &mut rng);
    /// assert!(items.is_empty());
    /// assert_eq!(diagnostics, vec![SpawnError::Recursion { id: "loop".to_string() }]);
    /// ```
    pub fn items_from_diagnosed(
        &self,
        items: &dyn ItemFactory,
        group_id: &str,
        birthday: TimePoint,
        rng: &mut dyn SpawnRng,
    ) -> (Vec<Item>, Vec<SpawnError>) {
        let mut ctx = SpawnContext::new(self, items, rng, birthday);
        let created = ctx
            .expand_group(group_id, |group, ctx| group.create_many(ctx))
            .unwrap_or_default();
        (created, ctx.into_diagnostics())
    }

    /// Spawns a single item from the group, born at [`TimePoint::EPOCH`].
    pub fn item_from(&self, items: &dyn ItemFactory, group_id: &str, rng: &mut dyn SpawnRng) -> Option<Item> {
        self.item_from_at(items, group_id, TimePoint::EPOCH, rng)
    }

    /// Spawns a single item from the group.
    pub fn item_from_at(
        &self,
        items: &dyn ItemFactory,
        group_id: &str,
        birthday: TimePoint,
        rng: &mut dyn SpawnRng,
    ) -> Option<Item> {
        let mut ctx = SpawnContext::new(self, items, rng, birthday);
        ctx.expand_group(group_id, |group, ctx| group.create_one(ctx))
            .flatten()
    }

    pub fn group_is_defined(&self, group_id: &str) -> bool {
        self.is_defined(group_id)
    }

    /// Whether the group can ever spawn `type_id`.
    pub fn group_contains_item(&self, group_id: &str, type_id: &str) -> bool {
        self.group(group_id)
            .is_some_and(|group| group.has_item(type_id, self))
    }

    /// Every item type the group can spawn.
    pub fn every_possible_item_from(&self, group_id: &str) -> BTreeSet<String> {
        self.group(group_id)
            .map(|group| group.every_item(self))
            .unwrap_or_default()
    }
}

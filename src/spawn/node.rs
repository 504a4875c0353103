//! # Spawn Nodes
//!
//! The expression tree evaluated at spawn time. Leaves name an item type or
//! another group; composites hold weighted children.

use crate::config::{CORPSE_ID, FIT_ONE_IN, NULL_ID};
use crate::items::flags;
use crate::{
    in_its_container, ConsistencyCheck, GroupLookup, Item, ItemGroup, ItemModifier, RecursionGuard,
    SpawnContext, SpawnError,
};
use std::collections::BTreeSet;

/// What a single entry spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnTarget {
    /// A concrete item type (or the `corpse` sentinel)
    Item(String),
    /// Another group, resolved by id at evaluation time
    Group(String),
    /// Produces nothing; entries end up here after their item is removed
    Nothing,
}

/// A spawn node: one entry of a group, or a nested group.
#[derive(Debug, Clone)]
pub enum SpawnNode {
    /// Single item or single group reference
    Single(SingleSpawn),
    /// Collection or distribution of child nodes
    Group(ItemGroup),
}

impl From<SingleSpawn> for SpawnNode {
    fn from(single: SingleSpawn) -> Self {
        Self::Single(single)
    }
}

impl From<ItemGroup> for SpawnNode {
    fn from(group: ItemGroup) -> Self {
        Self::Group(group)
    }
}

impl SpawnNode {
    /// Relative weight of this node inside its parent.
    pub fn probability(&self) -> i32 {
        match self {
            Self::Single(single) => single.probability,
            Self::Group(group) => group.probability,
        }
    }

    pub(crate) fn set_probability(&mut self, probability: i32) {
        match self {
            Self::Single(single) => single.probability = probability,
            Self::Group(group) => group.probability = probability,
        }
    }

    /// Produces zero or more items.
    pub fn create_many(&self, ctx: &mut SpawnContext<'_>) -> Vec<Item> {
        match self {
            Self::Single(single) => single.create_many(ctx),
            Self::Group(group) => group.create_many(ctx),
        }
    }

    /// Produces at most one item.
    pub fn create_one(&self, ctx: &mut SpawnContext<'_>) -> Option<Item> {
        match self {
            Self::Single(single) => single.create_one(ctx),
            Self::Group(group) => group.create_one(ctx),
        }
    }

    /// Reports every reference below this node that does not resolve.
    pub fn check_consistency(&self, context: &str, check: &mut ConsistencyCheck<'_>) {
        match self {
            Self::Single(single) => single.check_consistency(context, check),
            Self::Group(group) => group.check_consistency(context, check),
        }
    }

    /// Removes references to `type_id`; true when this node is now void.
    pub fn remove_item(&mut self, type_id: &str) -> bool {
        match self {
            Self::Single(single) => single.remove_item(type_id),
            Self::Group(group) => group.remove_item(type_id),
        }
    }

    /// Rewrites references to `old_id` as `new_id`.
    pub fn replace_item(&mut self, old_id: &str, new_id: &str) -> bool {
        match self {
            Self::Single(single) => single.replace_item(old_id, new_id),
            Self::Group(group) => group.replace_item(old_id, new_id),
        }
    }

    /// Whether `type_id` can be spawned from this node, following group references.
    pub fn has_item(&self, type_id: &str, groups: &dyn GroupLookup) -> bool {
        self.has_item_guarded(type_id, groups, &mut RecursionGuard::new())
    }

    /// Every item type this node can spawn, following group references.
    pub fn every_item(&self, groups: &dyn GroupLookup) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        self.collect_items(groups, &mut RecursionGuard::new(), &mut found);
        found
    }

    pub(crate) fn has_item_guarded(
        &self,
        type_id: &str,
        groups: &dyn GroupLookup,
        guard: &mut RecursionGuard,
    ) -> bool {
        match self {
            Self::Single(single) => single.has_item_guarded(type_id, groups, guard),
            Self::Group(group) => group
                .entries()
                .iter()
                .any(|entry| entry.has_item_guarded(type_id, groups, guard)),
        }
    }

    pub(crate) fn collect_items(
        &self,
        groups: &dyn GroupLookup,
        guard: &mut RecursionGuard,
        found: &mut BTreeSet<String>,
    ) {
        match self {
            Self::Single(single) => single.collect_items(groups, guard, found),
            Self::Group(group) => {
                for entry in group.entries() {
                    entry.collect_items(groups, guard, found);
                }
            }
        }
    }
}

/// Leaf entry spawning one item type or expanding one referenced group.
#[derive(Debug, Clone)]
pub struct SingleSpawn {
    pub target: SpawnTarget,
    pub probability: i32,
    pub modifier: Option<ItemModifier>,
}

impl SingleSpawn {
    /// Entry for an item type. The `null` id produces nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use item_groups::{SingleSpawn, SpawnTarget};
    ///
    /// let entry = SingleSpawn::item("flashlight", 40);
    /// assert_eq!(entry.target, SpawnTarget::Item("flashlight".to_string()));
    /// assert_eq!(SingleSpawn::item("null", 10).target, SpawnTarget::Nothing);
    /// ```
    pub fn item(type_id: impl Into<String>, probability: i32) -> Self {
        let type_id = type_id.into();
        let target = if type_id == NULL_ID {
            SpawnTarget::Nothing
        } else {
            SpawnTarget::Item(type_id)
        };
        Self {
            target,
            probability,
            modifier: None,
        }
    }

    /// Entry referencing another group by id.
    pub fn group(group_id: impl Into<String>, probability: i32) -> Self {
        Self {
            target: SpawnTarget::Group(group_id.into()),
            probability,
            modifier: None,
        }
    }

    pub fn with_modifier(mut self, modifier: ItemModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Applies a parent group's ammo and magazine chances to this entry.
    ///
    /// Only non-zero chances are pushed down, creating a modifier if needed.
    pub fn inherit_ammo_mag_chances(&mut self, ammo: i32, magazine: i32) {
        if ammo == 0 && magazine == 0 {
            return;
        }
        let modifier = self.modifier.get_or_insert_with(ItemModifier::default);
        modifier.with_ammo = ammo;
        modifier.with_magazine = magazine;
    }

    pub fn create_one(&self, ctx: &mut SpawnContext<'_>) -> Option<Item> {
        let mut item = match &self.target {
            SpawnTarget::Item(id) if id == CORPSE_ID => ctx.items.make_corpse(ctx.birthday),
            SpawnTarget::Item(id) => ctx.spawn_item(id, "single item")?,
            SpawnTarget::Group(id) => ctx.expand_group(id, |group, ctx| group.create_one(ctx))??,
            SpawnTarget::Nothing => return None,
        };

        if item.has_flag(flags::VARSIZE) && ctx.rng.one_in(FIT_ONE_IN) {
            item.set_flag(flags::FIT);
        }
        Some(match &self.modifier {
            Some(modifier) => modifier.modify(item, ctx),
            None => in_its_container(item, ctx),
        })
    }

    pub fn create_many(&self, ctx: &mut SpawnContext<'_>) -> Vec<Item> {
        let count = match &self.modifier {
            Some(modifier) => modifier.roll_count(ctx),
            None => 1,
        };

        let mut result = Vec::new();
        for _ in 0..count {
            match &self.target {
                SpawnTarget::Item(_) => result.extend(self.create_one(ctx)),
                SpawnTarget::Group(id) => {
                    let Some(items) = ctx.expand_group(id, |group, ctx| group.create_many(ctx)) else {
                        break;
                    };
                    match &self.modifier {
                        Some(modifier) => {
                            for item in items {
                                let item = modifier.modify(item, ctx);
                                result.push(item);
                            }
                        }
                        None => result.extend(items),
                    }
                }
                SpawnTarget::Nothing => break,
            }
        }
        result
    }

    pub fn check_consistency(&self, context: &str, check: &mut ConsistencyCheck<'_>) {
        match &self.target {
            SpawnTarget::Item(id) => {
                if id != CORPSE_ID && !check.items.has_type(id) {
                    check.report(SpawnError::UnknownItem {
                        id: id.clone(),
                        context: context.to_string(),
                    });
                }
            }
            SpawnTarget::Group(id) => {
                if !check.groups.is_defined(id) {
                    check.report(SpawnError::UnknownGroup {
                        id: id.clone(),
                        context: context.to_string(),
                    });
                }
            }
            SpawnTarget::Nothing => {}
        }
        if self.probability <= 0 {
            check.report(SpawnError::ProbabilityOutOfRange(self.probability));
        }
        if let Some(modifier) = &self.modifier {
            modifier.check_consistency(context, check);
        }
    }

    pub fn remove_item(&mut self, type_id: &str) -> bool {
        if let Some(modifier) = &mut self.modifier {
            if modifier.remove_item(type_id) {
                self.target = SpawnTarget::Nothing;
                return true;
            }
        }
        if matches!(&self.target, SpawnTarget::Item(id) if id == type_id) {
            self.target = SpawnTarget::Nothing;
            return true;
        }
        self.target == SpawnTarget::Nothing
    }

    pub fn replace_item(&mut self, old_id: &str, new_id: &str) -> bool {
        let mut replaced = match &mut self.modifier {
            Some(modifier) => modifier.replace_item(old_id, new_id),
            None => false,
        };
        if let SpawnTarget::Item(id) = &mut self.target {
            if id.as_str() == old_id {
                *id = new_id.to_string();
                replaced = true;
            }
        }
        replaced || self.target == SpawnTarget::Nothing
    }

    fn has_item_guarded(&self, type_id: &str, groups: &dyn GroupLookup, guard: &mut RecursionGuard) -> bool {
        match &self.target {
            SpawnTarget::Item(id) => id == type_id,
            SpawnTarget::Group(id) => {
                let Some(group) = groups.group(id) else {
                    return false;
                };
                if !guard.enter(id) {
                    return false;
                }
                let found = group.has_item_guarded(type_id, groups, guard);
                guard.leave(id);
                found
            }
            SpawnTarget::Nothing => false,
        }
    }

    fn collect_items(&self, groups: &dyn GroupLookup, guard: &mut RecursionGuard, found: &mut BTreeSet<String>) {
        match &self.target {
            SpawnTarget::Item(id) => {
                found.insert(id.clone());
            }
            SpawnTarget::Group(id) => {
                let Some(group) = groups.group(id) else {
                    return;
                };
                if guard.enter(id) {
                    group.collect_items(groups, guard, found);
                    guard.leave(id);
                }
            }
            SpawnTarget::Nothing => {}
        }
    }
}

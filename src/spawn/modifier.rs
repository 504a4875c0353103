//! # Item Modifiers
//!
//! Randomization applied to each freshly created item: damage, dirt, charges,
//! ammo, magazine, container, contents, flags and postprocessing, in that
//! order.

use crate::config::{DAMAGE_SCALE, DEFAULT_DIRT_RANGE, UNLUBRICATED_ONE_IN, UNSET_CHARGES};
use crate::items::{faults, flags, DIRT_VAR};
use crate::{ConsistencyCheck, Item, SpawnContext, SpawnError, SpawnNode};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Transform applied to an item after every other modification.
pub type Postprocess = Arc<dyn Fn(Item) -> Item + Send + Sync>;

/// Randomization rules for one spawned item.
///
/// Ranges are inclusive `(min, max)` pairs. A charge bound of `-1` means
/// "unspecified".
#[derive(Clone)]
pub struct ItemModifier {
    pub damage: (i32, i32),
    pub count: (i32, i32),
    pub dirt: (i32, i32),
    pub charges: (i32, i32),
    /// Percent chance of loading ammo into an empty tool, gun or magazine
    pub with_ammo: i32,
    /// Percent chance of inserting the default magazine
    pub with_magazine: i32,
    /// Which ammo to load, instead of the item's default
    pub ammo: Option<Box<SpawnNode>>,
    /// Container to put the item in, instead of its default container
    pub container: Option<Box<SpawnNode>>,
    /// Items to put inside the result
    pub contents: Option<Box<SpawnNode>>,
    pub custom_flags: BTreeSet<String>,
    pub postprocess_fns: Vec<Postprocess>,
}

impl Default for ItemModifier {
    fn default() -> Self {
        Self {
            damage: (0, 0),
            count: (1, 1),
            dirt: DEFAULT_DIRT_RANGE,
            charges: (UNSET_CHARGES, UNSET_CHARGES),
            with_ammo: 0,
            with_magazine: 0,
            ammo: None,
            container: None,
            contents: None,
            custom_flags: BTreeSet::new(),
            postprocess_fns: Vec::new(),
        }
    }
}

impl fmt::Debug for ItemModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemModifier")
            .field("damage", &self.damage)
            .field("count", &self.count)
            .field("dirt", &self.dirt)
            .field("charges", &self.charges)
            .field("with_ammo", &self.with_ammo)
            .field("with_magazine", &self.with_magazine)
            .field("ammo", &self.ammo)
            .field("container", &self.container)
            .field("contents", &self.contents)
            .field("custom_flags", &self.custom_flags)
            .field("postprocess_fns", &self.postprocess_fns.len())
            .finish()
    }
}

/// Puts `item` into its type's default container, if it declares one.
///
/// Liquids fill the container completely.
pub fn in_its_container(mut item: Item, ctx: &mut SpawnContext<'_>) -> Item {
    let Some(container_id) = item.item_type().default_container.clone() else {
        return item;
    };
    match ctx.spawn_item(&container_id, "default container") {
        Some(mut container) => {
            if item.is_liquid() {
                item.charges = item.charges_per_volume(container.container_capacity()).max(1);
            }
            container.put_in(item);
            container
        }
        None => item,
    }
}

impl ItemModifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a postprocessing step; steps run in registration order.
    pub fn add_postprocess<F>(&mut self, step: F)
    where
        F: Fn(Item) -> Item + Send + Sync + 'static,
    {
        self.postprocess_fns.push(Arc::new(step));
    }

    pub fn postprocess_count(&self) -> usize {
        self.postprocess_fns.len()
    }

    /// How many times the owning entry is expanded.
    pub fn roll_count(&self, ctx: &mut SpawnContext<'_>) -> i32 {
        let (min, max) = self.count;
        if min == max {
            min
        } else {
            ctx.rng.rng(min, max)
        }
    }

    /// Applies every rule to a freshly created item.
    pub fn modify(&self, mut item: Item, ctx: &mut SpawnContext<'_>) -> Item {
        let damage = ctx.rng.rng(self.damage.0, self.damage.1);
        item.set_damage(damage.saturating_mul(DAMAGE_SCALE));

        // Bows and the like never foul
        if item.is_gun() && !item.has_flag(flags::PRIMITIVE_RANGED_WEAPON) && !item.has_flag(flags::NON_FOULING) {
            let dirt = ctx.rng.rng(self.dirt.0, self.dirt.1);
            if dirt > 0 {
                item.set_var(DIRT_VAR, i64::from(dirt));
                item.add_fault(faults::GUN_DIRT);
            } else if ctx.rng.one_in(UNLUBRICATED_ONE_IN) && !item.has_flag(flags::NEEDS_NO_LUBE) {
                item.add_fault(faults::GUN_UNLUBRICATED);
            }
        }

        let container = self.resolve_container(&item, ctx);
        let max_capacity = self.max_capacity(&item, container.as_ref());

        let mut ch = UNSET_CHARGES;
        if self.charges == (UNSET_CHARGES, UNSET_CHARGES) {
            if container.is_some() && item.is_liquid() {
                item.charges = max_capacity.max(1);
            }
        } else {
            ch = self.roll_charges(max_capacity, ctx);
        }

        if ch != UNSET_CHARGES {
            if item.count_by_charges() || item.is_liquid() {
                // A stack of zero makes no sense
                item.charges = ch.max(1);
            } else if item.is_tool() {
                let quantity = ch.min(item.ammo_capacity());
                item.charges = quantity;
                if item.accepts_ammo() && quantity > 0 {
                    if let Some(ammo) = item.ammo_default().map(str::to_string) {
                        item.ammo_set(&ammo, Some(quantity));
                    }
                }
            } else if item.can_have_charges() {
                item.charges = ch;
            }
        }

        if ch > 0 && (item.is_gun() || item.is_magazine()) {
            if let Some(ammo) = self.resolve_ammo(&item, ctx) {
                load_ammo(&mut item, &ammo, Some(ch), ctx);
            }
            if item.ammo_data().is_some() && item.magazine_integral() {
                item.charges = item.charges.min(item.ammo_capacity());
            } else {
                item.charges = 0;
            }
        }

        if item.is_tool() || item.is_gun() || item.is_magazine() {
            let ammo_roll = ctx.rng.rng(0, 99);
            let magazine_roll = ctx.rng.rng(0, 99);
            let spawn_ammo = ammo_roll < self.with_ammo
                && item.ammo_remaining() == 0
                && ch == UNSET_CHARGES
                && (!item.is_tool() || item.item_type().rand_charges.is_empty());
            let spawn_magazine = magazine_roll < self.with_magazine
                && item.magazine_current().is_none()
                && item.magazine_default().is_some();

            if spawn_magazine {
                insert_default_magazine(&mut item, ctx);
            }
            if spawn_ammo {
                if let Some(ammo) = self.resolve_ammo(&item, ctx) {
                    load_ammo(&mut item, &ammo, None, ctx);
                }
            }
        }

        if let Some(mut container) = container {
            container.put_in(item);
            item = container;
        }

        if let Some(contents) = &self.contents {
            for content in contents.create_many(ctx) {
                item.put_in(content);
            }
        }

        for flag in &self.custom_flags {
            item.set_flag(flag.clone());
        }

        for step in &self.postprocess_fns {
            item = step(item);
        }
        item
    }

    /// Container from this modifier, falling back to the type's default.
    fn resolve_container(&self, item: &Item, ctx: &mut SpawnContext<'_>) -> Option<Item> {
        let requested = self.container.as_ref().and_then(|node| node.create_one(ctx));
        if requested.is_some() {
            return requested;
        }
        let default_id = item.item_type().default_container.as_deref()?;
        ctx.spawn_item(default_id, "default container")
    }

    /// Upper bound for charges implied by ammo capacity or container size.
    fn max_capacity(&self, item: &Item, container: Option<&Item>) -> i32 {
        if self.charges.0 != UNSET_CHARGES && self.charges.1 == UNSET_CHARGES && item.ammo_capacity() > 0 {
            return item.ammo_capacity();
        }
        match container {
            Some(container)
                if item.is_liquid() || (!item.is_tool() && !item.is_gun() && !item.is_magazine()) =>
            {
                item.charges_per_volume(container.container_capacity())
            }
            _ => UNSET_CHARGES,
        }
    }

    /// Draws a charge count from the (clamped) charge range.
    fn roll_charges(&self, max_capacity: i32, ctx: &mut SpawnContext<'_>) -> i32 {
        let mut min = if self.charges.0 == UNSET_CHARGES { 0 } else { self.charges.0 };
        let mut max = if self.charges.1 == UNSET_CHARGES { max_capacity } else { self.charges.1 };

        if max_capacity != UNSET_CHARGES && (max > max_capacity || (min != 1 && max == UNSET_CHARGES)) {
            max = max_capacity;
        }
        if min > max {
            min = max;
        }
        if min == max {
            min
        } else {
            ctx.rng.rng(min, max)
        }
    }

    /// Ammo type to load: from the ammo node if present, else the default.
    fn resolve_ammo(&self, item: &Item, ctx: &mut SpawnContext<'_>) -> Option<String> {
        match &self.ammo {
            Some(node) => node.create_one(ctx).map(|ammo| ammo.type_id().to_string()),
            None if item.accepts_ammo() => item.ammo_default().map(str::to_string),
            None => None,
        }
    }

    pub fn check_consistency(&self, context: &str, check: &mut ConsistencyCheck<'_>) {
        if let Some(ammo) = &self.ammo {
            ammo.check_consistency(&format!("ammo of {}", context), check);
        }
        if let Some(container) = &self.container {
            container.check_consistency(&format!("container of {}", context), check);
        }
        if let Some(contents) = &self.contents {
            contents.check_consistency(&format!("contents of {}", context), check);
        }
        if !(0..=100).contains(&self.with_ammo) {
            check.report(SpawnError::AmmoChanceOutOfRange(self.with_ammo));
        }
        if !(0..=100).contains(&self.with_magazine) {
            check.report(SpawnError::MagazineChanceOutOfRange(self.with_magazine));
        }
    }

    /// Removes references to `type_id` from the ammo, container and contents nodes.
    ///
    /// Returns true when the container node emptied, which voids the owner.
    pub fn remove_item(&mut self, type_id: &str) -> bool {
        if self.ammo.as_mut().is_some_and(|ammo| ammo.remove_item(type_id)) {
            self.ammo = None;
        }
        let container_emptied = self
            .container
            .as_mut()
            .is_some_and(|container| container.remove_item(type_id));
        if container_emptied {
            self.container = None;
        }
        if self.contents.as_mut().is_some_and(|contents| contents.remove_item(type_id)) {
            self.contents = None;
        }
        container_emptied
    }

    /// Rewrites references in the nested nodes; true when the container node matched.
    pub fn replace_item(&mut self, old_id: &str, new_id: &str) -> bool {
        if let Some(ammo) = &mut self.ammo {
            ammo.replace_item(old_id, new_id);
        }
        if let Some(contents) = &mut self.contents {
            contents.replace_item(old_id, new_id);
        }
        match &mut self.container {
            Some(container) => container.replace_item(old_id, new_id),
            None => false,
        }
    }
}

/// Inserts the item's default magazine.
fn insert_default_magazine(item: &mut Item, ctx: &mut SpawnContext<'_>) {
    let Some(magazine_id) = item.magazine_default().map(str::to_string) else {
        return;
    };
    if let Some(magazine) = ctx.spawn_item(&magazine_id, "default magazine") {
        item.set_magazine(magazine);
    }
}

/// Loads ammo, giving magazine-fed items their default magazine first.
fn load_ammo(item: &mut Item, ammo: &str, quantity: Option<i32>, ctx: &mut SpawnContext<'_>) {
    if !item.magazine_integral() && item.magazine_current().is_none() {
        insert_default_magazine(item, ctx);
    }
    item.ammo_set(ammo, quantity);
}

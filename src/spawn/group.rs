//! # Item Groups
//!
//! Composite spawn nodes. A collection rolls every entry independently against
//! its probability as a percent chance; a distribution picks exactly one entry
//! weighted by the entries' probabilities.

use crate::config::COLLECTION_MAX_PROBABILITY;
use crate::{ConsistencyCheck, Item, SingleSpawn, SpawnContext, SpawnError, SpawnNode};

/// How a group chooses among its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Every entry is rolled independently
    Collection,
    /// Exactly one entry is picked by weight
    Distribution,
}

impl GroupKind {
    /// Parses a group subtype name. `old` is the legacy name of distributions.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "collection" => Some(Self::Collection),
            "distribution" | "old" => Some(Self::Distribution),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Distribution => "distribution",
        }
    }
}

/// A weighted group of spawn nodes.
///
/// `sum_prob` always equals the sum of the stored entries' probabilities;
/// entries are only added through [`ItemGroup::add_entry`] and only dropped
/// through [`ItemGroup::remove_item`], both of which keep it in sync.
///
/// # Examples
///
/// ```
/// use item_groups::{GroupKind, ItemGroup};
///
/// let mut group = ItemGroup::new(GroupKind::Collection, 100, 0, 0);
/// group.add_item_entry("bandage", 250);
/// group.add_item_entry("aspirin", 0);
/// assert_eq!(group.len(), 1);
/// assert_eq!(group.sum_weight(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct ItemGroup {
    kind: GroupKind,
    /// Weight of this group inside its parent
    pub probability: i32,
    with_ammo: i32,
    with_magazine: i32,
    entries: Vec<SpawnNode>,
    sum_prob: i64,
}

impl ItemGroup {
    /// Creates an empty group.
    ///
    /// Out-of-range probability and chances are logged here and reported
    /// again by [`ItemGroup::check_consistency`].
    pub fn new(kind: GroupKind, probability: i32, ammo_chance: i32, magazine_chance: i32) -> Self {
        let group = Self {
            kind,
            probability,
            with_ammo: ammo_chance,
            with_magazine: magazine_chance,
            entries: Vec::new(),
            sum_prob: 0,
        };
        for problem in group.configuration_problems() {
            log::warn!("{}", problem);
        }
        group
    }

    pub fn collection(probability: i32) -> Self {
        Self::new(GroupKind::Collection, probability, 0, 0)
    }

    pub fn distribution(probability: i32) -> Self {
        Self::new(GroupKind::Distribution, probability, 0, 0)
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn ammo_chance(&self) -> i32 {
        self.with_ammo
    }

    pub fn magazine_chance(&self) -> i32 {
        self.with_magazine
    }

    /// Sum of the entries' probabilities.
    ///
    /// Held as `i64`: distribution weights are unbounded, so their sum can
    /// exceed `i32::MAX`.
    pub fn sum_weight(&self) -> i64 {
        self.sum_prob
    }

    pub fn entries(&self) -> &[SpawnNode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry.
    ///
    /// Entries with a probability of zero or less are discarded. Inside a
    /// collection the probability is capped at 100. Single entries take over
    /// this group's current ammo and magazine chances.
    pub fn add_entry(&mut self, entry: impl Into<SpawnNode>) {
        let mut entry = entry.into();
        if entry.probability() <= 0 {
            return;
        }
        if self.kind == GroupKind::Collection {
            entry.set_probability(entry.probability().min(COLLECTION_MAX_PROBABILITY));
        }
        self.sum_prob += i64::from(entry.probability());

        if let SpawnNode::Single(single) = &mut entry {
            single.inherit_ammo_mag_chances(self.with_ammo, self.with_magazine);
        }
        self.entries.push(entry);
    }

    pub fn add_item_entry(&mut self, type_id: &str, probability: i32) {
        self.add_entry(SingleSpawn::item(type_id, probability));
    }

    pub fn add_group_entry(&mut self, group_id: &str, probability: i32) {
        self.add_entry(SingleSpawn::group(group_id, probability));
    }

    /// Picks the entry a distribution expands for one roll.
    fn pick(&self, ctx: &mut SpawnContext<'_>) -> Option<&SpawnNode> {
        if self.sum_prob <= 0 {
            return None;
        }
        let mut p = ctx.rng.rng_wide(0, self.sum_prob - 1);
        for entry in &self.entries {
            p -= i64::from(entry.probability());
            if p < 0 {
                return Some(entry);
            }
        }
        None
    }

    fn rolls(entry: &SpawnNode, ctx: &mut SpawnContext<'_>) -> bool {
        ctx.rng.rng(0, 99) < entry.probability()
    }

    pub fn create_many(&self, ctx: &mut SpawnContext<'_>) -> Vec<Item> {
        match self.kind {
            GroupKind::Collection => {
                let mut result = Vec::new();
                for entry in &self.entries {
                    if Self::rolls(entry, ctx) {
                        result.extend(entry.create_many(ctx));
                    }
                }
                result
            }
            GroupKind::Distribution => match self.pick(ctx) {
                Some(entry) => entry.create_many(ctx),
                None => Vec::new(),
            },
        }
    }

    /// Produces at most one item.
    ///
    /// A collection returns the result of the first entry whose roll
    /// succeeds, trying entries in order.
    pub fn create_one(&self, ctx: &mut SpawnContext<'_>) -> Option<Item> {
        match self.kind {
            GroupKind::Collection => {
                for entry in &self.entries {
                    if Self::rolls(entry, ctx) {
                        return entry.create_one(ctx);
                    }
                }
                None
            }
            GroupKind::Distribution => self.pick(ctx)?.create_one(ctx),
        }
    }

    fn configuration_problems(&self) -> Vec<SpawnError> {
        let mut problems = Vec::new();
        let probability_valid = match self.kind {
            GroupKind::Collection => (1..=COLLECTION_MAX_PROBABILITY).contains(&self.probability),
            GroupKind::Distribution => self.probability > 0,
        };
        if !probability_valid {
            problems.push(SpawnError::ProbabilityOutOfRange(self.probability));
        }
        if !(0..=100).contains(&self.with_ammo) {
            problems.push(SpawnError::AmmoChanceOutOfRange(self.with_ammo));
        }
        if !(0..=100).contains(&self.with_magazine) {
            problems.push(SpawnError::MagazineChanceOutOfRange(self.with_magazine));
        }
        problems
    }

    pub fn check_consistency(&self, context: &str, check: &mut ConsistencyCheck<'_>) {
        for problem in self.configuration_problems() {
            check.report(problem);
        }
        let entry_context = format!("item in {}", context);
        for entry in &self.entries {
            entry.check_consistency(&entry_context, check);
        }
    }

    /// Drops every entry that became void; true when the group is now empty.
    pub fn remove_item(&mut self, type_id: &str) -> bool {
        let mut removed_weight = 0i64;
        self.entries.retain_mut(|entry| {
            if entry.remove_item(type_id) {
                removed_weight += i64::from(entry.probability());
                false
            } else {
                true
            }
        });
        self.sum_prob -= removed_weight;
        self.entries.is_empty()
    }

    pub fn replace_item(&mut self, old_id: &str, new_id: &str) -> bool {
        for entry in &mut self.entries {
            entry.replace_item(old_id, new_id);
        }
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemTypeCatalog, ScriptedRng, SpawnContext, TimePoint};
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn catalog(ids: &[&str]) -> ItemTypeCatalog {
        let mut catalog = ItemTypeCatalog::new();
        for id in ids {
            catalog.insert(crate::ItemType::new(*id));
        }
        catalog
    }

    fn spawned_ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.type_id()).collect()
    }

    #[test]
    fn test_distribution_walks_cumulative_weights() {
        let items = catalog(&["a", "b", "c"]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut group = ItemGroup::distribution(100);
        group.add_item_entry("a", 10);
        group.add_item_entry("b", 20);
        group.add_item_entry("c", 70);
        assert_eq!(group.sum_weight(), 100);

        for (draw, expected) in [(0, "a"), (9, "a"), (10, "b"), (25, "b"), (29, "b"), (30, "c"), (99, "c")] {
            let mut rng = ScriptedRng::new([draw]);
            let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
            let created = group.create_many(&mut ctx);
            assert_eq!(spawned_ids(&created), vec![expected], "draw {}", draw);
        }
    }

    #[test]
    fn test_distribution_weights_sum_past_i32() {
        let items = catalog(&["a", "b"]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut group = ItemGroup::distribution(100);
        group.add_item_entry("a", 2_000_000_000);
        group.add_item_entry("b", 2_000_000_000);
        assert_eq!(group.sum_weight(), 4_000_000_000);

        let mut rng = ScriptedRng::new([1_999_999_999]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        assert_eq!(spawned_ids(&group.create_many(&mut ctx)), vec!["a"]);

        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        for _ in 0..50 {
            assert_eq!(group.create_many(&mut ctx).len(), 1);
        }

        group.remove_item("a");
        assert_eq!(group.sum_weight(), 2_000_000_000);
    }

    #[test]
    fn test_distribution_create_one_expands_single_entry() {
        let items = catalog(&["a", "b"]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut group = ItemGroup::distribution(100);
        group.add_item_entry("a", 1);
        group.add_item_entry("b", 1000);
        assert_eq!(group.sum_weight(), 1001);

        let mut rng = ScriptedRng::new([500]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let item = group.create_one(&mut ctx).unwrap();
        assert_eq!(item.type_id(), "b");
    }

    #[test]
    fn test_collection_rolls_every_entry() {
        let items = catalog(&["a", "b", "c"]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut group = ItemGroup::collection(100);
        group.add_item_entry("a", 50);
        group.add_item_entry("b", 50);
        group.add_item_entry("c", 50);

        // Rolls below 50 succeed
        let mut rng = ScriptedRng::new([10, 80, 49]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let created = group.create_many(&mut ctx);
        assert_eq!(spawned_ids(&created), vec!["a", "c"]);
    }

    #[test]
    fn test_collection_create_one_stops_at_first_success() {
        let items = catalog(&["a", "b", "c"]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut group = ItemGroup::collection(100);
        group.add_item_entry("a", 50);
        group.add_item_entry("b", 50);
        group.add_item_entry("c", 50);

        let mut rng = ScriptedRng::new([70, 20, 0]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let item = group.create_one(&mut ctx).unwrap();
        assert_eq!(item.type_id(), "b");
        drop(ctx);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_collection_caps_probability() {
        let mut group = ItemGroup::collection(100);
        group.add_item_entry("a", 400);
        assert_eq!(group.entries()[0].probability(), 100);
        assert_eq!(group.sum_weight(), 100);

        let mut distribution = ItemGroup::distribution(100);
        distribution.add_item_entry("a", 400);
        assert_eq!(distribution.sum_weight(), 400);
    }

    #[test]
    fn test_non_positive_entries_are_discarded() {
        let mut group = ItemGroup::distribution(100);
        group.add_item_entry("a", 30);
        group.add_item_entry("b", 0);
        group.add_item_entry("c", -5);
        group.add_entry(ItemGroup::collection(0));

        assert_eq!(group.len(), 1);
        assert_eq!(group.sum_weight(), 30);
    }

    #[test]
    fn test_ammo_chances_are_pushed_down_at_insertion() {
        let mut group = ItemGroup::new(GroupKind::Collection, 100, 40, 60);
        group.add_item_entry("rifle", 100);

        let SpawnNode::Single(single) = &group.entries()[0] else {
            panic!("expected a single entry");
        };
        let modifier = single.modifier.as_ref().unwrap();
        assert_eq!(modifier.with_ammo, 40);
        assert_eq!(modifier.with_magazine, 60);

        // Groups without chances leave entries unmodified
        let mut plain = ItemGroup::collection(100);
        plain.add_item_entry("rifle", 100);
        let SpawnNode::Single(single) = &plain.entries()[0] else {
            panic!("expected a single entry");
        };
        assert!(single.modifier.is_none());
    }

    #[test]
    fn test_remove_item_keeps_sum_in_sync() {
        let mut group = ItemGroup::collection(100);
        group.add_item_entry("x", 50);
        group.add_item_entry("y", 30);

        assert!(!group.remove_item("x"));
        assert_eq!(group.sum_weight(), 30);
        assert_eq!(group.len(), 1);

        assert!(group.remove_item("y"));
        assert_eq!(group.sum_weight(), 0);
        assert!(group.is_empty());
    }

    #[test]
    fn test_empty_distribution_produces_nothing() {
        let items = catalog(&[]);
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let group = ItemGroup::distribution(100);
        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);

        assert!(group.create_many(&mut ctx).is_empty());
        assert!(group.create_one(&mut ctx).is_none());
    }

    #[test]
    fn test_subtype_names() {
        assert_eq!(GroupKind::from_subtype("collection"), Some(GroupKind::Collection));
        assert_eq!(GroupKind::from_subtype("distribution"), Some(GroupKind::Distribution));
        assert_eq!(GroupKind::from_subtype("old"), Some(GroupKind::Distribution));
        assert_eq!(GroupKind::from_subtype("bag"), None);
    }
}

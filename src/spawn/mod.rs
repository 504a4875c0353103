//! # Spawn Module
//!
//! Evaluation of spawn node trees into concrete items.
//!
//! A spawn call builds a [`SpawnContext`], hands it to the root node and lets
//! the tree recurse: composites roll or pick children, group references
//! resolve through a [`GroupLookup`] under the [`RecursionGuard`], and single
//! items run their [`ItemModifier`] before being handed back.

pub mod context;
pub mod group;
pub mod guard;
pub mod modifier;
pub mod node;
pub mod rng;

pub use context::*;
pub use group::*;
pub use guard::*;
pub use modifier::*;
pub use node::*;
pub use rng::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Point in game time, in turns. Every created item records one as its birthday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimePoint(pub u64);

impl TimePoint {
    /// Birthday used when a caller does not supply one.
    pub const EPOCH: TimePoint = TimePoint(0);
}

/// Resolves group ids to their spawn trees.
pub trait GroupLookup {
    /// Looks up a group by id.
    fn group(&self, group_id: &str) -> Option<&SpawnNode>;

    /// Whether a group with this id is defined.
    fn is_defined(&self, group_id: &str) -> bool {
        self.group(group_id).is_some()
    }
}

impl GroupLookup for HashMap<String, SpawnNode> {
    fn group(&self, group_id: &str) -> Option<&SpawnNode> {
        self.get(group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemType, ItemTypeCatalog, SpawnError};

    fn catalog() -> ItemTypeCatalog {
        let mut catalog = ItemTypeCatalog::new();
        catalog.insert(ItemType::new("rock"));
        let mut shirt = ItemType::new("shirt").with_flag(crate::items::flags::VARSIZE);
        shirt.default_container = Some("box".to_string());
        catalog.insert(shirt);
        catalog.insert(ItemType::new("box"));
        catalog
    }

    fn group_of(entries: Vec<SpawnNode>) -> SpawnNode {
        let mut group = ItemGroup::collection(100);
        for entry in entries {
            group.add_entry(entry);
        }
        group.into()
    }

    #[test]
    fn test_self_reference_is_aborted() {
        let items = catalog();
        let mut groups = HashMap::new();
        groups.insert(
            "g".to_string(),
            group_of(vec![SingleSpawn::item("rock", 100).into(), SingleSpawn::group("g", 100).into()]),
        );

        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let created = SpawnNode::from(SingleSpawn::group("g", 100)).create_many(&mut ctx);

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].type_id(), "rock");
        assert_eq!(ctx.diagnostics(), [SpawnError::Recursion { id: "g".to_string() }]);
        assert!(ctx.guard.is_empty());
    }

    #[test]
    fn test_mutual_recursion_is_aborted_at_second_entry() {
        let items = catalog();
        let mut groups = HashMap::new();
        groups.insert("a".to_string(), group_of(vec![SingleSpawn::group("b", 100).into()]));
        groups.insert("b".to_string(), group_of(vec![SingleSpawn::group("a", 100).into()]));

        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let root = SpawnNode::from(SingleSpawn::group("a", 100));

        assert!(root.create_many(&mut ctx).is_empty());
        assert!(root.create_one(&mut ctx).is_none());
        assert_eq!(ctx.diagnostics().len(), 2);
        assert!(ctx
            .diagnostics()
            .iter()
            .all(|error| *error == SpawnError::Recursion { id: "a".to_string() }));
        assert!(ctx.guard.is_empty());
    }

    #[test]
    fn test_unknown_group_keeps_guard_balanced() {
        let items = catalog();
        let mut groups = HashMap::new();
        groups.insert(
            "outer".to_string(),
            group_of(vec![SingleSpawn::group("missing", 100).into(), SingleSpawn::item("rock", 100).into()]),
        );

        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let created = SpawnNode::from(SingleSpawn::group("outer", 100)).create_many(&mut ctx);

        assert_eq!(created.len(), 1);
        assert!(matches!(&ctx.diagnostics()[0], SpawnError::UnknownGroup { id, .. } if id == "missing"));
        assert!(ctx.guard.is_empty());
    }

    #[test]
    fn test_unknown_item_produces_nothing() {
        let items = catalog();
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);

        assert!(SingleSpawn::item("unobtainium", 100).create_one(&mut ctx).is_none());
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn test_corpse_sentinel() {
        let items = catalog();
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint(42));

        let corpse = SingleSpawn::item("corpse", 100).create_one(&mut ctx).unwrap();
        assert_eq!(corpse.type_id(), "corpse");
        assert_eq!(corpse.birthday, TimePoint(42));
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_default_container_without_modifier() {
        let items = catalog();
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        // one_in(3) for the VARSIZE shirt succeeds on 0
        let mut rng = ScriptedRng::new([0]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);

        let boxed = SingleSpawn::item("shirt", 100).create_one(&mut ctx).unwrap();
        assert_eq!(boxed.type_id(), "box");
        let shirt = &boxed.contents()[0];
        assert!(shirt.has_flag(crate::items::flags::FIT));

        // A modifier takes over container decisions
        let plain = SingleSpawn::item("shirt", 100)
            .with_modifier(ItemModifier::default())
            .create_one(&mut ctx)
            .unwrap();
        assert_eq!(plain.type_id(), "box");
    }

    #[test]
    fn test_count_repeats_entry() {
        let items = catalog();
        let groups: HashMap<String, SpawnNode> = HashMap::new();
        let mut rng = ScriptedRng::new([4]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);

        let modifier = ItemModifier {
            count: (2, 6),
            ..ItemModifier::default()
        };
        let created = SingleSpawn::item("rock", 100).with_modifier(modifier).create_many(&mut ctx);
        assert_eq!(created.len(), 4);
    }

    #[test]
    fn test_group_reference_modifier_applies_to_every_result() {
        let items = catalog();
        let mut groups = HashMap::new();
        groups.insert(
            "rocks".to_string(),
            group_of(vec![SingleSpawn::item("rock", 100).into(), SingleSpawn::item("rock", 100).into()]),
        );

        let mut modifier = ItemModifier::default();
        modifier.custom_flags.insert("WET".to_string());
        let mut rng = ScriptedRng::new([]);
        let mut ctx = SpawnContext::new(&groups, &items, &mut rng, TimePoint::EPOCH);
        let created = SingleSpawn::group("rocks", 100).with_modifier(modifier).create_many(&mut ctx);

        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|item| item.has_flag("WET")));
    }

    #[test]
    fn test_every_item_follows_references_without_looping() {
        let mut groups = HashMap::new();
        groups.insert(
            "a".to_string(),
            group_of(vec![SingleSpawn::item("rock", 100).into(), SingleSpawn::group("b", 100).into()]),
        );
        groups.insert(
            "b".to_string(),
            group_of(vec![SingleSpawn::item("box", 100).into(), SingleSpawn::group("a", 100).into()]),
        );

        let root = SpawnNode::from(SingleSpawn::group("a", 100));
        let every = root.every_item(&groups);
        assert_eq!(every.into_iter().collect::<Vec<_>>(), vec!["box", "rock"]);
        assert!(root.has_item("box", &groups));
        assert!(!root.has_item("shirt", &groups));
    }
}

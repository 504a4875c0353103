//! # Spawn Context
//!
//! Everything one top-level spawn call threads through the node tree, and the
//! matching context for consistency checks.

use crate::{GroupLookup, Item, ItemFactory, RecursionGuard, SpawnError, SpawnNode, SpawnRng, TimePoint};

/// State for one top-level `create`/`create_single` invocation.
///
/// Holds the collaborators (group lookup, item factory, random source), the
/// birthday given to every created item, the recursion guard and the
/// diagnostics raised along the way. A context is built fresh per call and
/// never shared.
pub struct SpawnContext<'a> {
    pub groups: &'a dyn GroupLookup,
    pub items: &'a dyn ItemFactory,
    pub rng: &'a mut dyn SpawnRng,
    pub birthday: TimePoint,
    pub guard: RecursionGuard,
    diagnostics: Vec<SpawnError>,
}

impl<'a> SpawnContext<'a> {
    pub fn new(
        groups: &'a dyn GroupLookup,
        items: &'a dyn ItemFactory,
        rng: &'a mut dyn SpawnRng,
        birthday: TimePoint,
    ) -> Self {
        Self {
            groups,
            items,
            rng,
            birthday,
            guard: RecursionGuard::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Logs a diagnostic and keeps it for the caller.
    pub fn report(&mut self, error: SpawnError) {
        log::error!("{}", error);
        self.diagnostics.push(error);
    }

    pub fn diagnostics(&self) -> &[SpawnError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<SpawnError> {
        self.diagnostics
    }

    /// Spawns a plain item by type id, reporting unknown ids.
    pub fn spawn_item(&mut self, type_id: &str, context: &str) -> Option<Item> {
        let item = self.items.spawn(type_id, self.birthday);
        if item.is_none() {
            self.report(SpawnError::UnknownItem {
                id: type_id.to_string(),
                context: context.to_string(),
            });
        }
        item
    }

    /// Runs `expand` on the group named `group_id` with the id on the guard.
    ///
    /// Returns `None`, after reporting, when the group is already being
    /// expanded or is not defined. The guard is balanced on every path.
    pub fn expand_group<T, F>(&mut self, group_id: &str, expand: F) -> Option<T>
    where
        F: FnOnce(&'a SpawnNode, &mut Self) -> T,
    {
        if self.guard.contains(group_id) {
            self.report(SpawnError::Recursion {
                id: group_id.to_string(),
            });
            return None;
        }
        let groups = self.groups;
        let Some(node) = groups.group(group_id) else {
            self.report(SpawnError::UnknownGroup {
                id: group_id.to_string(),
                context: "spawn".to_string(),
            });
            return None;
        };

        self.guard.enter(group_id);
        let result = expand(node, self);
        self.guard.leave(group_id);
        Some(result)
    }
}

/// Collects problems found while validating spawn data.
pub struct ConsistencyCheck<'a> {
    pub groups: &'a dyn GroupLookup,
    pub items: &'a dyn ItemFactory,
    errors: Vec<SpawnError>,
}

impl<'a> ConsistencyCheck<'a> {
    pub fn new(groups: &'a dyn GroupLookup, items: &'a dyn ItemFactory) -> Self {
        Self {
            groups,
            items,
            errors: Vec::new(),
        }
    }

    pub fn report(&mut self, error: SpawnError) {
        log::error!("{}", error);
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[SpawnError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SpawnError> {
        self.errors
    }
}

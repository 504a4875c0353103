//! # Item Groups
//!
//! Declarative, weighted, recursive item spawning for loot tables, crafting
//! results, starting inventories and corpse contents.
//!
//! ## Architecture Overview
//!
//! A spawn request names a group. The group resolves to a tree of spawn nodes
//! which is evaluated top-down:
//!
//! - **Spawn nodes**: single items, references to other groups, collections
//!   (every entry rolled independently) and distributions (exactly one entry
//!   picked by weight)
//! - **Item modifiers**: damage, charges, dirt, ammo, magazine, container,
//!   contents, flags and postprocessing applied to each freshly created item
//! - **Recursion guard**: the stack of groups currently being expanded, used to
//!   abort cyclic references instead of recursing forever
//! - **Group registry**: maps group ids to their definitions and exposes the
//!   top-level operations (`items_from`, `item_from`, ...)
//!
//! Data-authoring defects (unknown ids, cycles, out-of-range chances) never
//! abort a spawn. They are logged, collected as [`SpawnError`] diagnostics, and
//! the affected branch simply produces nothing.

pub mod groups;
pub mod items;
pub mod spawn;

pub use groups::*;
pub use items::*;
pub use spawn::*;

/// Non-fatal diagnostic raised while validating or evaluating spawn data.
///
/// None of these abort a spawn; they are reported and the offending branch
/// produces nothing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// An item type id does not resolve
    #[error("item id {id} is unknown (in {context})")]
    UnknownItem { id: String, context: String },

    /// A group id does not resolve
    #[error("item group id {id} is unknown (in {context})")]
    UnknownGroup { id: String, context: String },

    /// A group transitively includes itself
    #[error("recursion in item spawn list {id}")]
    Recursion { id: String },

    /// Entry or group probability outside its valid domain
    #[error("probability {0} out of range")]
    ProbabilityOutOfRange(i32),

    /// Ammo chance outside [0, 100]
    #[error("ammo chance {0} is out of range")]
    AmmoChanceOutOfRange(i32),

    /// Magazine chance outside [0, 100]
    #[error("magazine chance {0} is out of range")]
    MagazineChanceOutOfRange(i32),

    /// Group subtype is neither "collection" nor "distribution"
    #[error("invalid subtype for item group: {0}")]
    InvalidSubtype(String),
}

/// Error raised while loading item types or group definitions.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Structurally valid JSON that does not describe a group
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

/// Result type used by the loading side of the crate.
pub type LoadResult<T> = Result<T, LoadError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Spawning constants.
pub mod config {
    /// Damage levels per unit of damage in a modifier's damage range
    pub const DAMAGE_SCALE: i32 = 1000;

    /// Dirt range applied to guns unless a group overrides it
    pub const DEFAULT_DIRT_RANGE: (i32, i32) = (0, 500);

    /// Marker for an unspecified end of a charge range
    pub const UNSET_CHARGES: i32 = -1;

    /// Variable-sized items are fitted one time in this many
    pub const FIT_ONE_IN: u32 = 3;

    /// Clean guns are unlubricated one time in this many
    pub const UNLUBRICATED_ONE_IN: u32 = 10;

    /// Upper bound of an entry's probability inside a collection
    pub const COLLECTION_MAX_PROBABILITY: i32 = 100;

    /// Probability assigned to entries that do not state one
    pub const DEFAULT_PROBABILITY: i32 = 100;

    /// Prefix of ids minted for anonymous inline groups
    pub const SYNTHETIC_GROUP_PREFIX: &str = "\u{01F7} ";

    /// Item id that spawns a generic corpse
    pub const CORPSE_ID: &str = "corpse";

    /// Item id that spawns nothing
    pub const NULL_ID: &str = "null";
}

//! # Items Module
//!
//! The item side of spawning: type definitions, instances, and the factory
//! that turns type ids into instances.
//!
//! Item internals are deliberately thin here. Only the state the spawn
//! pipeline reads or writes is modelled.

pub mod catalog;
pub mod item;
pub mod types;

pub use catalog::*;
pub use item::*;
pub use types::*;

/// Item flags consulted or set while spawning.
pub mod flags {
    /// Item comes in sizes and may spawn fitted
    pub const VARSIZE: &str = "VARSIZE";
    /// Item is fitted to its wearer
    pub const FIT: &str = "FIT";
    /// Bows and the like, which never get dirty
    pub const PRIMITIVE_RANGED_WEAPON: &str = "PRIMITIVE_RANGED_WEAPON";
    /// Gun does not accumulate dirt
    pub const NON_FOULING: &str = "NON_FOULING";
    /// Gun never needs lubrication
    pub const NEEDS_NO_LUBE: &str = "NEEDS_NO_LUBE";
}

/// Faults attached to freshly spawned guns.
pub mod faults {
    pub const GUN_DIRT: &str = "fault_gun_dirt";
    pub const GUN_UNLUBRICATED: &str = "fault_gun_unlubricated";
}

/// Item variable holding a gun's dirt level.
pub const DIRT_VAR: &str = "dirt";

//! # Item Instances
//!
//! Concrete items produced by spawning. An item shares its type definition and
//! carries the per-instance state the modifier pipeline touches.

use crate::{ItemCategory, ItemType, TimePoint};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A concrete item instance.
///
/// # Examples
///
/// ```
/// use item_groups::{Item, ItemType, TimePoint};
/// use std::sync::Arc;
///
/// let mut item = Item::new(Arc::new(ItemType::new("rag")), TimePoint::EPOCH);
/// item.set_flag("FIT");
/// assert!(item.has_flag("FIT"));
/// assert_eq!(item.type_id(), "rag");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    #[serde(rename = "type", serialize_with = "serialize_type_id")]
    kind: Arc<ItemType>,
    /// Creation time
    pub birthday: TimePoint,
    /// Damage level, in units of [`crate::config::DAMAGE_SCALE`]
    pub damage: i32,
    /// Charge count (stack size, liquid units, tool fuel, loaded rounds)
    pub charges: i32,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    flags: BTreeSet<String>,
    /// Active faults
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub faults: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    vars: BTreeMap<String, i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ammo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    magazine: Option<Box<Item>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contents: Vec<Item>,
}

fn serialize_type_id<S: Serializer>(kind: &Arc<ItemType>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&kind.id)
}

impl Item {
    /// Creates a fresh, undamaged item of the given type.
    pub fn new(kind: Arc<ItemType>, birthday: TimePoint) -> Self {
        let charges = if kind.count_by_charges { 1 } else { 0 };
        Self {
            kind,
            birthday,
            damage: 0,
            charges,
            flags: BTreeSet::new(),
            faults: BTreeSet::new(),
            vars: BTreeMap::new(),
            ammo: None,
            magazine: None,
            contents: Vec::new(),
        }
    }

    pub fn type_id(&self) -> &str {
        &self.kind.id
    }

    pub fn item_type(&self) -> &ItemType {
        &self.kind
    }

    /// Checks instance flags first, then the flags of the type.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag) || self.kind.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn set_damage(&mut self, damage: i32) {
        self.damage = damage;
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: i64) {
        self.vars.insert(name.into(), value);
    }

    pub fn get_var(&self, name: &str) -> Option<i64> {
        self.vars.get(name).copied()
    }

    pub fn add_fault(&mut self, fault: impl Into<String>) {
        self.faults.insert(fault.into());
    }

    pub fn has_fault(&self, fault: &str) -> bool {
        self.faults.contains(fault)
    }

    pub fn is_gun(&self) -> bool {
        self.kind.category == ItemCategory::Gun
    }

    pub fn is_tool(&self) -> bool {
        self.kind.category == ItemCategory::Tool
    }

    pub fn is_magazine(&self) -> bool {
        self.kind.category == ItemCategory::Magazine
    }

    pub fn is_liquid(&self) -> bool {
        self.kind.liquid
    }

    pub fn count_by_charges(&self) -> bool {
        self.kind.count_by_charges
    }

    pub fn can_have_charges(&self) -> bool {
        self.kind.can_have_charges()
    }

    pub fn ammo_capacity(&self) -> i32 {
        self.kind.ammo_capacity
    }

    pub fn container_capacity(&self) -> i32 {
        self.kind.container_capacity
    }

    /// How many charges of this item fit into `volume`.
    ///
    /// Stackable and liquid items fit `stack_size` charges per `volume` of the
    /// type; anything else fits one charge per `volume`.
    pub fn charges_per_volume(&self, volume: i32) -> i32 {
        let per_stack = self.kind.volume.max(1);
        if self.count_by_charges() || self.is_liquid() {
            volume.saturating_mul(self.kind.stack_size.max(1)) / per_stack
        } else {
            volume / per_stack
        }
    }

    pub fn accepts_ammo(&self) -> bool {
        !self.kind.ammo_types.is_empty()
    }

    pub fn ammo_default(&self) -> Option<&str> {
        self.kind.ammo_default.as_deref()
    }

    pub fn magazine_default(&self) -> Option<&str> {
        self.kind.magazine_default.as_deref()
    }

    /// Integral items hold their ammo as their own charges.
    pub fn magazine_integral(&self) -> bool {
        self.kind.magazine_default.is_none()
    }

    pub fn magazine_current(&self) -> Option<&Item> {
        self.magazine.as_deref()
    }

    pub fn set_magazine(&mut self, magazine: Item) {
        self.magazine = Some(Box::new(magazine));
    }

    /// Type of the ammo currently loaded, looking through the magazine.
    pub fn ammo_data(&self) -> Option<&str> {
        if self.magazine_integral() {
            self.ammo.as_deref()
        } else {
            self.magazine.as_ref().and_then(|mag| mag.ammo_data())
        }
    }

    pub fn ammo_remaining(&self) -> i32 {
        if !self.magazine_integral() {
            return self.magazine.as_ref().map_or(0, |mag| mag.ammo_remaining());
        }
        if self.is_tool() || self.ammo.is_some() {
            self.charges
        } else {
            0
        }
    }

    /// Loads `quantity` rounds of `ammo`, or a full load when `None`.
    ///
    /// Integral items take the rounds as charges. Magazine-fed items load
    /// their current magazine, and do nothing without one.
    pub fn ammo_set(&mut self, ammo: &str, quantity: Option<i32>) {
        if !self.magazine_integral() {
            if let Some(mag) = self.magazine.as_mut() {
                mag.ammo_set(ammo, quantity);
            }
            return;
        }
        let capacity = self.ammo_capacity();
        let quantity = quantity.unwrap_or(capacity);
        let quantity = if capacity > 0 { quantity.min(capacity) } else { quantity };
        self.ammo = Some(ammo.to_string());
        self.charges = quantity.max(0);
    }

    /// Places another item inside this one.
    pub fn put_in(&mut self, item: Item) {
        self.contents.push(item);
    }

    pub fn contents(&self) -> &[Item] {
        &self.contents
    }
}

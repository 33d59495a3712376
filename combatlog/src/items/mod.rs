//! Item stacks and slot-based storage
//!
//! Only what moving items around needs: a stack's identity travels unchanged
//! from a player's inventory into a container or onto the ground.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric item id from the host's item registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub i32);

/// Numeric enchantment id from the host's enchantment registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnchantmentId(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enchantment {
    pub id: EnchantmentId,
    pub level: i32,
}

/// A stack of identical items occupying one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    /// Auxiliary/variant value (damage, color, potion type)
    pub aux: i32,
    pub count: u8,
    pub custom_name: Option<String>,
    pub lore: Vec<String>,
    pub enchantments: Vec<Enchantment>,
}

impl ItemStack {
    pub fn new(item: ItemId, aux: i32, count: u8) -> Self {
        Self {
            item,
            aux,
            count,
            custom_name: None,
            lore: Vec::new(),
            enchantments: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    pub fn with_lore(mut self, lore: Vec<String>) -> Self {
        self.lore = lore;
        self
    }

    pub fn with_enchantment(mut self, id: EnchantmentId, level: i32) -> Self {
        self.enchantments.push(Enchantment { id, level });
        self
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x item {}:{}", self.count, self.item.0, self.aux)?;
        if let Some(ref name) = self.custom_name {
            write!(f, " \"{}\"", name)?;
        }
        Ok(())
    }
}

/// Total number of items across a set of slots
fn count_items<'a>(slots: impl Iterator<Item = &'a Option<ItemStack>>) -> u64 {
    slots.flatten().map(|s| u64::from(s.count)).sum()
}

/// A player's inventory, slots in the host's fixed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Empty inventory with `size` slots
    pub fn with_size(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn from_slots(slots: Vec<Option<ItemStack>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Put a stack into a slot, returning what was there.
    /// Out-of-range indices hand the stack back untouched.
    pub fn set(&mut self, index: usize, stack: ItemStack) -> Result<Option<ItemStack>, ItemStack> {
        match self.slots.get_mut(index) {
            Some(slot) => Ok(slot.replace(stack)),
            None => Err(stack),
        }
    }

    /// Remove and return the stack in a slot
    pub fn take(&mut self, index: usize) -> Option<ItemStack> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Number of non-empty slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn item_count(&self) -> u64 {
        count_items(self.slots.iter())
    }
}

/// Fixed-capacity item storage backing a placed container block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    slots: Vec<Option<ItemStack>>,
}

impl Container {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Place a stack into the lowest free slot.
    /// Returns the slot index, or the stack back when the container is full.
    pub fn insert(&mut self, stack: ItemStack) -> Result<usize, ItemStack> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(stack);
                Ok(index)
            }
            None => Err(stack),
        }
    }

    /// Stored stacks in slot order
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn into_stacks(self) -> Vec<ItemStack> {
        self.slots.into_iter().flatten().collect()
    }

    pub fn item_count(&self) -> u64 {
        count_items(self.slots.iter())
    }
}

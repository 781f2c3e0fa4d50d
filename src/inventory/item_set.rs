//! Fixed-length slot arrays.
//!
//! `ItemSet` is the unit that gets persisted (`active` / `backup`) and the unit
//! the splitter and merger operate on. Every getter hands out a copy: nothing
//! outside the set can mutate its slots through an alias.

use serde::{Deserialize, Serialize};

use super::item::{ItemStack, Slot};

/// An ordered, fixed-length sequence of item slots.
///
/// Serialized as `{ contents: [ <item> | null, ... ] }`. The `contents` key is
/// required; a mapping without it fails to deserialize and callers treat the
/// set as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSet {
    contents: Vec<Slot>,
}

impl ItemSet {
    /// Create a set of `len` empty slots
    pub fn new(len: usize) -> Self {
        Self {
            contents: vec![None; len],
        }
    }

    /// Create a set from raw slots, copying them
    pub fn from_slots(slots: &[Slot]) -> Self {
        Self {
            contents: slots.to_vec(),
        }
    }

    /// Create a dense set (no empty slots) from a list of items
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ItemStack>,
    {
        Self {
            contents: items.into_iter().map(Some).collect(),
        }
    }

    /// Number of slots, empty ones included
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True if there are no slots or every slot is empty
    pub fn is_empty(&self) -> bool {
        self.contents.iter().all(Option::is_none)
    }

    /// Number of occupied slots
    pub fn item_count(&self) -> usize {
        self.contents.iter().filter(|slot| slot.is_some()).count()
    }

    /// Copy of every slot
    pub fn contents(&self) -> Vec<Slot> {
        self.contents.clone()
    }

    /// Copy of one slot; out-of-range reads as empty
    pub fn get(&self, index: usize) -> Slot {
        self.contents.get(index).cloned().flatten()
    }

    /// Copies of the occupied slots, in slot order
    pub fn items(&self) -> Vec<ItemStack> {
        self.contents.iter().flatten().cloned().collect()
    }

    /// Replace every slot with a copy of `slots` (length follows `slots`)
    pub fn set_contents(&mut self, slots: &[Slot]) {
        self.contents = slots.to_vec();
    }

    /// Overwrite a single slot. Returns false if `index` is out of range.
    pub fn set(&mut self, index: usize, slot: Slot) -> bool {
        match self.contents.get_mut(index) {
            Some(target) => {
                *target = slot;
                true
            }
            None => false,
        }
    }

    /// Empty every slot, keeping the length, and return what was there
    pub fn clear(&mut self) -> Vec<Slot> {
        let len = self.contents.len();
        std::mem::replace(&mut self.contents, vec![None; len])
    }

    /// Remove every slot (length becomes 0) and return what was there
    pub fn take_contents(&mut self) -> Vec<Slot> {
        std::mem::take(&mut self.contents)
    }

    /// Slots of `self` followed by the slots of `other`, empty ones kept
    pub fn concat(&self, other: &ItemSet) -> ItemSet {
        let mut contents = Vec::with_capacity(self.len() + other.len());
        contents.extend(self.contents.iter().cloned());
        contents.extend(other.contents.iter().cloned());
        ItemSet { contents }
    }

    /// Index of the first empty slot, scanning left to right
    pub(crate) fn first_empty(&self) -> Option<usize> {
        self.contents.iter().position(Option::is_none)
    }
}

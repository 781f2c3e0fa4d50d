//! Per-session BigInv state for one owner.

use crate::capacity::CapacityResolver;
use crate::config::{Permissions, PLAYER_PLACEHOLDER};
use crate::inventory::{split, ItemSet, ItemStack, Slot};
use crate::principal::{PlayerId, Principal};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HolderError {
    #[error("BigInv capacity must not be 0")]
    ZeroCapacity,

    #[error("slot {slot} out of range for a BigInv of {size} slots")]
    SlotOutOfRange { slot: usize, size: usize },
}

/// One slot write made through a view of a BigInv
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    pub slot: usize,
    pub item: Slot,
}

/// What the platform needs to render a BigInv for a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryView {
    pub owner: PlayerId,
    pub title: String,
    pub contents: ItemSet,
}

/// The live BigInv of one owner while they are online.
///
/// The capacity is fixed when the holder is created; a permission change only
/// takes effect on the next load.
#[derive(Debug)]
pub struct Holder {
    owner: PlayerId,
    owner_name: String,
    size: usize,
    storage: ItemSet,
    title: String,
    viewers: Vec<PlayerId>,
    dirty: bool,
    /// Backup the store has not accepted yet; replaces the stored backup on
    /// the next successful write
    pending_backup: Option<ItemSet>,
}

impl Holder {
    /// Build an empty holder of `size` slots. A zero size is refused.
    pub fn new(
        owner: &dyn Principal,
        size: usize,
        title_template: &str,
    ) -> Result<Self, HolderError> {
        if size == 0 {
            return Err(HolderError::ZeroCapacity);
        }
        Ok(Self {
            owner: owner.id().clone(),
            owner_name: owner.name().to_string(),
            size,
            storage: ItemSet::new(size),
            title: title_template.replace(PLAYER_PLACEHOLDER, owner.name()),
            viewers: Vec::new(),
            dirty: false,
            pending_backup: None,
        })
    }

    /// Build a holder sized by `resolver`, or `None` if the owner has no grant.
    pub fn create(
        owner: &dyn Principal,
        resolver: &dyn CapacityResolver,
        title_template: &str,
    ) -> Option<Self> {
        Self::new(owner, resolver.resolve(owner), title_template).ok()
    }

    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Remember a backup that could not be written. Keeps the holder dirty
    /// until a write carries it.
    pub fn set_pending_backup(&mut self, backup: ItemSet) {
        self.pending_backup = Some(backup);
        self.dirty = true;
    }

    pub fn pending_backup(&self) -> Option<&ItemSet> {
        self.pending_backup.as_ref()
    }

    pub fn take_pending_backup(&mut self) -> Option<ItemSet> {
        self.pending_backup.take()
    }

    pub fn has_valid_storage(&self) -> bool {
        self.size > 0 && self.storage.len() == self.size
    }

    /// Copy of the live storage
    pub fn snapshot(&self) -> ItemSet {
        self.storage.clone()
    }

    pub fn view(&self) -> InventoryView {
        InventoryView {
            owner: self.owner.clone(),
            title: self.title.clone(),
            contents: self.snapshot(),
        }
    }

    /// Install `contents`, fitted to this holder's size.
    ///
    /// Returns the items that did not fit (empty if everything fit). The holder
    /// becomes dirty when the input was longer than the holder, since the
    /// stored shape no longer matches what is persisted.
    pub fn set_contents(&mut self, contents: &ItemSet) -> ItemSet {
        let split = split(contents, self.size);
        self.storage = split.in_bounds;
        if split.truncated {
            self.dirty = true;
            tracing::debug!(
                "[biginv] [set_contents] owner={} packed={} overflow={}",
                self.owner,
                split.packed,
                split.overflow.item_count()
            );
        }
        split.overflow
    }

    /// Empty the live storage and return what was in it
    pub fn clear_contents(&mut self) -> Vec<Slot> {
        self.dirty = true;
        self.storage.clear()
    }

    pub fn set_slot(&mut self, slot: usize, item: Option<ItemStack>) -> Result<(), HolderError> {
        if !self.storage.set(slot, item) {
            return Err(HolderError::SlotOutOfRange {
                slot,
                size: self.size,
            });
        }
        self.dirty = true;
        Ok(())
    }

    /// Apply every write in `changes`, or none of them if any slot is out
    /// of range.
    pub fn apply_changes(&mut self, changes: &[SlotChange]) -> Result<(), HolderError> {
        if let Some(bad) = changes.iter().find(|c| c.slot >= self.size) {
            return Err(HolderError::SlotOutOfRange {
                slot: bad.slot,
                size: self.size,
            });
        }
        for change in changes {
            self.storage.set(change.slot, change.item.clone());
        }
        self.dirty = true;
        Ok(())
    }

    // permission gates

    pub fn can_open(&self, viewer: &dyn Principal, perms: &Permissions) -> bool {
        self.gate(viewer, &perms.see, &perms.see_other)
    }

    pub fn can_change(&self, viewer: &dyn Principal, perms: &Permissions) -> bool {
        self.gate(viewer, &perms.change, &perms.change_other)
    }

    pub fn can_restore_backup(&self, viewer: &dyn Principal, perms: &Permissions) -> bool {
        self.gate(viewer, &perms.backup, &perms.backup_other)
    }

    fn gate(&self, viewer: &dyn Principal, base: &str, other: &str) -> bool {
        viewer.has_permission(base) && (*viewer.id() == self.owner || viewer.has_permission(other))
    }

    // viewers

    pub fn viewers(&self) -> &[PlayerId] {
        &self.viewers
    }

    pub fn add_viewer(&mut self, viewer: &PlayerId) {
        if !self.viewers.contains(viewer) {
            self.viewers.push(viewer.clone());
        }
    }

    /// Returns false if `viewer` was not looking at this BigInv
    pub fn remove_viewer(&mut self, viewer: &PlayerId) -> bool {
        let before = self.viewers.len();
        self.viewers.retain(|v| v != viewer);
        self.viewers.len() != before
    }

    pub fn take_viewers(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.viewers)
    }
}

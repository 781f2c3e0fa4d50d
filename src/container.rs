//! The BigInv registry and its lifecycle operations.
//!
//! A [`Container`] owns one [`Holder`] per online owner and is the only thing
//! that talks to the [`PlayerStore`]. Every operation reports a
//! [`HandlerOutcome`]; persistence errors are logged and never surface as
//! outcomes.

use std::collections::HashMap;

use crate::capacity::{CapacityResolver, PermissionCapacity};
use crate::config::{InvConfig, Messages, Permissions};
use crate::holder::{Holder, SlotChange};
use crate::host::{Host, Notice};
use crate::inventory::{merge, ItemSet, ItemStack, Slot};
use crate::principal::{PlayerId, Principal};
use crate::store::{PlayerDocument, PlayerStore};

/// Result of a container operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Success,
    /// Done, but not completely: a first load with no stored contents, or a
    /// restore that left items in the backup
    PartialSuccess,
    /// Loaded, and the items that did not fit went to the backup
    NeededBackup,
    NoPermission,
    NoHolder,
    NoData,
}

pub struct Container<S, H> {
    permissions: Permissions,
    messages: Messages,
    title_template: String,
    save_on_close: bool,
    resolver: Box<dyn CapacityResolver>,
    store: S,
    host: H,
    holders: HashMap<PlayerId, Holder>,
}

impl<S: PlayerStore, H: Host> Container<S, H> {
    pub fn new(
        config: &InvConfig,
        resolver: Box<dyn CapacityResolver>,
        store: S,
        host: H,
    ) -> Self {
        Self {
            permissions: config.permissions.clone(),
            messages: config.messages.clone(),
            title_template: config.inventory_title.clone(),
            save_on_close: config.save_on_inventory_close,
            resolver,
            store,
            host,
            holders: HashMap::new(),
        }
    }

    /// Container sized by the configured `biginv.size.*` permissions
    pub fn with_permission_capacity(config: &InvConfig, store: S, host: H) -> Self {
        let resolver = PermissionCapacity::from_permissions(&config.permissions, config.max_rows);
        Self::new(config, Box::new(resolver), store, host)
    }

    // lifecycle

    /// Create `owner`'s holder from their stored document.
    pub fn load(&mut self, owner: &dyn Principal) -> HandlerOutcome {
        let id = owner.id().clone();
        if self.holders.contains_key(&id) {
            tracing::warn!("[biginv] [load] session already active, flushing owner={}", id);
            self.save(&id, true);
        }

        let Some(mut holder) =
            Holder::create(owner, self.resolver.as_ref(), &self.title_template)
        else {
            tracing::debug!("[biginv] [load] no capacity grant owner={}", id);
            return HandlerOutcome::NoHolder;
        };

        let mut doc = match self.store.load(&id) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(
                    "[biginv] [load] read failed, using defaults owner={} err={}",
                    id,
                    e
                );
                PlayerDocument::default()
            }
        };
        let first_load = doc.active.is_none();

        let mut contents = doc.active_or_empty();
        let mut old_backup = doc.backup_or_empty();
        let migrated =
            !old_backup.is_empty() && owner.has_permission(&self.permissions.backup_login);
        if migrated {
            contents = contents.concat(&old_backup);
            old_backup = ItemSet::default();
        }

        let overflow = holder.set_contents(&contents);
        let outcome = if !overflow.is_empty() {
            let backup = merge(&overflow, &old_backup);
            tracing::debug!(
                "[biginv] [load] overflow owner={} size={} backup_items={}",
                id,
                holder.size(),
                backup.item_count()
            );
            doc.active = Some(holder.snapshot());
            doc.backup = Some(backup.clone());
            if self.persist(&id, doc) {
                holder.set_dirty(false);
            } else {
                // the old active still holds the overflow; the next save must
                // land the backup before it overwrites active
                holder.set_pending_backup(backup);
            }
            HandlerOutcome::NeededBackup
        } else {
            if migrated {
                tracing::debug!("[biginv] [load] backup moved into active owner={}", id);
                doc.active = Some(holder.snapshot());
                doc.backup = Some(ItemSet::default());
                if self.persist(&id, doc) {
                    holder.set_dirty(false);
                } else {
                    holder.set_pending_backup(ItemSet::default());
                }
            }
            if first_load {
                HandlerOutcome::PartialSuccess
            } else {
                HandlerOutcome::Success
            }
        };

        tracing::debug!(
            "[biginv] [load] owner={} size={} outcome={:?}",
            id,
            holder.size(),
            outcome
        );
        self.holders.insert(id, holder);
        outcome
    }

    /// Write `owner`'s live contents back if they changed, optionally ending
    /// the session.
    pub fn save(&mut self, owner: &PlayerId, close: bool) -> HandlerOutcome {
        match self.write_back(owner, close) {
            Some(_) => HandlerOutcome::Success,
            None => HandlerOutcome::NoHolder,
        }
    }

    /// `None` without a holder, otherwise whether the store now matches the
    /// live contents.
    fn write_back(&mut self, owner: &PlayerId, close: bool) -> Option<bool> {
        let holder = self.holders.get_mut(owner)?;
        let viewers = if close {
            holder.take_viewers()
        } else {
            Vec::new()
        };
        let snapshot = holder.is_dirty().then(|| holder.snapshot());
        let pending = holder.pending_backup().cloned();

        for viewer in viewers {
            self.host.close_view(&viewer);
            if viewer != *owner {
                self.host.notify(Notice::ForceClosed {
                    owner: owner.clone(),
                    viewer,
                    message: self.messages.prefixed(&self.messages.logout_close),
                });
            }
        }

        let in_sync = match snapshot {
            Some(active) => self.update(owner, "save", |doc| {
                doc.active = Some(active);
                if let Some(backup) = pending {
                    doc.backup = Some(backup);
                }
            }),
            None => {
                tracing::debug!("[biginv] [save] not dirty, skipped owner={}", owner);
                true
            }
        };
        if in_sync {
            if let Some(holder) = self.holders.get_mut(owner) {
                holder.take_pending_backup();
            }
        }

        if close {
            self.holders.remove(owner);
        }
        Some(in_sync)
    }

    /// Show `owner`'s BigInv to `viewer`.
    pub fn open(&mut self, owner: &PlayerId, viewer: &dyn Principal) -> HandlerOutcome {
        let Some(holder) = self.holders.get_mut(owner) else {
            return HandlerOutcome::NoHolder;
        };
        if !holder.can_open(viewer, &self.permissions) {
            return HandlerOutcome::NoPermission;
        }
        if !holder.has_valid_storage() {
            return HandlerOutcome::NoData;
        }
        holder.add_viewer(viewer.id());
        let view = holder.view();
        self.host.open_view(viewer.id(), view);
        tracing::debug!("[biginv] [open] owner={} viewer={}", owner, viewer.id());
        HandlerOutcome::Success
    }

    /// Hand `owner`'s backup to `viewer`. Whatever `viewer` cannot take stays
    /// in the backup.
    pub fn restore_backup(&mut self, owner: &PlayerId, viewer: &dyn Principal) -> HandlerOutcome {
        let Some(holder) = self.holders.get(owner) else {
            return HandlerOutcome::NoHolder;
        };
        if !holder.can_restore_backup(viewer, &self.permissions) {
            return HandlerOutcome::NoPermission;
        }
        // an unwritten backup is newer than the stored one, and the stored
        // active may still be the untrimmed contents
        let pending = holder.pending_backup().cloned();
        let active = pending.as_ref().map(|_| holder.snapshot());

        let mut doc = match self.store.load(owner) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!("[biginv] [restore] read failed owner={} err={}", owner, e);
                return HandlerOutcome::NoData;
            }
        };
        let items = match pending {
            Some(backup) => backup.items(),
            None => doc.backup_or_empty().items(),
        };
        if items.is_empty() {
            return HandlerOutcome::NoData;
        }

        let offered = items.len();
        let remaining = ItemSet::from_items(self.host.give_items(viewer.id(), items));
        tracing::debug!(
            "[biginv] [restore] owner={} viewer={} given={} left={}",
            owner,
            viewer.id(),
            offered.saturating_sub(remaining.item_count()),
            remaining.item_count()
        );

        let outcome = if remaining.is_empty() {
            HandlerOutcome::Success
        } else {
            HandlerOutcome::PartialSuccess
        };
        doc.backup = Some(remaining.clone());
        if active.is_some() {
            doc.active = active;
        }
        let written = self.persist(owner, doc);
        if let Some(holder) = self.holders.get_mut(owner) {
            if written {
                holder.take_pending_backup();
            } else {
                // the items were handed out; the next save must not bring
                // them back
                holder.set_pending_backup(remaining);
            }
        }
        outcome
    }

    /// Empty `owner`'s live storage and return the non-empty items that were
    /// in it.
    pub fn clear(&mut self, owner: &PlayerId, persist: bool) -> Vec<ItemStack> {
        let Some(holder) = self.holders.get_mut(owner) else {
            return Vec::new();
        };
        let prior: Vec<ItemStack> = holder.clear_contents().into_iter().flatten().collect();
        if persist {
            self.write_back(owner, false);
        }
        prior
    }

    /// Whether `viewer` may modify `owner`'s storage. A permitted change marks
    /// the holder dirty.
    pub fn try_change(&mut self, owner: &PlayerId, viewer: &dyn Principal) -> bool {
        let Some(holder) = self.holders.get_mut(owner) else {
            return false;
        };
        if holder.can_change(viewer, &self.permissions) {
            holder.set_dirty(true);
            true
        } else {
            tracing::debug!("[biginv] [change] denied owner={} viewer={}", owner, viewer.id());
            false
        }
    }

    /// Gated write of a single slot
    pub fn apply_slot(
        &mut self,
        owner: &PlayerId,
        viewer: &dyn Principal,
        index: usize,
        slot: Slot,
    ) -> HandlerOutcome {
        self.apply_changes(owner, viewer, &[SlotChange { slot: index, item: slot }])
    }

    /// Gated write of the slots a click or drag changed in `owner`'s storage.
    ///
    /// Either every write lands or none does. Other viewers of the BigInv get
    /// their view redrawn.
    pub fn apply_changes(
        &mut self,
        owner: &PlayerId,
        viewer: &dyn Principal,
        changes: &[SlotChange],
    ) -> HandlerOutcome {
        let Some(holder) = self.holders.get_mut(owner) else {
            return HandlerOutcome::NoHolder;
        };
        if !holder.can_change(viewer, &self.permissions) {
            tracing::debug!("[biginv] [change] denied owner={} viewer={}", owner, viewer.id());
            return HandlerOutcome::NoPermission;
        }
        if let Err(e) = holder.apply_changes(changes) {
            tracing::debug!("[biginv] [change] owner={} {}", owner, e);
            return HandlerOutcome::NoData;
        }
        if changes.is_empty() {
            return HandlerOutcome::Success;
        }

        let view = holder.view();
        let others: Vec<PlayerId> = holder
            .viewers()
            .iter()
            .filter(|v| *v != viewer.id())
            .cloned()
            .collect();
        for other in &others {
            self.host.refresh_view(other, view.clone());
        }
        tracing::debug!(
            "[biginv] [change] owner={} viewer={} slots={} refreshed={}",
            owner,
            viewer.id(),
            changes.len(),
            others.len()
        );
        HandlerOutcome::Success
    }

    /// `viewer` stopped looking at `owner`'s BigInv.
    pub fn close_view(&mut self, owner: &PlayerId, viewer: &PlayerId) -> HandlerOutcome {
        let Some(holder) = self.holders.get_mut(owner) else {
            return HandlerOutcome::NoHolder;
        };
        holder.remove_viewer(viewer);
        if self.save_on_close && holder.is_dirty() && self.write_back(owner, false) == Some(true) {
            if let Some(holder) = self.holders.get_mut(owner) {
                holder.set_dirty(false);
            }
        }
        HandlerOutcome::Success
    }

    /// Load every principal in `players`, e.g. everyone online at startup
    pub fn load_all<'a, P>(
        &mut self,
        players: impl IntoIterator<Item = &'a P>,
    ) -> Vec<(PlayerId, HandlerOutcome)>
    where
        P: Principal + 'a,
    {
        players
            .into_iter()
            .map(|p| (p.id().clone(), self.load(p)))
            .collect()
    }

    /// Closing save of every loaded holder. Returns how many were saved.
    pub fn save_all(&mut self) -> usize {
        let owners: Vec<PlayerId> = self.holders.keys().cloned().collect();
        for owner in &owners {
            self.save(owner, true);
        }
        tracing::info!("[biginv] [save_all] saved {} holders", owners.len());
        owners.len()
    }

    // persistence helpers

    fn persist(&mut self, owner: &PlayerId, mut doc: PlayerDocument) -> bool {
        doc.saved_at = Some(chrono::Utc::now().timestamp());
        match self.store.save(owner, &doc) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("[biginv] [persist] write failed owner={} err={}", owner, e);
                false
            }
        }
    }

    /// Read-modify-write. If the read fails nothing is written, so the stored
    /// backup survives.
    fn update<F>(&mut self, owner: &PlayerId, op: &str, edit: F) -> bool
    where
        F: FnOnce(&mut PlayerDocument),
    {
        let mut doc = match self.store.load(owner) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(
                    "[biginv] [{}] read failed, write skipped owner={} err={}",
                    op,
                    owner,
                    e
                );
                return false;
            }
        };
        edit(&mut doc);
        self.persist(owner, doc)
    }

    // accessors

    pub fn holder(&self, owner: &PlayerId) -> Option<&Holder> {
        self.holders.get(owner)
    }

    pub fn is_loaded(&self, owner: &PlayerId) -> bool {
        self.holders.contains_key(owner)
    }

    pub fn loaded_count(&self) -> usize {
        self.holders.len()
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

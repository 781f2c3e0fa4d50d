//! In-process document store, for tests and for embedding without disk.

use std::cell::Cell;
use std::collections::HashMap;

use super::{PlayerDocument, PlayerStore, StoreError};
use crate::principal::PlayerId;

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<PlayerId, PlayerDocument>,
    reads: Cell<usize>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write
    pub fn insert(&mut self, owner: PlayerId, doc: PlayerDocument) {
        self.docs.insert(owner, doc);
    }

    pub fn get(&self, owner: &PlayerId) -> Option<&PlayerDocument> {
        self.docs.get(owner)
    }

    /// Successful loads so far
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    /// Successful saves so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl PlayerStore for MemoryStore {
    fn load(&self, owner: &PlayerId) -> Result<PlayerDocument, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable(format!("read of {owner} refused")));
        }
        self.reads.set(self.reads.get() + 1);
        Ok(self.docs.get(owner).cloned().unwrap_or_default())
    }

    fn save(&mut self, owner: &PlayerId, doc: &PlayerDocument) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable(format!("write of {owner} refused")));
        }
        self.writes += 1;
        self.docs.insert(owner.clone(), doc.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<PlayerId>, StoreError> {
        let mut ids: Vec<PlayerId> = self.docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemSet;

    #[test]
    fn counts_and_failures() {
        let mut store = MemoryStore::new();
        let id = PlayerId::new("p");
        assert_eq!(store.load(&id).unwrap(), PlayerDocument::default());

        let doc = PlayerDocument {
            backup: Some(ItemSet::new(1)),
            ..Default::default()
        };
        store.save(&id, &doc).unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.reads(), 1);
        assert_eq!(store.get(&id), Some(&doc));

        store.set_fail_writes(true);
        assert!(store.save(&id, &PlayerDocument::default()).is_err());
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(&id), Some(&doc));

        store.set_fail_reads(true);
        assert!(matches!(store.load(&id), Err(StoreError::Unavailable(_))));
    }
}

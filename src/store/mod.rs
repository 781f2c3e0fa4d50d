//! Player document persistence.
//!
//! Every player has one document holding two item sets: `active` (what is in
//! the BigInv) and `backup` (what did not fit). Backends only move whole
//! documents; merging and splitting happen in the container.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::StoreConfig;
use crate::inventory::ItemSet;
use crate::principal::PlayerId;

pub mod memory;
pub mod sql;
pub mod yaml;

pub use memory::MemoryStore;
pub use sql::SqlStore;
pub use yaml::YamlStore;

/// Error types for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document for {owner}: {source}")]
    Malformed {
        owner: PlayerId,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Failed to start database runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted state of one player.
///
/// A missing or malformed `active` / `backup` entry reads as `None`; callers
/// treat `None` as an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDocument {
    #[serde(
        default,
        deserialize_with = "lenient_item_set",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<ItemSet>,

    #[serde(
        default,
        deserialize_with = "lenient_item_set",
        skip_serializing_if = "Option::is_none"
    )]
    pub backup: Option<ItemSet>,

    /// Unix seconds of the last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
}

impl PlayerDocument {
    /// Stored backup, or an empty set
    pub fn backup_or_empty(&self) -> ItemSet {
        self.backup.clone().unwrap_or_default()
    }

    /// Stored active contents, or an empty set
    pub fn active_or_empty(&self) -> ItemSet {
        self.active.clone().unwrap_or_default()
    }
}

/// Decode an item set field, turning anything unreadable into "absent".
fn lenient_item_set<'de, D>(deserializer: D) -> Result<Option<ItemSet>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(decode_item_set))
}

/// Decode one item set from a YAML value. `None` if it is not a valid set.
pub(crate) fn decode_item_set(value: serde_yaml::Value) -> Option<ItemSet> {
    if value.is_null() {
        return None;
    }
    match serde_yaml::from_value::<ItemSet>(value) {
        Ok(set) => Some(set),
        Err(e) => {
            tracing::warn!("[biginv] [store] ignoring unreadable item set: {e}");
            None
        }
    }
}

/// Durable per-player document store.
pub trait PlayerStore {
    /// Load a player's document. A player with no stored document gets
    /// `PlayerDocument::default()`, not an error.
    fn load(&self, owner: &PlayerId) -> Result<PlayerDocument, StoreError>;

    /// Replace a player's document
    fn save(&mut self, owner: &PlayerId, doc: &PlayerDocument) -> Result<(), StoreError>;

    /// Ids of every player with a stored document, sorted
    fn list(&self) -> Result<Vec<PlayerId>, StoreError>;
}

impl<T: PlayerStore + ?Sized> PlayerStore for Box<T> {
    fn load(&self, owner: &PlayerId) -> Result<PlayerDocument, StoreError> {
        (**self).load(owner)
    }

    fn save(&mut self, owner: &PlayerId, doc: &PlayerDocument) -> Result<(), StoreError> {
        (**self).save(owner, doc)
    }

    fn list(&self) -> Result<Vec<PlayerId>, StoreError> {
        (**self).list()
    }
}

/// Open the backend selected in the configuration
pub fn open(config: &StoreConfig) -> Result<Box<dyn PlayerStore>, StoreError> {
    match config {
        StoreConfig::Yaml { data_dir } => Ok(Box::new(YamlStore::open(data_dir)?)),
        StoreConfig::Mysql { .. } => {
            // database_url() is always Some for the mysql backend
            let url = config.database_url().unwrap_or_default();
            Ok(Box::new(SqlStore::connect(&url)?))
        }
    }
}

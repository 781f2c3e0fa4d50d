//! MySQL / MariaDB document store.
//!
//! Each player is one row of `BigInventory`; the two item sets are stored as
//! YAML text, in the same shape the file backend writes.

use std::future::Future;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use tokio::runtime::Runtime;

use super::{decode_item_set, PlayerDocument, PlayerStore, StoreError};
use crate::inventory::ItemSet;
use crate::principal::PlayerId;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS BigInventory (\
     InvOwner VARCHAR(64) NOT NULL, \
     InvActive MEDIUMTEXT NULL, \
     InvBackup MEDIUMTEXT NULL, \
     InvSavedAt BIGINT NULL, \
     PRIMARY KEY (InvOwner))";

/// Blocking store over an async pool.
///
/// Owns a current-thread runtime; the pool's connections are bound to its
/// reactor, so every query goes through `blocking_run`. Must not be
/// called from inside another tokio runtime.
pub struct SqlStore {
    pool: MySqlPool,
    runtime: Runtime,
}

impl SqlStore {
    /// Connect and make sure the table exists
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;

        let pool = runtime.block_on(MySqlPoolOptions::new().max_connections(5).connect(url))?;
        runtime.block_on(sqlx::query(CREATE_TABLE).execute(&pool))?;

        tracing::info!("[biginv] [store] Connected to MariaDB");
        Ok(Self { pool, runtime })
    }

    fn blocking_run<F: Future>(&self, f: F) -> F::Output {
        self.runtime.block_on(f)
    }
}

impl PlayerStore for SqlStore {
    fn load(&self, owner: &PlayerId) -> Result<PlayerDocument, StoreError> {
        let row = self.blocking_run(
            sqlx::query(
                "SELECT InvActive, InvBackup, InvSavedAt FROM BigInventory WHERE InvOwner = ?",
            )
            .bind(owner.as_str())
            .fetch_optional(&self.pool),
        )?;

        let Some(row) = row else {
            return Ok(PlayerDocument::default());
        };
        Ok(PlayerDocument {
            active: decode_column(owner, row.try_get(0)?)?,
            backup: decode_column(owner, row.try_get(1)?)?,
            saved_at: row.try_get(2)?,
        })
    }

    fn save(&mut self, owner: &PlayerId, doc: &PlayerDocument) -> Result<(), StoreError> {
        let active = encode_column(doc.active.as_ref())?;
        let backup = encode_column(doc.backup.as_ref())?;
        self.blocking_run(
            sqlx::query(
                "INSERT INTO BigInventory (InvOwner, InvActive, InvBackup, InvSavedAt) \
                 VALUES (?, ?, ?, ?) \
                 ON DUPLICATE KEY UPDATE InvActive = VALUES(InvActive), \
                 InvBackup = VALUES(InvBackup), InvSavedAt = VALUES(InvSavedAt)",
            )
            .bind(owner.as_str())
            .bind(active)
            .bind(backup)
            .bind(doc.saved_at)
            .execute(&self.pool),
        )?;
        tracing::debug!("[biginv] [store] saved row for {}", owner);
        Ok(())
    }

    fn list(&self) -> Result<Vec<PlayerId>, StoreError> {
        let rows = self.blocking_run(
            sqlx::query("SELECT InvOwner FROM BigInventory ORDER BY InvOwner")
                .fetch_all(&self.pool),
        )?;
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get(0)?;
            ids.push(PlayerId::new(id));
        }
        Ok(ids)
    }
}

fn encode_column(set: Option<&ItemSet>) -> Result<Option<String>, StoreError> {
    set.map(|s| serde_yaml::to_string(s).map_err(StoreError::Encode))
        .transpose()
}

/// Text that is not YAML at all is a malformed document; YAML that is not an
/// item set reads as absent, same as the file backend.
fn decode_column(owner: &PlayerId, text: Option<String>) -> Result<Option<ItemSet>, StoreError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let value: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| StoreError::Malformed {
            owner: owner.clone(),
            source,
        })?;
    Ok(decode_item_set(value))
}

//! One YAML file per player under a data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PlayerDocument, PlayerStore, StoreError};
use crate::principal::PlayerId;

const EXTENSION: &str = "yml";

#[derive(Debug, Clone)]
pub struct YamlStore {
    dir: PathBuf,
}

impl YamlStore {
    /// Use `dir` as the data directory, creating it if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        tracing::info!("[biginv] [store] yaml store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, owner: &PlayerId) -> PathBuf {
        self.dir.join(format!("{}.{}", owner, EXTENSION))
    }
}

impl PlayerStore for YamlStore {
    fn load(&self, owner: &PlayerId) -> Result<PlayerDocument, StoreError> {
        let path = self.path_for(owner);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PlayerDocument::default()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if contents.trim().is_empty() {
            return Ok(PlayerDocument::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| StoreError::Malformed {
            owner: owner.clone(),
            source,
        })
    }

    fn save(&mut self, owner: &PlayerId, doc: &PlayerDocument) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(doc).map_err(StoreError::Encode)?;
        let path = self.path_for(owner);
        // write-then-rename so a crash never leaves a half-written document
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        fs::write(&tmp, yaml).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })?;
        tracing::debug!("[biginv] [store] saved file for {}", owner);
        Ok(())
    }

    fn list(&self) -> Result<Vec<PlayerId>, StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(PlayerId::new(stem));
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{ItemSet, ItemStack};

    fn temp_store(name: &str) -> YamlStore {
        let dir = std::env::temp_dir().join(format!("biginv_yaml_store_{}", name));
        std::fs::remove_dir_all(&dir).ok();
        YamlStore::open(&dir).unwrap()
    }

    #[test]
    fn missing_file_is_default_document() {
        let store = temp_store("missing");
        let doc = store.load(&PlayerId::new("nobody")).unwrap();
        assert_eq!(doc, PlayerDocument::default());
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn save_and_load() {
        let mut store = temp_store("roundtrip");
        let owner = PlayerId::new("069a79f4-44e9-4726-a5be-fca90e38aaf5");
        let doc = PlayerDocument {
            active: Some(ItemSet::from_slots(&[Some(ItemStack::new("DIRT", 5)), None])),
            backup: Some(ItemSet::from_items(vec![ItemStack::new("STONE", 1)])),
            saved_at: Some(1_700_000_000),
        };
        store.save(&owner, &doc).unwrap();

        assert_eq!(store.load(&owner).unwrap(), doc);
        assert_eq!(store.list().unwrap(), vec![owner]);
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn blank_file_is_default_document() {
        let store = temp_store("blank");
        std::fs::write(store.dir().join("blank.yml"), "\n").unwrap();
        let doc = store.load(&PlayerId::new("blank")).unwrap();
        assert_eq!(doc, PlayerDocument::default());
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn unparseable_file_is_malformed() {
        let store = temp_store("garbage");
        std::fs::write(store.dir().join("garbage.yml"), "active: [unclosed").unwrap();
        let err = store.load(&PlayerId::new("garbage")).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn list_skips_foreign_files() {
        let mut store = temp_store("list");
        std::fs::write(store.dir().join("notes.txt"), "hi").unwrap();
        store.save(&PlayerId::new("b"), &PlayerDocument::default()).unwrap();
        store.save(&PlayerId::new("a"), &PlayerDocument::default()).unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec![PlayerId::new("a"), PlayerId::new("b")]
        );
        std::fs::remove_dir_all(store.dir()).ok();
    }
}

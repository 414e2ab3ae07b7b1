use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;

/// Byte-blob key-value storage. `set` must replace a value as a unit.
pub trait Slot {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemorySlot {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }
}

impl Slot for MemorySlot {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let map = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory slot lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory slot lock poisoned"))?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory slot lock poisoned"))?;
        map.remove(key);
        Ok(())
    }
}

pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSlot { dir: dir.into() }
    }

    pub fn from_env() -> Self {
        FileSlot::new(crate::config::db_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Slot for FileSlot {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        // Write beside the target and rename over it
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to persist {}", path.display()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}

pub struct SpinSlot {
    store: spin_sdk::key_value::Store,
}

impl SpinSlot {
    pub fn open_default() -> anyhow::Result<Self> {
        let store = spin_sdk::key_value::Store::open_default()
            .context("failed to open default key-value store")?;
        Ok(SpinSlot { store })
    }

    pub fn open(label: &str) -> anyhow::Result<Self> {
        let store = spin_sdk::key_value::Store::open(label)
            .with_context(|| format!("failed to open key-value store {}", label))?;
        Ok(SpinSlot { store })
    }
}

impl Slot for SpinSlot {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.store.get(key)?)
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        Ok(self.store.set(key, value)?)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        Ok(self.store.delete(key)?)
    }
}

use std::{
    collections::HashMap,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;

/// Browsers give a page roughly this much local storage, so the tool keeps the same ceiling.
pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;

/// Interface for abstracting the persistent medium. Values are opaque strings, keys come back in
/// no particular order.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces any previous value. Fails without modifying anything if the store would exceed
    /// its capacity.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Size of the store in the way capacity is measured: key and value bytes of every entry.
fn used_bytes(map: &HashMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Size of `map` after `key` is set to `value`.
fn bytes_after_set(map: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let replaced = map.get(key).map_or(0, |old| key.len() + old.len());
    used_bytes(map) - replaced + key.len() + value.len()
}

fn check_capacity(needed: usize, capacity: usize) -> Result<(), StoreError> {
    if needed > capacity {
        Err(StoreError::QuotaExceeded { needed, capacity })
    } else {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(capacity) = self.capacity {
            check_capacity(bytes_after_set(&self.entries, key, value), capacity)?;
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Keeps every entry in one JSON object on disk. Access is serialized through an advisory lock on
/// a sibling `.lock` file. Writes go to a temporary file that then replaces the store, so the
/// store is never left half written.
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
    capacity: usize,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        Self::with_capacity_limit(path, DEFAULT_CAPACITY)
    }

    pub fn with_capacity_limit(path: PathBuf, capacity: usize) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Ok(Self {
            path,
            lock_path: lock_path.into(),
            capacity,
        })
    }

    fn open_lock(&self) -> Result<File, StoreError> {
        Ok(File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?)
    }

    /// Directory temporary files are created in. Has to be the store's own directory so the
    /// final rename doesn't cross file systems.
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Current entries, read with a shared lock held. A missing file is an empty store.
    fn read_entries(&self) -> Result<HashMap<String, String>, StoreError> {
        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock)?;
        let result = self.read_unlocked();
        FileExt::unlock(&lock)?;
        result
    }

    fn read_unlocked(&self) -> Result<HashMap<String, String>, StoreError> {
        match File::open(&self.path) {
            Ok(file) => read_map(&file),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Lock is held from read to rename so a second process can't interleave.
        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)?;
        let result = (|| -> Result<(), StoreError> {
            let mut entries = self.read_unlocked()?;
            check_capacity(bytes_after_set(&entries, key, value), self.capacity)?;
            entries.insert(key.to_string(), value.to_string());

            let mut temp = NamedTempFile::new_in(self.dir())?;
            serde_json::to_writer(temp.as_file_mut(), &entries)?;
            temp.as_file().sync_data()?;
            temp.persist(&self.path).map_err(std::io::Error::from)?;
            Ok(())
        })();
        FileExt::unlock(&lock)?;
        result
    }
}

fn read_map(mut file: &File) -> Result<HashMap<String, String>, StoreError> {
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e).into())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        debug!("Reading {key:?} from {:?}", self.path);
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!("Writing {key:?} into {:?}", self.path);
        self.write_entry(key, value)
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_entries()?.into_keys().collect())
    }
}

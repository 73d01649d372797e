//! Key-value backends the store writes through.

use crate::StorageError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Narrow synchronous key-value interface used by the stores in this crate.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// In-process backend, mostly for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Directory backend storing each key as `<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File for `key`. Bytes outside `[A-Za-z0-9.-]` become `_xx` hex escapes,
    /// `_` included, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'.' {
                file.push(char::from(b));
            } else {
                file.push_str(&format!("_{b:02x}"));
            }
        }
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_roundtrip() {
        let mut m = MemoryStore::new();
        assert_eq!(m.get("k").unwrap(), None);
        m.set("k", b"v").unwrap();
        assert_eq!(m.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = FileStore::open(dir.path().join("saves")).unwrap();
        assert_eq!(f.get("niche-calc/saved").unwrap(), None);
        f.set("niche-calc/saved", b"[]").unwrap();
        let f2 = FileStore::open(dir.path().join("saves")).unwrap();
        assert_eq!(f2.get("niche-calc/saved").unwrap(), Some(b"[]".to_vec()));
        assert!(dir.path().join("saves/niche-calc_2fsaved.json").exists());
    }

    #[test]
    fn escaped_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = FileStore::open(dir.path()).unwrap();
        f.set("a/b", b"slash").unwrap();
        f.set("a_b", b"underscore").unwrap();
        f.set("a b", b"space").unwrap();
        assert_eq!(f.get("a/b").unwrap(), Some(b"slash".to_vec()));
        assert_eq!(f.get("a_b").unwrap(), Some(b"underscore".to_vec()));
        assert_eq!(f.get("a b").unwrap(), Some(b"space".to_vec()));
        assert!(dir.path().join("a_5fb.json").exists());
    }
}

//! Directory-backed store: one JSON file per key
//!
//! Writes go through a temp file and an atomic rename while holding an
//! exclusive lock on `.lock` in the store directory, so a crash mid-write
//! never leaves a truncated value behind.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{KeyValueStore, StorageError};

const LOCK_FILE: &str = ".lock";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn lock(&self) -> Result<fs::File, StorageError> {
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.dir.join(LOCK_FILE))?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let _lock = self.lock()?;

        let temp_path = path.with_extension("json.tmp");
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(value)?;
        temp_file.sync_all()?;

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _lock = self.lock()?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a key onto a safe file stem
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("data")).unwrap();

        assert!(store.get("progression.profile").unwrap().is_none());
        store.set("progression.profile", b"{\"xp\":1}").unwrap();
        assert_eq!(
            store.get("progression.profile").unwrap().as_deref(),
            Some(&b"{\"xp\":1}"[..])
        );
        assert!(dir.path().join("data/progression.profile.json").exists());

        store.remove("progression.profile").unwrap();
        store.remove("progression.profile").unwrap();
        assert!(store.get("progression.profile").unwrap().is_none());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("a/b\\c d"), "a_b_c_d");
        assert_eq!(sanitize_key("session.current"), "session.current");
    }
}

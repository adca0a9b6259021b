//! Flat string-to-string persistence for remembered asset paths.
//!
//! Every access reads or rewrites the whole file. Read-modify-write is not
//! atomic across processes; within the previewer only the loop thread writes.

mod atomic_io;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use atomic_io::write_text_atomic;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode store {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait KeyValueStore: Send {
    /// Returns the stored value, or an empty string when the key is absent.
    fn get(&self, key: &str) -> String;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "store_read_failed");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
            Ok(values) => values,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "store_unreadable_treated_as_empty");
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> String {
        self.read_all().remove(key).unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&values).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        write_text_atomic(&self.path, &text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("store"));
        assert_eq!(store.get("box1"), "");
    }

    #[test]
    fn set_then_get_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("store"));

        store.set("box1", "/anims/walk").expect("set box1");
        store.set("box2", "/anims/run").expect("set box2");
        store.set("box1", "/anims/jump").expect("overwrite box1");

        assert_eq!(store.get("box1"), "/anims/jump");
        assert_eq!(store.get("box2"), "/anims/run");
    }

    #[test]
    fn each_access_sees_changes_made_through_another_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store");
        let first = JsonFileStore::new(&path);
        let second = JsonFileStore::new(&path);

        first.set("box1", "/a").expect("set");
        assert_eq!(second.get("box1"), "/a");
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store");
        fs::write(&path, "not json").expect("seed");
        let store = JsonFileStore::new(&path);

        assert_eq!(store.get("box1"), "");
        store.set("box1", "/a").expect("set");
        assert_eq!(store.get("box1"), "/a");
    }
}

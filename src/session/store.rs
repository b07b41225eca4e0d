/// Persistent key/value storage for session data.
///
/// ## File format:
///   One `key=value` pair per line, no schema versioning.
///   Unknown or malformed lines are ignored on read.
///
/// A missing or unreadable file reads as an empty store: callers treat
/// absent keys as "logged out", never as an error. Writes rewrite the
/// whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub const KEY_LOGGED_IN: &str = "isLoggedIn";
pub const KEY_ROLE: &str = "userRole";
pub const KEY_EMAIL: &str = "userEmail";
pub const KEY_XP: &str = "userXp";

/// Every key the session owns; cleared together on logout.
pub const SESSION_KEYS: [&str; 3] = [KEY_LOGGED_IN, KEY_ROLE, KEY_EMAIL];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// ══════════════════════════════════════════════════════════════
// In-memory store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.map.remove(key);
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// File-backed store
// ══════════════════════════════════════════════════════════════

pub const STORE_FILE: &str = "session.dat";

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(content) => parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session store unreadable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = map.len(), "session store opened");
        FileStore { path, map }
    }

    /// Store in `dir` under the standard file name.
    pub fn in_dir(dir: &Path) -> Self {
        FileStore::open(dir.join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        std::fs::write(&self.path, serialize(&self.map))
            .map_err(|source| StorageError::Write { path: self.path.clone(), source })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.map.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize(map: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(128);
    for (k, v) in map {
        // one pair per line: newlines inside values would split the record
        let v = v.replace(['\n', '\r'], " ");
        out.push_str(&format!("{}={}\n", k, v));
    }
    out
}

fn parse(content: &str) -> BTreeMap<String, String> {
    content.lines()
        .filter_map(|line| {
            let (k, v) = line.split_once('=')?;
            let k = k.trim();
            if k.is_empty() { return None; }
            Some((k.to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = FileStore::in_dir(dir.path());
        s.set(KEY_LOGGED_IN, "true").expect("write");
        s.set(KEY_EMAIL, "dev@example.com").expect("write");

        let reopened = FileStore::in_dir(dir.path());
        assert_eq!(reopened.get(KEY_LOGGED_IN).as_deref(), Some("true"));
        assert_eq!(reopened.get(KEY_EMAIL).as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = FileStore::open(dir.path().join("nope.dat"));
        assert_eq!(s.get(KEY_LOGGED_IN), None);
    }

    #[test]
    fn garbage_lines_are_ignored() {
        let map = parse("no separator\n=empty key\nisLoggedIn=true\nuserRole=premium\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("userRole").map(String::as_str), Some("premium"));
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = FileStore::in_dir(dir.path());
        s.set(KEY_ROLE, "premium").expect("write");
        s.remove(KEY_ROLE).expect("write");
        assert_eq!(FileStore::in_dir(dir.path()).get(KEY_ROLE), None);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = FileStore::open(dir.path().join("missing").join(STORE_FILE));
        assert!(matches!(s.set(KEY_XP, "5"), Err(StorageError::Write { .. })));
    }

    #[test]
    fn newlines_in_values_do_not_split_records() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), "a\nb".to_string());
        let back = parse(&serialize(&map));
        assert_eq!(back.get("k").map(String::as_str), Some("a b"));
    }
}

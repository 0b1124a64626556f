// src/bookmarks.rs
//! Saved jobs, persisted to a small local key-value file.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::Job;

pub const SAVED_JOBS_KEY: &str = "saved_jobs";

/// Durable string-list storage keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Stored list for `key`; empty when absent.
    fn string_list(&self, key: &str) -> Vec<String>;

    /// Replace the list for `key`. Must be durable when it returns `Ok`.
    fn set_string_list(&self, key: &str, values: &[String]) -> io::Result<()>;
}

/// JSON object of `key -> [string]` in a single file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Vec<String>>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. An unreadable or corrupt
    /// file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring corrupt store {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for JsonFileStore {
    fn string_list(&self, key: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn set_string_list(&self, key: &str, values: &[String]) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        updated.insert(key.to_string(), values.to_vec());
        self.write(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Set of saved job ids. Membership and toggle are the only operations;
/// every toggle is persisted before it returns.
pub struct BookmarkStore<S: KeyValueStore> {
    store: S,
    saved: HashSet<Uuid>,
}

impl<S: KeyValueStore> BookmarkStore<S> {
    pub fn load(store: S) -> Self {
        let stored = store.string_list(SAVED_JOBS_KEY);
        let saved: HashSet<Uuid> = stored
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .collect();
        if saved.len() < stored.len() {
            debug!(
                "Dropped {} unreadable bookmark ids",
                stored.len() - saved.len()
            );
        }
        Self { store, saved }
    }

    pub fn is_saved(&self, id: &Uuid) -> bool {
        self.saved.contains(id)
    }

    /// Flip the saved state of `id` and persist. Returns the new state.
    /// On a persistence failure the in-memory set is left unchanged.
    pub fn toggle(&mut self, id: Uuid) -> io::Result<bool> {
        let now_saved = if self.saved.remove(&id) {
            false
        } else {
            self.saved.insert(id);
            true
        };

        if let Err(e) = self.persist() {
            warn!("Failed to persist bookmarks: {}", e);
            if now_saved {
                self.saved.remove(&id);
            } else {
                self.saved.insert(id);
            }
            return Err(e);
        }
        Ok(now_saved)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Saved ids in a stable order.
    pub fn saved_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.saved.iter().copied().collect();
        ids.sort();
        ids
    }

    /// The saved subset of `jobs`, in the order given.
    pub fn saved_jobs<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.is_saved(&job.id)).collect()
    }

    fn persist(&self) -> io::Result<()> {
        let ids: Vec<String> = self.saved_ids().iter().map(Uuid::to_string).collect();
        self.store.set_string_list(SAVED_JOBS_KEY, &ids)
    }
}

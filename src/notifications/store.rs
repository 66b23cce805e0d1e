//! Notification state persistence
//!
//! The decision engine only needs `get` and `put` keyed by label, with
//! read-your-writes consistency inside one decision cycle. The store trait
//! keeps the engine decoupled from any particular backing medium: tests use
//! the in-memory store, deployments use the JSON file store.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

use super::SectionState;

/// Per-label notification state storage
///
/// Concurrent cycles for the same label would race on read-modify-write;
/// implementations must serialize `get`/`put` so an update cannot be lost.
pub trait StateStore: Send + Sync {
    /// Fetch the entry for a label, if one exists
    fn get(&self, label: &str) -> Result<Option<SectionState>, StoreError>;

    /// Persist the full entry for a label, replacing any prior value
    fn put(&self, label: &str, state: SectionState) -> Result<(), StoreError>;
}

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, SectionState>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of labels with an entry
    pub fn len(&self) -> usize {
        self.entries.lock().expect("state map poisoned").len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, label: &str) -> Result<Option<SectionState>, StoreError> {
        Ok(self
            .entries
            .lock()
            .expect("state map poisoned")
            .get(label)
            .cloned())
    }

    fn put(&self, label: &str, state: SectionState) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("state map poisoned")
            .insert(label.to_string(), state);
        Ok(())
    }
}

/// File-backed store holding a JSON map of label to entry
///
/// The whole map lives in memory behind a mutex; every `put` rewrites the
/// file through a temp file and an atomic rename, so readers never observe
/// a partial entry. The mutex serializes read-modify-write across labels,
/// which is stronger than the per-label minimum the engine needs.
pub struct JsonStateStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, SectionState>>,
}

impl JsonStateStore {
    /// Open (or create) a store backed by the given file.
    ///
    /// A missing file starts empty. A file that fails to parse as a whole
    /// also starts empty, with a warning: stale notification state only
    /// causes one extra alert per label, while refusing to start would stop
    /// the watcher outright. Individual malformed timestamps inside an
    /// otherwise valid map degrade per entry instead (see the lenient
    /// deserializer on [`SectionState`]).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = Self::load_entries(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn load_entries(path: &Path) -> Result<HashMap<String, SectionState>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Notification state file unreadable, starting empty"
                );
                Ok(HashMap::new())
            }
        }
    }

    fn save_entries(&self, entries: &HashMap<String, SectionState>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, entries)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Notification state saved");
        Ok(())
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn get(&self, label: &str) -> Result<Option<SectionState>, StoreError> {
        Ok(self
            .entries
            .lock()
            .expect("state map poisoned")
            .get(label)
            .cloned())
    }

    fn put(&self, label: &str, state: SectionState) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("state map poisoned");
        entries.insert(label.to_string(), state);
        self.save_entries(&entries)
    }
}

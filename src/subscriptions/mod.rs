//! Subscription bookkeeping
//!
//! Maps a section label to the subscribers who want alerts for it, backed
//! by a JSON file. A missing or unreadable file reads as no subscriptions;
//! writes go through a temp file and an atomic rename.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Label → subscriber-id list
pub struct Subscriptions {
    path: PathBuf,
    entries: BTreeMap<String, Vec<String>>,
}

impl Subscriptions {
    /// Load subscriptions from a file; missing or corrupt files start empty
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let file = File::open(&path)?;
            match serde_json::from_reader(BufReader::new(file)) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Subscriptions file unreadable, starting empty"
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Persist the current map
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.entries)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Subscribe a user to a label. Returns false if already subscribed.
    pub fn track(&mut self, label: &str, subscriber: &str) -> bool {
        let subscribers = self.entries.entry(label.to_string()).or_default();
        if subscribers.iter().any(|s| s == subscriber) {
            return false;
        }
        subscribers.push(subscriber.to_string());
        true
    }

    /// Unsubscribe a user from a label. Returns false if they weren't
    /// subscribed. Labels with no subscribers left are dropped.
    pub fn untrack(&mut self, label: &str, subscriber: &str) -> bool {
        let Some(subscribers) = self.entries.get_mut(label) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|s| s != subscriber);
        let removed = subscribers.len() < before;
        if subscribers.is_empty() {
            self.entries.remove(label);
        }
        removed
    }

    /// All tracked labels, sorted
    pub fn labels(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Labels a particular subscriber tracks
    pub fn tracked_by(&self, subscriber: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, subs)| subs.iter().any(|s| s == subscriber))
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Subscribers for one label
    pub fn subscribers(&self, label: &str) -> &[String] {
        self.entries.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

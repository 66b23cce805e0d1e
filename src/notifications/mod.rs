//! Notification state and deduplication
//!
//! This module keeps the per-label notification state machine that decides
//! when an observed section status is worth an alert. The goal is to never
//! spam about an unchanged section while still guaranteeing an alert on a
//! genuine status change, a freed seat, or after the re-notify cooldown.
//!
//! # Architecture
//!
//! ```text
//! classifier output (label, is_open, enrolled)
//!            │
//!            ▼
//!   ┌─────────────────┐     ┌────────────────┐
//!   │ DecisionEngine  │ ◄──►│  StateStore    │
//!   │  pure decide()  │     │  get / put     │
//!   └─────────────────┘     └────────────────┘
//!            │
//!            ▼ notify = true
//!   ┌─────────────────┐
//!   │    Channels     │  webhook, ...
//!   └─────────────────┘
//! ```
//!
//! The decision function itself performs no I/O; the caller reads the prior
//! entry from the store, runs [`DecisionEngine::decide`], delivers the alert,
//! and persists the updated entry. The notification timestamp is only
//! committed after delivery is confirmed, so a failed delivery is retried on
//! the next cycle.

pub mod channels;
mod decision;
pub mod store;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::parser::SectionRecord;

// Re-exports
pub use channels::webhook::WebhookChannel;
pub use channels::Channel;
pub use decision::{DecisionEngine, DEFAULT_COOLDOWN_MINUTES};
pub use store::{JsonStateStore, MemoryStateStore, StateStore};

/// Collapsed open/closed status, as persisted per label
///
/// The richer status vocabulary from parsing collapses to this boolean-like
/// pair before it reaches the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Section classified open
    Open,
    /// Section classified closed
    Closed,
}

impl Availability {
    /// Collapse a classifier decision
    pub fn from_open(is_open: bool) -> Self {
        if is_open {
            Self::Open
        } else {
            Self::Closed
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted notification state for one label
///
/// Created on first observation of a label and refreshed on every decision
/// cycle. `last_status` and `last_enrolled` always reflect the latest
/// observation; `last_notified_at` only moves when a notification actually
/// fired. Entries are never deleted here; retention belongs to the embedding
/// system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionState {
    /// Collapsed status at the last observation
    pub last_status: Availability,

    /// When the last notification fired, if ever
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_notified_at: Option<DateTime<Utc>>,

    /// Enrollment count at the last observation, when the page showed one
    #[serde(default)]
    pub last_enrolled: Option<u32>,
}

/// Outcome of one decision cycle for a label
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Whether a notification should fire
    pub notify: bool,

    /// The refreshed state entry to persist
    pub updated: SectionState,
}

/// Everything a channel needs to describe one alert
#[derive(Debug, Clone, Serialize)]
pub struct SectionAlert {
    /// Section label
    pub label: String,

    /// The record that triggered the alert
    pub record: SectionRecord,

    /// Classifier decision for the record
    pub is_open: bool,

    /// When the check ran (UTC)
    pub checked_at: DateTime<Utc>,
}

impl SectionAlert {
    /// Build an alert for a record observed now
    pub fn new(label: &str, record: &SectionRecord, is_open: bool, checked_at: DateTime<Utc>) -> Self {
        Self {
            label: label.to_string(),
            record: record.clone(),
            is_open,
            checked_at,
        }
    }

    /// Human-friendly seats summary for message bodies
    pub fn seats_summary(&self) -> String {
        if let Some(seats) = self.record.seats_available {
            format!("{seats} seats available")
        } else if let (Some(enrolled), Some(capacity)) =
            (self.record.enrolled, self.record.capacity)
        {
            format!("{enrolled}/{capacity} enrolled")
        } else {
            "unknown".to_string()
        }
    }

    /// Raw row text trimmed to a message-sized snippet
    pub fn snippet(&self) -> String {
        const MAX: usize = 400;
        let raw = self.record.raw.trim();
        if raw.chars().count() > MAX {
            let cut: String = raw.chars().take(MAX).collect();
            format!("{cut}...")
        } else {
            raw.to_string()
        }
    }
}

/// Deserialize a stored timestamp, treating anything unparsable as absent.
///
/// Earlier deployments wrote naive ISO-8601 timestamps without a zone
/// suffix; hand-edited state files show up too. A malformed value must not
/// fail the whole cycle, so it degrades to "never notified", which forces a
/// notification on the next evaluation.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient_timestamp))
}

/// Parse RFC 3339 first, then zone-less ISO-8601 assumed UTC
fn parse_lenient_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

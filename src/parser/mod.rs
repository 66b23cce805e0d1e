//! HTML parsing and section data extraction
//!
//! This module turns rendered Coursebook search-results HTML into structured
//! [`SectionRecord`]s. Page markup is inconsistent across runs, so every
//! field is extracted through an ordered set of strategies with fallbacks,
//! and anything unrecoverable is represented as an absent value rather than
//! an error.

pub mod classify;
pub mod fields;
pub mod rows;

// Re-export the main extraction entry points
pub use rows::{RowExtractor, SectionRow, DEFAULT_ROW_SELECTOR};

use serde::{Deserialize, Serialize};

/// Normalized section status vocabulary
///
/// The site reports status either through a semantic marker element
/// (`span.section-open` etc.) or as free text somewhere in the row. Both
/// paths normalize into this fixed vocabulary; text that matches none of
/// the keywords yields no status at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    /// Seats are (or appear to be) available
    Open,
    /// Section is at capacity
    Full,
    /// Only the waitlist is open
    Waitlist,
    /// Section is closed outright
    Closed,
}

impl SectionStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Full => "full",
            Self::Waitlist => "waitlist",
            Self::Closed => "closed",
        }
    }

    /// Scan free text for a status keyword.
    ///
    /// Matching is case-insensitive substring search in a fixed priority:
    /// `full` first, then open/available, then waitlist variants, then
    /// `closed`. Substring semantics are deliberately permissive and can
    /// over-match (e.g. "not open" still reads as open); see the known
    /// limitations note in the crate docs.
    pub fn from_text(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        if t.contains("full") {
            Some(Self::Full)
        } else if t.contains("open") || t.contains("available") {
            Some(Self::Open)
        } else if t.contains("waitlist") || t.contains("wait list") || t.contains("wl") {
            Some(Self::Waitlist)
        } else if t.contains("closed") {
            Some(Self::Closed)
        } else {
            None
        }
    }
}

impl std::fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parsed results row
///
/// Immutable once produced by the extraction pipeline. At least one of
/// `label` or `raw` is always populated: a row always has text, even when
/// none of the structured fields could be recovered. `enrolled` and
/// `capacity` are either both present or both absent. Absent fields are
/// never coerced to zero or an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Section identifier, e.g. "CS 4349.003"
    pub label: Option<String>,

    /// Current enrollment count
    pub enrolled: Option<u32>,

    /// Section capacity
    pub capacity: Option<u32>,

    /// Explicitly advertised free seats ("3 seats available")
    pub seats_available: Option<u32>,

    /// Normalized status, from the marker element or keyword scan
    pub status: Option<SectionStatus>,

    /// Flattened row text, kept for diagnostics only
    pub raw: String,
}

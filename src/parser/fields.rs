//! Field extraction pipeline
//!
//! Converts one [`SectionRow`] into a [`SectionRecord`]. Strategies run in a
//! fixed priority order and the ordering is a contract: page markup varies
//! between runs, and extraction has to degrade predictably when the
//! preferred form of a field is missing.
//!
//! - Label: stop-bubble anchor, then any anchor, then absent.
//! - Status: semantic marker element, then keyword scan of the row text.
//! - Enrolled/capacity: `12 / 30` form first, then `Enrl: 12 ... Cap: 30`.
//!   Exactly one pattern contributes; the two are never merged.
//! - Seats available: its own pattern, independent of enrolled/capacity.

use lazy_static::lazy_static;
use regex::Regex;

use super::rows::{RowExtractor, SectionRow};
use super::{SectionRecord, SectionStatus};

lazy_static! {
    /// "12 / 30" or "12/30"
    static ref NUMERIC_SLASH: Regex =
        Regex::new(r"(\d+)\s*/\s*(\d+)").expect("invalid slash pattern");

    /// "Enrl: 12 Cap: 30" with a non-greedy middle
    static ref ENRL_CAP: Regex =
        Regex::new(r"(?i)Enrl[:\s]*?(\d+).*?Cap[:\s]*?(\d+)").expect("invalid enrl/cap pattern");

    /// "3 seats available" or "3 seats"
    static ref SEATS_AVAILABLE: Regex =
        Regex::new(r"(?i)(\d+)\s+(?:seats?|seats?\s+available)").expect("invalid seats pattern");
}

/// Extract a structured record from one row handle
pub fn extract_record(row: &SectionRow<'_>) -> SectionRecord {
    let raw = row.text();
    let label = row.label();

    // Semantic marker is preferred when the site provides one; otherwise
    // scan the flattened text for status keywords.
    let status = row
        .status_marker_text()
        .and_then(|t| SectionStatus::from_text(&t))
        .or_else(|| SectionStatus::from_text(&raw));

    let (enrolled, capacity) = extract_enrollment(&raw);
    let seats_available = extract_seats_available(&raw);

    SectionRecord {
        label,
        enrolled,
        capacity,
        seats_available,
        status,
        raw,
    }
}

/// Enrolled/capacity pair, or (None, None) when neither pattern matches
///
/// The pair is all-or-nothing: a partial match never emits one side alone.
fn extract_enrollment(text: &str) -> (Option<u32>, Option<u32>) {
    for pattern in [&*NUMERIC_SLASH, &*ENRL_CAP] {
        if let Some(caps) = pattern.captures(text) {
            if let (Some(enrolled), Some(capacity)) =
                (parse_count(&caps[1]), parse_count(&caps[2]))
            {
                return (Some(enrolled), Some(capacity));
            }
        }
    }
    (None, None)
}

fn extract_seats_available(text: &str) -> Option<u32> {
    SEATS_AVAILABLE
        .captures(text)
        .and_then(|caps| parse_count(&caps[1]))
}

/// Digit runs that overflow a u32 are treated as unparsable, not clamped
fn parse_count(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok()
}

impl RowExtractor {
    /// Parse a full HTML document into records, one per matched row
    ///
    /// Records come back in document order. No rows matched means an empty
    /// vec, never an error.
    pub fn records(&self, html: &str) -> Vec<SectionRecord> {
        let document = scraper::Html::parse_document(html);
        self.rows(&document)
            .iter()
            .map(extract_record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(row_html: &str) -> SectionRecord {
        let html = format!("<html><body><table>{row_html}</table></body></html>");
        let extractor = RowExtractor::default();
        let mut records = extractor.records(&html);
        assert_eq!(records.len(), 1, "expected exactly one row");
        records.remove(0)
    }

    #[test]
    fn test_slash_format_row() {
        let record = parse_one(
            "<tr class='cb-row'><td><a class='stopbubble'>CS 4349.003</a></td>\
             <td>12 / 30</td><td>Open</td></tr>",
        );
        assert_eq!(record.label.as_deref(), Some("CS 4349.003"));
        assert_eq!(record.enrolled, Some(12));
        assert_eq!(record.capacity, Some(30));
        assert_eq!(record.seats_available, None);
        assert_eq!(record.status, Some(SectionStatus::Open));
        assert_eq!(record.raw, "CS 4349.003 12 / 30 Open");
    }

    #[test]
    fn test_compact_slash_format() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 1337.001</a></td><td>40/40</td></tr>",
        );
        assert_eq!(record.enrolled, Some(40));
        assert_eq!(record.capacity, Some(40));
    }

    #[test]
    fn test_enrl_cap_format_used_as_fallback() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 3345.002</a></td>\
             <td>Enrl: 25 Cap: 35</td></tr>",
        );
        assert_eq!(record.enrolled, Some(25));
        assert_eq!(record.capacity, Some(35));
    }

    #[test]
    fn test_slash_form_wins_over_enrl_cap() {
        // Only one numeric pattern contributes, whichever matches first
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 3345.002</a></td>\
             <td>12 / 30</td><td>Enrl: 99 Cap: 99</td></tr>",
        );
        assert_eq!(record.enrolled, Some(12));
        assert_eq!(record.capacity, Some(30));
    }

    #[test]
    fn test_seats_available_is_independent() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 4341.001</a></td>\
             <td>27 / 30</td><td>3 seats available</td></tr>",
        );
        assert_eq!(record.enrolled, Some(27));
        assert_eq!(record.capacity, Some(30));
        assert_eq!(record.seats_available, Some(3));
    }

    #[test]
    fn test_zero_seats_available() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 4349.004</a></td>\
             <td>0 seats available</td><td>Full</td></tr>",
        );
        assert_eq!(record.seats_available, Some(0));
        assert_eq!(record.status, Some(SectionStatus::Full));
    }

    #[test]
    fn test_numeric_fields_absent_not_zeroed() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>HIST 1301.001</a></td><td>TBA</td></tr>",
        );
        assert_eq!(record.enrolled, None);
        assert_eq!(record.capacity, None);
        assert_eq!(record.seats_available, None);
        assert_eq!(record.status, None);
    }

    #[test]
    fn test_marker_preferred_over_text_scan() {
        // Row text says "open" but the marker says full; marker wins
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 2305.001</a> open lab section</td>\
             <td><span class='section-closed'>Full</span></td></tr>",
        );
        assert_eq!(record.status, Some(SectionStatus::Full));
    }

    #[test]
    fn test_unrecognized_marker_falls_back_to_text_scan() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>CS 2305.001</a> Waitlist</td>\
             <td><span class='section-open'>??</span></td></tr>",
        );
        assert_eq!(record.status, Some(SectionStatus::Waitlist));
    }

    #[test]
    fn test_unparsable_row_still_has_raw_text() {
        let record = parse_one("<tr class='cb-row'><td>orphan cell</td></tr>");
        assert_eq!(record.label, None);
        assert_eq!(record.raw, "orphan cell");
    }

    #[test]
    fn test_overflowing_digits_are_absent() {
        let record = parse_one(
            "<tr class='cb-row'><td><a>X 1.1</a></td>\
             <td>99999999999999999999 / 30</td></tr>",
        );
        assert_eq!(record.enrolled, None);
        assert_eq!(record.capacity, None);
    }
}

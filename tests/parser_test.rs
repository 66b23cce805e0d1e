//! Extraction pipeline integration tests using HTML fixture files
//!
//! The mixed fixture covers every field-extraction strategy: slash and
//! Enrl/Cap enrollment forms, explicit seat counts, semantic status
//! markers, keyword fallback, and a row with no structured data at all.

use seatwatch::parser::{RowExtractor, SectionRecord, SectionStatus};
use std::fs;

const FIXTURES_DIR: &str = "tests/fixtures/html";

fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

fn parse_fixture(filename: &str) -> Vec<SectionRecord> {
    RowExtractor::default().records(&load_fixture(filename))
}

fn find<'a>(records: &'a [SectionRecord], label: &str) -> &'a SectionRecord {
    records
        .iter()
        .find(|r| r.label.as_deref() == Some(label))
        .unwrap_or_else(|| panic!("No record for {label}"))
}

// ============================================================================
// Row extraction
// ============================================================================

#[test]
fn test_extracts_one_record_per_result_row() {
    let records = parse_fixture("results_mixed.html");
    // Header row lacks the cb-row class and must not be extracted
    assert_eq!(records.len(), 6);
}

#[test]
fn test_records_preserve_document_order() {
    let records = parse_fixture("results_mixed.html");
    let labels: Vec<_> = records.iter().filter_map(|r| r.label.as_deref()).collect();
    assert_eq!(
        labels,
        [
            "CS 4349.003",
            "CS 4349.004",
            "CS 3345.002",
            "MATH 2414.501",
            "CS 1337.001",
            "HIST 1301.001",
        ]
    );
}

#[test]
fn test_no_rows_yields_empty_not_error() {
    let records = parse_fixture("results_empty.html");
    assert!(records.is_empty());
}

// ============================================================================
// Field extraction strategies
// ============================================================================

#[test]
fn test_slash_enrollment_with_keyword_status() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "CS 4349.003");

    assert_eq!(record.enrolled, Some(12));
    assert_eq!(record.capacity, Some(30));
    assert_eq!(record.seats_available, None);
    assert_eq!(record.status, Some(SectionStatus::Open));
    assert!(record.raw.contains("12 / 30"));
}

#[test]
fn test_enrl_cap_fallback_pattern() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "CS 3345.002");

    assert_eq!(record.enrolled, Some(25));
    assert_eq!(record.capacity, Some(35));
    assert_eq!(record.status, None);
}

#[test]
fn test_zero_seats_with_full_keyword() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "CS 4349.004");

    assert_eq!(record.seats_available, Some(0));
    assert_eq!(record.enrolled, None);
    assert_eq!(record.capacity, None);
    assert_eq!(record.status, Some(SectionStatus::Full));
}

#[test]
fn test_waitlist_status_marker() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "MATH 2414.501");

    assert_eq!(record.status, Some(SectionStatus::Waitlist));
    assert_eq!(record.enrolled, None);
    assert_eq!(record.seats_available, None);
}

#[test]
fn test_seats_available_with_open_marker() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "CS 1337.001");

    assert_eq!(record.seats_available, Some(3));
    assert_eq!(record.status, Some(SectionStatus::Open));
}

#[test]
fn test_row_without_structured_data_keeps_raw_text() {
    let records = parse_fixture("results_mixed.html");
    let record = find(&records, "HIST 1301.001");

    assert_eq!(record.enrolled, None);
    assert_eq!(record.capacity, None);
    assert_eq!(record.seats_available, None);
    assert_eq!(record.status, None);
    assert!(record.raw.contains("TBA"));
}

// ============================================================================
// Classification end-to-end
// ============================================================================

#[test]
fn test_enrollment_below_capacity_classifies_open() {
    let records = parse_fixture("results_mixed.html");
    assert!(find(&records, "CS 4349.003").is_open());
    assert!(find(&records, "CS 3345.002").is_open());
}

#[test]
fn test_zero_seats_classifies_closed_despite_available_keyword() {
    // Row text contains "available", but the explicit 0-seat count wins
    let records = parse_fixture("results_mixed.html");
    assert!(!find(&records, "CS 4349.004").is_open());
}

#[test]
fn test_waitlist_classifies_closed() {
    let records = parse_fixture("results_mixed.html");
    assert!(!find(&records, "MATH 2414.501").is_open());
}

#[test]
fn test_explicit_seats_classify_open() {
    let records = parse_fixture("results_mixed.html");
    assert!(find(&records, "CS 1337.001").is_open());
}

#[test]
fn test_no_evidence_classifies_closed() {
    let records = parse_fixture("results_mixed.html");
    assert!(!find(&records, "HIST 1301.001").is_open());
}

// ============================================================================
// Custom row selectors
// ============================================================================

#[test]
fn test_custom_row_selector() {
    let html = "<table>\
        <tr class='section-row'><td><a>BIOL 1300.001</a></td><td>5 / 60</td></tr>\
        <tr class='cb-row'><td><a>IGNORED 0.0</a></td></tr>\
        </table>";

    let extractor = RowExtractor::new("tr.section-row").unwrap();
    let records = extractor.records(html);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label.as_deref(), Some("BIOL 1300.001"));
    assert_eq!(records[0].enrolled, Some(5));
}

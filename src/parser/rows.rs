//! Row extraction from rendered results pages
//!
//! Locates the repeating result-row elements in a document and hands out
//! [`SectionRow`] handles over them. A selector that matches nothing is not
//! an error; it simply yields no rows. Malformed HTML is tolerated by the
//! underlying parser's best-effort tree construction.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

/// Default structural query for result rows
pub const DEFAULT_ROW_SELECTOR: &str = "tr.cb-row";

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Preferred label anchor: the stop-bubble link inside the first cell
    static ref LABEL_ANCHOR: Selector = parse_selector!("td a.stopbubble");

    /// Fallback label anchor: any anchor in the row
    static ref ANY_ANCHOR: Selector = parse_selector!("a");

    /// Semantic status marker the site attaches to some rows
    static ref STATUS_MARKER: Selector =
        parse_selector!("span.section-open, span.section-closed, span.section-waitlist");
}

/// Locates candidate result rows in a document
///
/// The row selector is configurable so markup changes don't require code
/// changes; the label/status sub-selectors are fixed site conventions.
pub struct RowExtractor {
    row_selector: Selector,
}

impl RowExtractor {
    /// Create an extractor with a custom row selector
    pub fn new(row_selector: &str) -> Result<Self, ParseError> {
        let selector =
            Selector::parse(row_selector).map_err(|e| ParseError::InvalidSelector {
                selector: row_selector.to_string(),
                message: format!("{e:?}"),
            })?;
        Ok(Self {
            row_selector: selector,
        })
    }

    /// All candidate rows in document order
    ///
    /// Returns an empty vec when the selector matches nothing.
    pub fn rows<'a>(&self, document: &'a Html) -> Vec<SectionRow<'a>> {
        document
            .select(&self.row_selector)
            .map(SectionRow)
            .collect()
    }
}

impl Default for RowExtractor {
    fn default() -> Self {
        // The default selector is a valid constant; a failure here is a
        // programming error.
        match Self::new(DEFAULT_ROW_SELECTOR) {
            Ok(extractor) => extractor,
            Err(e) => panic!("Failed to compile default row selector: {e}"),
        }
    }
}

/// Opaque handle over one result-row element
#[derive(Debug, Clone, Copy)]
pub struct SectionRow<'a>(ElementRef<'a>);

impl<'a> SectionRow<'a> {
    /// Flattened visible text with normalized single-space separation
    pub fn text(&self) -> String {
        self.0
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Section label from the row's anchor, if one exists
    ///
    /// Prefers the stop-bubble link; falls back to the first anchor.
    pub fn label(&self) -> Option<String> {
        let anchor = self
            .0
            .select(&LABEL_ANCHOR)
            .next()
            .or_else(|| self.0.select(&ANY_ANCHOR).next())?;
        let label = anchor.text().collect::<String>().trim().to_string();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }

    /// Text of the semantic status marker element, if present
    pub fn status_marker_text(&self) -> Option<String> {
        self.0
            .select(&STATUS_MARKER)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body><table>{body}</table></body></html>"))
    }

    #[test]
    fn test_extractor_invalid_selector() {
        let result = RowExtractor::new(":::nope");
        assert!(result.is_err());
    }

    #[test]
    fn test_no_matching_rows_is_empty_not_error() {
        let extractor = RowExtractor::default();
        let document = doc("<tr class='other-row'><td>x</td></tr>");
        assert!(extractor.rows(&document).is_empty());
    }

    #[test]
    fn test_rows_in_document_order() {
        let extractor = RowExtractor::default();
        let document = doc(
            "<tr class='cb-row'><td><a>CS 1337.001</a></td></tr>\
             <tr class='cb-row'><td><a>CS 1337.002</a></td></tr>",
        );
        let rows = extractor.rows(&document);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label().as_deref(), Some("CS 1337.001"));
        assert_eq!(rows[1].label().as_deref(), Some("CS 1337.002"));
    }

    #[test]
    fn test_text_is_flattened_with_single_spaces() {
        let extractor = RowExtractor::default();
        let document = doc(
            "<tr class='cb-row'><td><a>CS 4349.003</a></td>\
             <td>  12 / 30  </td><td>\n Open \n</td></tr>",
        );
        let rows = extractor.rows(&document);
        assert_eq!(rows[0].text(), "CS 4349.003 12 / 30 Open");
    }

    #[test]
    fn test_label_prefers_stopbubble_anchor() {
        let extractor = RowExtractor::default();
        let document = doc(
            "<tr class='cb-row'><td><a href='#'>Syllabus</a>\
             <a class='stopbubble'>CS 4349.003</a></td></tr>",
        );
        let rows = extractor.rows(&document);
        assert_eq!(rows[0].label().as_deref(), Some("CS 4349.003"));
    }

    #[test]
    fn test_label_falls_back_to_first_anchor() {
        let extractor = RowExtractor::default();
        let document = doc("<tr class='cb-row'><td><a>MATH 2414.501</a></td></tr>");
        let rows = extractor.rows(&document);
        assert_eq!(rows[0].label().as_deref(), Some("MATH 2414.501"));
    }

    #[test]
    fn test_label_absent_without_anchor() {
        let extractor = RowExtractor::default();
        let document = doc("<tr class='cb-row'><td>no link here</td></tr>");
        let rows = extractor.rows(&document);
        assert_eq!(rows[0].label(), None);
    }

    #[test]
    fn test_status_marker_text() {
        let extractor = RowExtractor::default();
        let document = doc(
            "<tr class='cb-row'><td><a>CS 1337.001</a></td>\
             <td><span class='section-closed'>Full</span></td></tr>",
        );
        let rows = extractor.rows(&document);
        assert_eq!(rows[0].status_marker_text().as_deref(), Some("Full"));
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let extractor = RowExtractor::default();
        let document = Html::parse_document(
            "<table><tr class='cb-row'><td><a>CS 2305.001</a><td>5 / 40",
        );
        let rows = extractor.rows(&document);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label().as_deref(), Some("CS 2305.001"));
    }
}

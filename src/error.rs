//! Error types for the seatwatch crate
//!
//! Extraction ambiguity (missing labels, unparsable numbers) is never an
//! error; those conditions surface as absent fields on the parsed record.
//! The types here cover the genuinely fallible edges: selector compilation,
//! state persistence, and page fetching.

use thiserror::Error;

/// Errors that can occur while building the extraction pipeline
#[derive(Error, Debug)]
pub enum ParseError {
    /// A CSS selector failed to compile
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector string that failed
        selector: String,
        /// Description from the selector parser
        message: String,
    },
}

/// Errors that can occur in the notification state store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error reading or writing state
    #[error("State file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// State map could not be serialized
    #[error("State serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur while fetching a results page
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Server error: {0}")]
    ServerError(u16),

    /// The configured URL template is unusable
    #[error("Invalid results URL: {0}")]
    InvalidUrl(String),
}

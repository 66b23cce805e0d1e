//! seatwatch - Course section availability watcher
//!
//! Monitors university course-section results pages and notifies subscribers
//! when a tracked section opens up, without spamming about sections that
//! haven't changed.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`parser`] - Row extraction, field pipeline, and openness classification
//! - [`notifications`] - Decision engine, state store, and delivery channels
//! - [`watch`] - Decision-cycle orchestration and page sources
//! - [`subscriptions`] - Label-to-subscriber bookkeeping
//!
//! # Known limitations
//!
//! Status keywords are matched by case-insensitive substring scan, exactly
//! as the results pages warrant; text like "not open" still reads as open.
//! The classifier's earlier evidence rules (explicit seat counts, enrollment
//! numbers) take priority precisely so this fallback rarely decides alone.
//!
//! # Example
//!
//! ```no_run
//! use seatwatch::notifications::{DecisionEngine, MemoryStateStore};
//! use seatwatch::parser::RowExtractor;
//! use seatwatch::watch::Watcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let watcher = Watcher::new(
//!         RowExtractor::default(),
//!         DecisionEngine::new(),
//!         Box::new(MemoryStateStore::new()),
//!     );
//!     let html = std::fs::read_to_string("results.html")?;
//!     let outcomes = watcher
//!         .check_document(&html, &["CS 4349.003".to_string()])
//!         .await?;
//!     for outcome in outcomes {
//!         println!("{}: open={} notified={}", outcome.label, outcome.is_open, outcome.notified);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod notifications;
pub mod parser;
pub mod subscriptions;
pub mod watch;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{FetchError, ParseError, StoreError};
    pub use crate::notifications::{
        Availability, Channel, DecisionEngine, JsonStateStore, MemoryStateStore, SectionAlert,
        SectionState, StateStore, WebhookChannel,
    };
    pub use crate::parser::{RowExtractor, SectionRecord, SectionStatus};
    pub use crate::subscriptions::Subscriptions;
    pub use crate::watch::{CheckOutcome, HttpSource, PageSource, Watcher};
}

// Direct re-exports for convenience
pub use parser::{SectionRecord, SectionStatus};

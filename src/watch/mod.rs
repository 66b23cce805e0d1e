//! Decision-cycle orchestration
//!
//! A [`Watcher`] owns the extraction pipeline, the decision engine, the
//! state store, and the delivery channels, and wires one check cycle
//! together: rows are extracted from a results document, the tracked label's
//! record is classified, the state machine decides, and on a positive
//! decision the alert is delivered before the notification timestamp is
//! committed. A failed delivery keeps the previous timestamp so the next
//! cycle retries.

pub mod source;

pub use source::{HttpSource, PageSource};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::notifications::{Channel, DecisionEngine, SectionAlert, StateStore};
use crate::parser::{RowExtractor, SectionRecord};

/// Result of one decision cycle for a label
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// The tracked label
    pub label: String,
    /// Classifier decision
    pub is_open: bool,
    /// Whether a notification fired and was delivered
    pub notified: bool,
}

/// Ties extraction, classification, decision, and delivery together
pub struct Watcher {
    extractor: RowExtractor,
    engine: DecisionEngine,
    store: Box<dyn StateStore>,
    channels: Vec<Box<dyn Channel>>,
}

impl Watcher {
    /// Create a watcher over a store, with no channels yet
    pub fn new(extractor: RowExtractor, engine: DecisionEngine, store: Box<dyn StateStore>) -> Self {
        Self {
            extractor,
            engine,
            store,
            channels: Vec::new(),
        }
    }

    /// Register a delivery channel
    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    /// Parse a document without touching state; used by the CLI `parse` command
    pub fn parse_document(&self, html: &str) -> Vec<SectionRecord> {
        self.extractor.records(html)
    }

    /// Run one decision cycle for every tracked label against one document.
    ///
    /// A label whose row is missing from the document is skipped without
    /// touching its stored state.
    pub async fn check_document(&self, html: &str, labels: &[String]) -> Result<Vec<CheckOutcome>> {
        let records = self.extractor.records(html);
        tracing::debug!(rows = records.len(), "Extracted result rows");

        let mut outcomes = Vec::with_capacity(labels.len());
        for label in labels {
            let Some(record) = records
                .iter()
                .find(|r| r.label.as_deref() == Some(label.as_str()))
            else {
                tracing::info!(%label, "No matching section row, skipping");
                continue;
            };

            outcomes.push(self.check_record(label, record).await?);
        }
        Ok(outcomes)
    }

    /// Fetch each tracked label's page from a source and run its cycle
    pub async fn run_cycle(
        &self,
        source: &dyn PageSource,
        labels: &[String],
    ) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(labels.len());
        for label in labels {
            let html = match source.fetch(label).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!(%label, error = %e, "Fetch failed, skipping label");
                    continue;
                }
            };

            match self.check_document(&html, std::slice::from_ref(label)).await {
                Ok(mut cycle) => outcomes.append(&mut cycle),
                Err(e) => {
                    tracing::error!(%label, error = %e, "Check cycle failed");
                }
            }
        }
        outcomes
    }

    /// One label's decision cycle: classify, decide, deliver, persist
    async fn check_record(&self, label: &str, record: &SectionRecord) -> Result<CheckOutcome> {
        let is_open = record.is_open();
        let now = Utc::now();

        let prior = self
            .store
            .get(label)
            .with_context(|| format!("Failed to read state for {label}"))?;
        let decision = self
            .engine
            .decide(prior.as_ref(), is_open, record.enrolled, now);

        tracing::debug!(
            %label,
            is_open,
            notify = decision.notify,
            enrolled = ?record.enrolled,
            "Decision cycle"
        );

        let mut updated = decision.updated;
        let mut notified = false;
        if decision.notify {
            let alert = SectionAlert::new(label, record, is_open, now);
            notified = self.deliver(&alert).await;
            if !notified {
                // Commit the timestamp only on confirmed delivery; keeping
                // the previous value makes the next cycle retry.
                updated.last_notified_at = prior.as_ref().and_then(|p| p.last_notified_at);
            }
        }

        self.store
            .put(label, updated)
            .with_context(|| format!("Failed to persist state for {label}"))?;

        Ok(CheckOutcome {
            label: label.to_string(),
            is_open,
            notified,
        })
    }

    /// Deliver to every channel; delivery confirms when at least one accepts.
    ///
    /// With no channels registered the alert is logged and counts as
    /// delivered, so dry runs still advance notification state.
    async fn deliver(&self, alert: &SectionAlert) -> bool {
        if self.channels.is_empty() {
            tracing::info!(
                label = %alert.label,
                is_open = alert.is_open,
                seats = %alert.seats_summary(),
                "Alert (no delivery channels configured)"
            );
            return true;
        }

        let mut delivered = false;
        for channel in &self.channels {
            match channel.send(alert).await {
                Ok(status) if status.success => {
                    delivered = true;
                }
                Ok(status) => {
                    tracing::warn!(channel = %status.channel, message = ?status.message, "Delivery failed");
                }
                Err(e) => {
                    tracing::error!(channel = channel.name(), error = %e, "Channel error");
                }
            }
        }
        delivered
    }
}

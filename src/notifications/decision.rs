//! Notification decision engine
//!
//! Pure per-label state machine over two collapsed states, open and closed.
//! `decide` is a function of the prior entry, the classifier output, and the
//! current time only; it performs no I/O and is total over its inputs.

use chrono::{DateTime, Duration, Utc};

use super::{Availability, Decision, SectionState};

/// Default wait before re-alerting about a still-open section
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 60;

/// Decides whether an observation deserves a notification
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    /// Minimum elapsed time before a still-open section re-alerts
    cooldown: Duration,
}

impl DecisionEngine {
    /// Create an engine with the default one-hour cooldown
    pub fn new() -> Self {
        Self::with_cooldown_minutes(DEFAULT_COOLDOWN_MINUTES)
    }

    /// Create an engine with a custom cooldown
    pub fn with_cooldown_minutes(minutes: i64) -> Self {
        Self {
            cooldown: Duration::minutes(minutes),
        }
    }

    /// Run one decision cycle for a label.
    ///
    /// Rules, in order:
    ///
    /// - No prior entry: notify. First sight of a tracked label always
    ///   alerts, otherwise an already-open section could sit unnoticed.
    /// - Collapsed status flipped since the prior entry: notify.
    /// - Still closed: never notify.
    /// - Still open: notify when the cooldown has elapsed since
    ///   `last_notified_at`, or when `enrolled` strictly decreased relative
    ///   to `last_enrolled` (a freed seat is actionable even inside the
    ///   cooldown window). A missing `last_notified_at` counts as an
    ///   elapsed cooldown.
    ///
    /// The returned entry always carries the freshly observed status and
    /// enrollment; its `last_notified_at` is advanced to `now` only when
    /// `notify` is true. Callers that deliver the alert externally should
    /// roll the timestamp back if delivery fails, so the next cycle retries.
    pub fn decide(
        &self,
        prior: Option<&SectionState>,
        is_open: bool,
        enrolled: Option<u32>,
        now: DateTime<Utc>,
    ) -> Decision {
        let status = Availability::from_open(is_open);

        let notify = match prior {
            None => true,
            Some(prev) if prev.last_status != status => true,
            Some(_) if !is_open => false,
            Some(prev) => {
                let cooldown_elapsed = match prev.last_notified_at {
                    Some(last) => now - last > self.cooldown,
                    None => true,
                };
                let seat_freed = matches!(
                    (enrolled, prev.last_enrolled),
                    (Some(current), Some(before)) if current < before
                );
                cooldown_elapsed || seat_freed
            }
        };

        let last_notified_at = if notify {
            Some(now)
        } else {
            prior.and_then(|p| p.last_notified_at)
        };

        Decision {
            notify,
            updated: SectionState {
                last_status: status,
                last_notified_at,
                last_enrolled: enrolled,
            },
        }
    }

    /// Configured cooldown
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

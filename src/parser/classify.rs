//! Openness classification
//!
//! Maps a [`SectionRecord`] to a single open/closed decision using a fixed
//! priority of evidence. The function is total: it never fails, and a record
//! with no usable evidence at all classifies as closed. A missed
//! notification is preferred over a spurious "open" alert on unparsable
//! data.

use super::{SectionRecord, SectionStatus};

impl SectionRecord {
    /// Decide whether this section currently has at least one free seat.
    ///
    /// Priority, first applicable rule wins, with strict short-circuit:
    ///
    /// 1. `seats_available` present: open iff greater than zero.
    /// 2. Both `enrolled` and `capacity` present: open iff enrolled < capacity.
    /// 3. `status` present: open iff the status is open; the other
    ///    vocabulary values (full, waitlist, closed) all mean closed.
    /// 4. No evidence: closed.
    ///
    /// Later rules are never consulted once an earlier one applies, even
    /// when they would disagree: an explicit "0 seats available" beats an
    /// "Open" status badge on the same row.
    pub fn is_open(&self) -> bool {
        if let Some(seats) = self.seats_available {
            return seats > 0;
        }

        if let (Some(enrolled), Some(capacity)) = (self.enrolled, self.capacity) {
            return enrolled < capacity;
        }

        if let Some(status) = self.status {
            return status == SectionStatus::Open;
        }

        false
    }
}

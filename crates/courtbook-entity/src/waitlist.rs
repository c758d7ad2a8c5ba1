//! Waitlist entries: FIFO requests for an exact slot that was taken.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::{FacilityId, RequesterId, SlotKey, SportTag, WaitlistEntryId};

/// State of a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Waiting for the slot to free up.
    Queued,
    /// Temporarily held during promotion handling.
    Held,
    /// Promoted into a booking.
    Fulfilled,
    /// Withdrawn by the requester.
    Canceled,
}

/// A queued request for one exact slot.
///
/// Entries are created when a requester attempts a slot already claimed
/// by an active booking. The enqueue timestamp defines FIFO order;
/// promotion matches the exact `(facility, date, slot)` tuple only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Unique identifier.
    pub id: WaitlistEntryId,
    /// Facility the requester wants.
    pub facility_id: FacilityId,
    /// Date the requester wants.
    pub date: NaiveDate,
    /// The exact slot the requester wants.
    pub slot: SlotKey,
    /// Who is waiting.
    pub requester_id: RequesterId,
    /// Sport, carried for display and filtering.
    pub sport: SportTag,
    /// Current state.
    pub status: WaitlistStatus,
    /// Enqueue time; defines promotion order.
    pub enqueued_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Whether the entry is still waiting in the queue.
    pub fn is_queued(&self) -> bool {
        self.status == WaitlistStatus::Queued
    }
}

//! The append-only points ledger.
//!
//! A requester's balance is the running sum of their ledger entries,
//! cached as a denormalized counter for O(1) reads. Entries are never
//! mutated or deleted; the counter and the entry are written in the
//! same atomic store operation so the two can never drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::{BookingId, LedgerEntryId, OwnedVoucherId, RequesterId};

/// What a ledger entry refers back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum LedgerSource {
    /// Points earned from a booking.
    Booking(BookingId),
    /// Points spent on a voucher purchase.
    Voucher(OwnedVoucherId),
}

/// One append-only points ledger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Whose balance this entry moves.
    pub requester_id: RequesterId,
    /// Signed delta: positive = earn, negative = spend.
    pub delta: i64,
    /// Human-readable reason, e.g. `"Booking Badminton Court A"`.
    pub reason: String,
    /// The booking or voucher this entry stems from.
    pub source: Option<LedgerSource>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build an earn entry for a booking credit.
    pub fn booking_credit(
        requester_id: RequesterId,
        booking_id: BookingId,
        points: i64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            requester_id,
            delta: points,
            reason: reason.into(),
            source: Some(LedgerSource::Booking(booking_id)),
            created_at: Utc::now(),
        }
    }

    /// Build a spend entry for a voucher purchase.
    pub fn voucher_debit(
        requester_id: RequesterId,
        owned_voucher_id: OwnedVoucherId,
        cost: i64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            requester_id,
            delta: -cost,
            reason: reason.into(),
            source: Some(LedgerSource::Voucher(owned_voucher_id)),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_debit_is_negative() {
        let entry = LedgerEntry::voucher_debit(
            RequesterId::from("user-1"),
            OwnedVoucherId::new(),
            60,
            "Bought voucher RM10",
        );
        assert_eq!(entry.delta, -60);
    }

    #[test]
    fn test_source_serde_shape() {
        let source = LedgerSource::Booking(BookingId::new());
        let json = serde_json::to_value(&source).expect("serialize");
        assert_eq!(json["kind"], "booking");
    }
}

//! Booking entity and its cancellation state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::{
    BookingId, EquipmentId, FacilityId, Money, OwnedVoucherId, RequesterId, SlotSet, SportTag,
};

/// Lifecycle state of a booking.
///
/// ```text
/// BOOKED --(request cancellation)--> PENDING_CANCEL
/// PENDING_CANCEL --(admin approve)--> CANCELLED   (terminal)
/// PENDING_CANCEL --(admin deny)-----> BOOKED
/// BOOKED --(admin force cancel)-----> CANCELLED
/// ```
///
/// Cancelled is absorbing; a cancelled booking no longer claims its
/// former slots but is never deleted, preserving the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Active booking holding its slots.
    Booked,
    /// Cancellation requested, awaiting admin decision. Still holds slots.
    PendingCancel,
    /// Terminal. Slots released.
    Cancelled,
}

impl BookingStatus {
    /// Whether the booking still claims its slots.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Booked | Self::PendingCancel)
    }
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationOutcome {
    /// Awaiting admin decision.
    Pending,
    /// Approved; the booking was cancelled.
    Approved,
    /// Denied; the booking reverted to booked.
    Denied,
}

/// A requester's pending or processed cancellation request.
///
/// Re-requesting while already pending overwrites the note and
/// timestamps but keeps the booking in `PendingCancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRequest {
    /// Free-text reason from the requester.
    pub note: String,
    /// Who asked for the cancellation.
    pub requested_by: RequesterId,
    /// When the request was made.
    pub requested_at: DateTime<Utc>,
    /// Current outcome.
    pub outcome: CancellationOutcome,
    /// When an admin processed the request.
    pub processed_at: Option<DateTime<Utc>>,
}

/// One rented equipment line on a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentLine {
    /// Catalog equipment id.
    pub equipment_id: EquipmentId,
    /// Label at booking time (catalog labels may change later).
    pub label: String,
    /// Units rented.
    pub quantity: u32,
    /// Per-unit rate at booking time.
    pub rate: Money,
}

impl EquipmentLine {
    /// Line subtotal.
    pub fn subtotal(&self) -> Money {
        self.rate * i64::from(self.quantity)
    }
}

/// A voucher applied at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedVoucher {
    /// The owned voucher that was spent.
    pub owned_voucher_id: OwnedVoucherId,
    /// Redemption code, kept for the receipt.
    pub code: String,
    /// Discount applied (already capped at the subtotal).
    pub amount_off: Money,
}

/// A facility booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Globally unique identifier.
    pub id: BookingId,
    /// Facility booked, by catalog id.
    pub facility_id: FacilityId,
    /// Sport at booking time.
    pub sport: SportTag,
    /// Owner of the booking.
    pub requester_id: RequesterId,
    /// Booking date.
    pub date: NaiveDate,
    /// Contiguous hourly slots claimed.
    pub slots: SlotSet,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// Cancellation workflow record, if one was ever filed.
    pub cancellation: Option<CancellationRequest>,
    /// Equipment rented with the booking.
    pub equipment: Vec<EquipmentLine>,
    /// Voucher applied at checkout, if any.
    pub voucher: Option<AppliedVoucher>,
    /// Final amount paid: slots x rate + equipment - voucher discount,
    /// floored at zero. A recorded figure, not a payment.
    pub total_paid: Money,
    /// Points credited on creation (floor of `total_paid` in whole units).
    pub points_earned: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking still claims its slots.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

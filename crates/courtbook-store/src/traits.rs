//! Store traits with their atomicity contracts.
//!
//! Each mutating method states what must be indivisible with respect to
//! other concurrent callers. A backend may implement the conditional
//! writes with compare-and-swap, a transactional read-modify-write with
//! bounded internal retry, or a lock — callers never observe the
//! mechanism, only the guarantee.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use courtbook_core::result::AppResult;
use courtbook_core::types::{
    BookingId, FacilityId, OwnedVoucherId, RequesterId, SlotKey, SlotSet, WaitlistEntryId,
};
use courtbook_entity::booking::Booking;
use courtbook_entity::catalog::CatalogSnapshot;
use courtbook_entity::points::{LedgerEntry, LedgerSource};
use courtbook_entity::voucher::OwnedVoucher;
use courtbook_entity::waitlist::{WaitlistEntry, WaitlistStatus};

/// The authoritative index of slot occupancy.
///
/// This is the single source of truth for which booking claims which
/// slot; no other component writes slot-claim state. Keeping the ledger
/// as an index makes conflict checks O(1) per slot instead of a scan
/// over all bookings for the date.
#[async_trait]
pub trait SlotLedger: Send + Sync + 'static {
    /// Atomically claim every slot in `slots` for `booking`.
    ///
    /// The check that none of the slots is already claimed and the claim
    /// itself are indivisible with respect to concurrent `reserve` calls
    /// touching any of the same slots. All-or-nothing: on `SlotTaken`
    /// the ledger is unchanged and partial success is never observable.
    async fn reserve(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slots: &SlotSet,
        booking: BookingId,
    ) -> AppResult<()>;

    /// Clear the claims `booking` holds on `slots`. Idempotent and
    /// best-effort: slots that are unclaimed, or claimed by a different
    /// booking, are left alone. Used only by approved cancellations.
    async fn release(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slots: &SlotSet,
        booking: BookingId,
    ) -> AppResult<()>;

    /// The booking currently claiming a slot, if any.
    async fn holder(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<BookingId>>;

    /// Snapshot of all claims for a facility/date, for availability views.
    async fn claims(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> AppResult<BTreeMap<SlotKey, BookingId>>;
}

/// Persisted booking records.
///
/// Bookings are never deleted; cancellation is a status change, which
/// preserves the audit trail and the voucher/points history.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Persist a new booking.
    async fn insert(&self, booking: &Booking) -> AppResult<()>;

    /// Fetch a booking by id.
    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Replace an existing booking record. `NotFound` if it was never
    /// inserted.
    async fn update(&self, booking: &Booking) -> AppResult<()>;

    /// All bookings owned by a requester.
    async fn list_for_requester(&self, requester: &RequesterId) -> AppResult<Vec<Booking>>;

    /// All bookings for a facility on a date, any status.
    async fn list_for_facility_date(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> AppResult<Vec<Booking>>;
}

/// Waitlist entries, FIFO per exact `(facility, date, slot)` tuple.
#[async_trait]
pub trait WaitlistStore: Send + Sync + 'static {
    /// Persist a new entry. Always succeeds; multiple requesters may
    /// queue for the same slot.
    async fn add(&self, entry: &WaitlistEntry) -> AppResult<()>;

    /// Fetch an entry by id.
    async fn entry(&self, id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>>;

    /// Atomically select the queued entry with the earliest enqueue
    /// timestamp for the exact tuple (tie-break: entry id in
    /// lexicographic order) and move it to `Held`. Concurrent calls for
    /// the same slot never return the same entry. `None` if nothing is
    /// queued. The caller settles the entry to `Fulfilled` or back to
    /// `Queued` once the replacement booking is decided.
    async fn take_first_queued(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<WaitlistEntry>>;

    /// Set an entry's status. `NotFound` if the entry does not exist.
    async fn set_status(&self, id: WaitlistEntryId, status: WaitlistStatus) -> AppResult<()>;

    /// All entries belonging to a requester, any status.
    async fn entries_for(&self, requester: &RequesterId) -> AppResult<Vec<WaitlistEntry>>;
}

/// The append-only points ledger and its cached balance counter.
///
/// The counter is mutated only through [`PointsStore::append`]; direct
/// counter writes are forbidden since this is the only path that keeps
/// the counter consistent with the history.
#[async_trait]
pub trait PointsStore: Send + Sync + 'static {
    /// Atomically apply `entry.delta` to the requester's balance and
    /// append the entry to their history, as one indivisible operation.
    ///
    /// A negative delta is conditional: if the balance would go below
    /// zero at commit time the operation aborts with
    /// `InsufficientPoints` and neither the counter nor the history
    /// changes. This is checked at commit, not at initial read, so
    /// concurrent spends cannot double-spend. Returns the new balance.
    async fn append(&self, entry: &LedgerEntry) -> AppResult<i64>;

    /// The cached balance counter.
    async fn balance(&self, requester: &RequesterId) -> AppResult<i64>;

    /// The full ledger history, oldest first.
    async fn history(&self, requester: &RequesterId) -> AppResult<Vec<LedgerEntry>>;

    /// Whether any ledger entry references the given source. Used by
    /// reconciliation to make the points credit retry idempotent.
    async fn has_entry_for_source(
        &self,
        requester: &RequesterId,
        source: &LedgerSource,
    ) -> AppResult<bool>;
}

/// Vouchers owned by requesters.
#[async_trait]
pub trait VoucherStore: Send + Sync + 'static {
    /// Persist a newly purchased voucher.
    async fn insert_owned(&self, voucher: &OwnedVoucher) -> AppResult<()>;

    /// Fetch an owned voucher by id.
    async fn get_owned(&self, id: OwnedVoucherId) -> AppResult<Option<OwnedVoucher>>;

    /// Find a requester's unused voucher by redemption code.
    async fn find_unused_by_code(
        &self,
        requester: &RequesterId,
        code: &str,
    ) -> AppResult<Option<OwnedVoucher>>;

    /// One-way flip of `used` from false to true, atomically. A second
    /// call for the same voucher fails with `AlreadyUsed`; `NotFound`
    /// if the voucher does not exist. Returns the updated record.
    async fn mark_used(&self, id: OwnedVoucherId) -> AppResult<OwnedVoucher>;

    /// All vouchers a requester owns, newest first.
    async fn list_owned(&self, requester: &RequesterId) -> AppResult<Vec<OwnedVoucher>>;
}

/// Read-only source of catalog data, administered outside the core.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch the current catalog snapshot.
    async fn fetch(&self) -> AppResult<CatalogSnapshot>;
}

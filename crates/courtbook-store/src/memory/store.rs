//! In-memory implementation of the store traits.
//!
//! Multi-key-atomic concerns (slot ledger, waitlist selection, points)
//! live behind coarse mutexes; per-entry-atomic concerns (bookings,
//! owned vouchers) use `DashMap` entries. No lock is ever held across
//! an await, so the async trait methods cannot deadlock each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::{
    BookingId, FacilityId, OwnedVoucherId, RequesterId, SlotKey, SlotSet, WaitlistEntryId,
};
use courtbook_entity::booking::Booking;
use courtbook_entity::catalog::{CatalogSnapshot, Equipment, Facility, VoucherOffer};
use courtbook_entity::points::{LedgerEntry, LedgerSource};
use courtbook_entity::voucher::OwnedVoucher;
use courtbook_entity::waitlist::{WaitlistEntry, WaitlistStatus};

use crate::traits::{
    BookingStore, CatalogSource, PointsStore, SlotLedger, VoucherStore, WaitlistStore,
};

/// A requester's cached balance plus their append-only history.
#[derive(Debug, Default)]
struct PointsAccount {
    balance: i64,
    history: Vec<LedgerEntry>,
}

/// Single-node in-memory store implementing every store trait.
///
/// Used as the test double and as the backend for single-process
/// deployments. The mutex-guarded maps give the conditional writes
/// their required indivisibility directly.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// (facility, date) -> slot -> claiming booking.
    slots: Mutex<HashMap<(FacilityId, NaiveDate), BTreeMap<SlotKey, BookingId>>>,
    /// All bookings by id.
    bookings: DashMap<BookingId, Booking>,
    /// All waitlist entries by id. Guarded as a whole so FIFO selection
    /// and the held mark are one critical section.
    waitlist: Mutex<HashMap<WaitlistEntryId, WaitlistEntry>>,
    /// Balance counter + history per requester, updated together.
    points: Mutex<HashMap<RequesterId, PointsAccount>>,
    /// Owned vouchers by id.
    vouchers: DashMap<OwnedVoucherId, OwnedVoucher>,
    /// Seeded catalog data served through `CatalogSource`.
    catalog: RwLock<CatalogSnapshot>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog snapshot.
    pub fn seed_catalog(&self, snapshot: CatalogSnapshot) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Add a facility to the served catalog.
    pub fn seed_facility(&self, facility: Facility) {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        if !catalog.sports.iter().any(|s| s.matches(&facility.sport)) {
            catalog.sports.push(facility.sport.clone());
        }
        catalog.facilities.insert(facility.id.clone(), facility);
    }

    /// Add an equipment item to the served catalog.
    pub fn seed_equipment(&self, equipment: Equipment) {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        catalog.equipment.insert(equipment.id.clone(), equipment);
    }

    /// Add a voucher offer to the served catalog.
    pub fn seed_offer(&self, offer: VoucherOffer) {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        catalog.voucher_offers.insert(offer.id.clone(), offer);
    }
}

#[async_trait]
impl SlotLedger for MemoryStore {
    async fn reserve(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slots: &SlotSet,
        booking: BookingId,
    ) -> AppResult<()> {
        let mut ledger = lock(&self.slots);
        let claims = ledger
            .entry((facility.clone(), date))
            .or_insert_with(BTreeMap::new);

        if let Some(taken) = slots.iter().find(|s| claims.contains_key(s)) {
            return Err(AppError::slot_taken(format!(
                "Slot {} on {date} at facility {facility} is already booked",
                taken.ledger_key()
            )));
        }
        for slot in slots.iter() {
            claims.insert(slot, booking);
        }
        debug!(%facility, %date, %booking, slots = slots.len(), "Slots reserved");
        Ok(())
    }

    async fn release(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slots: &SlotSet,
        booking: BookingId,
    ) -> AppResult<()> {
        let mut ledger = lock(&self.slots);
        let Some(claims) = ledger.get_mut(&(facility.clone(), date)) else {
            return Ok(());
        };
        for slot in slots.iter() {
            match claims.get(&slot) {
                Some(holder) if *holder == booking => {
                    claims.remove(&slot);
                }
                Some(holder) => {
                    // Reachable only during recovery; releasing a claim
                    // we do not hold must stay a no-op.
                    warn!(
                        %facility, %date, slot = %slot.ledger_key(),
                        held_by = %holder, releasing = %booking,
                        "Release skipped slot held by a different booking"
                    );
                }
                None => {}
            }
        }
        Ok(())
    }

    async fn holder(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<BookingId>> {
        let ledger = lock(&self.slots);
        Ok(ledger
            .get(&(facility.clone(), date))
            .and_then(|claims| claims.get(&slot).copied()))
    }

    async fn claims(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> AppResult<BTreeMap<SlotKey, BookingId>> {
        let ledger = lock(&self.slots);
        Ok(ledger
            .get(&(facility.clone(), date))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, booking: &Booking) -> AppResult<()> {
        self.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, id: BookingId) -> AppResult<Option<Booking>> {
        Ok(self.bookings.get(&id).map(|b| b.clone()))
    }

    async fn update(&self, booking: &Booking) -> AppResult<()> {
        match self.bookings.get_mut(&booking.id) {
            Some(mut existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "Booking {} not found",
                booking.id
            ))),
        }
    }

    async fn list_for_requester(&self, requester: &RequesterId) -> AppResult<Vec<Booking>> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.requester_id == *requester)
            .map(|b| b.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn list_for_facility_date(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        let mut out: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.facility_id == *facility && b.date == date)
            .map(|b| b.clone())
            .collect();
        out.sort_by(|a, b| a.slots.first().cmp(&b.slots.first()));
        Ok(out)
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn add(&self, entry: &WaitlistEntry) -> AppResult<()> {
        lock(&self.waitlist).insert(entry.id, entry.clone());
        Ok(())
    }

    async fn entry(&self, id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>> {
        Ok(lock(&self.waitlist).get(&id).cloned())
    }

    async fn take_first_queued(
        &self,
        facility: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<WaitlistEntry>> {
        let mut entries = lock(&self.waitlist);
        let first = entries
            .values()
            .filter(|e| {
                e.is_queued() && e.facility_id == *facility && e.date == date && e.slot == slot
            })
            .min_by(|a, b| {
                a.enqueued_at
                    .cmp(&b.enqueued_at)
                    .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
            })
            .map(|e| e.id);

        let Some(id) = first else {
            return Ok(None);
        };
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| AppError::internal("Waitlist entry vanished during selection"))?;
        entry.status = WaitlistStatus::Held;
        Ok(Some(entry.clone()))
    }

    async fn set_status(&self, id: WaitlistEntryId, status: WaitlistStatus) -> AppResult<()> {
        let mut entries = lock(&self.waitlist);
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Waitlist entry {id} not found")))?;
        entry.status = status;
        Ok(())
    }

    async fn entries_for(&self, requester: &RequesterId) -> AppResult<Vec<WaitlistEntry>> {
        let entries = lock(&self.waitlist);
        let mut out: Vec<WaitlistEntry> = entries
            .values()
            .filter(|e| e.requester_id == *requester)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.enqueued_at.cmp(&b.enqueued_at));
        Ok(out)
    }
}

#[async_trait]
impl PointsStore for MemoryStore {
    async fn append(&self, entry: &LedgerEntry) -> AppResult<i64> {
        let mut accounts = lock(&self.points);
        let account = accounts.entry(entry.requester_id.clone()).or_default();

        let new_balance = account.balance + entry.delta;
        if new_balance < 0 {
            return Err(AppError::insufficient_points(format!(
                "Balance {} is below cost {}",
                account.balance,
                entry.delta.unsigned_abs()
            )));
        }
        account.balance = new_balance;
        account.history.push(entry.clone());
        Ok(new_balance)
    }

    async fn balance(&self, requester: &RequesterId) -> AppResult<i64> {
        let accounts = lock(&self.points);
        Ok(accounts.get(requester).map(|a| a.balance).unwrap_or(0))
    }

    async fn history(&self, requester: &RequesterId) -> AppResult<Vec<LedgerEntry>> {
        let accounts = lock(&self.points);
        Ok(accounts
            .get(requester)
            .map(|a| a.history.clone())
            .unwrap_or_default())
    }

    async fn has_entry_for_source(
        &self,
        requester: &RequesterId,
        source: &LedgerSource,
    ) -> AppResult<bool> {
        let accounts = lock(&self.points);
        Ok(accounts
            .get(requester)
            .is_some_and(|a| a.history.iter().any(|e| e.source.as_ref() == Some(source))))
    }
}

#[async_trait]
impl VoucherStore for MemoryStore {
    async fn insert_owned(&self, voucher: &OwnedVoucher) -> AppResult<()> {
        self.vouchers.insert(voucher.id, voucher.clone());
        Ok(())
    }

    async fn get_owned(&self, id: OwnedVoucherId) -> AppResult<Option<OwnedVoucher>> {
        Ok(self.vouchers.get(&id).map(|v| v.clone()))
    }

    async fn find_unused_by_code(
        &self,
        requester: &RequesterId,
        code: &str,
    ) -> AppResult<Option<OwnedVoucher>> {
        Ok(self
            .vouchers
            .iter()
            .find(|v| v.requester_id == *requester && v.code == code && !v.used)
            .map(|v| v.clone()))
    }

    async fn mark_used(&self, id: OwnedVoucherId) -> AppResult<OwnedVoucher> {
        let mut voucher = self
            .vouchers
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Voucher {id} not found")))?;
        if voucher.used {
            return Err(AppError::already_used(format!(
                "Voucher {} was already redeemed",
                voucher.code
            )));
        }
        voucher.used = true;
        voucher.used_at = Some(Utc::now());
        Ok(voucher.clone())
    }

    async fn list_owned(&self, requester: &RequesterId) -> AppResult<Vec<OwnedVoucher>> {
        let mut out: Vec<OwnedVoucher> = self
            .vouchers
            .iter()
            .filter(|v| v.requester_id == *requester)
            .map(|v| v.clone())
            .collect();
        out.sort_by(|a, b| b.acquired_at.cmp(&a.acquired_at));
        Ok(out)
    }
}

#[async_trait]
impl CatalogSource for MemoryStore {
    async fn fetch(&self) -> AppResult<CatalogSnapshot> {
        Ok(self
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

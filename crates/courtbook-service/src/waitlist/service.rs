//! Waitlist queue service.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::{FacilityId, SlotKey, SportTag, WaitlistEntryId};
use courtbook_entity::waitlist::{WaitlistEntry, WaitlistStatus};
use courtbook_store::traits::WaitlistStore;

use crate::clock::Clock;
use crate::context::RequestContext;

/// Manages the per-slot FIFO waitlist.
///
/// This service is the sole mutator of waitlist entries. Enqueueing
/// never conflicts (any number of requesters may wait for one slot);
/// promotion hands the earliest queued entry for the *exact* slot back
/// to the booking lifecycle, which creates the replacement booking.
pub struct WaitlistService {
    /// Waitlist entry store.
    store: Arc<dyn WaitlistStore>,
    /// Time source for enqueue stamps.
    clock: Arc<dyn Clock>,
}

impl WaitlistService {
    /// Creates a new waitlist service.
    pub fn new(store: Arc<dyn WaitlistStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Enqueue the caller for an exact slot. Always succeeds.
    pub async fn join(
        &self,
        ctx: &RequestContext,
        facility_id: FacilityId,
        date: NaiveDate,
        slot: SlotKey,
        sport: SportTag,
    ) -> AppResult<WaitlistEntry> {
        let entry = WaitlistEntry {
            id: WaitlistEntryId::new(),
            facility_id,
            date,
            slot,
            requester_id: ctx.requester_id.clone(),
            sport,
            status: WaitlistStatus::Queued,
            enqueued_at: self.clock.now(),
        };
        self.store.add(&entry).await?;

        info!(
            entry_id = %entry.id,
            requester_id = %entry.requester_id,
            facility_id = %entry.facility_id,
            date = %entry.date,
            slot = %entry.slot,
            "Joined waitlist"
        );
        Ok(entry)
    }

    /// Withdraw the caller's own queued entry.
    pub async fn withdraw(&self, ctx: &RequestContext, entry_id: WaitlistEntryId) -> AppResult<()> {
        let entry = self
            .store
            .entry(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Waitlist entry {entry_id} not found")))?;

        if entry.requester_id != ctx.requester_id {
            return Err(AppError::forbidden(
                "Only the requester may withdraw their waitlist entry",
            ));
        }
        if entry.status != WaitlistStatus::Queued {
            return Err(AppError::invalid_state(format!(
                "Waitlist entry {entry_id} is no longer queued"
            )));
        }

        self.store.set_status(entry_id, WaitlistStatus::Canceled).await?;
        info!(entry_id = %entry_id, "Waitlist entry withdrawn");
        Ok(())
    }

    /// Take the earliest queued entry for the exact slot, moving it to
    /// held. `None` when nobody is waiting; the slot stays free. The
    /// caller settles the entry with [`WaitlistService::fulfill`] or
    /// [`WaitlistService::requeue`].
    pub async fn promote_first(
        &self,
        facility_id: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<WaitlistEntry>> {
        let promoted = self.store.take_first_queued(facility_id, date, slot).await?;
        if let Some(entry) = &promoted {
            info!(
                entry_id = %entry.id,
                requester_id = %entry.requester_id,
                slot = %slot,
                "Waitlist entry promoted"
            );
        }
        Ok(promoted)
    }

    /// Settle a held entry: its replacement booking was created.
    pub async fn fulfill(&self, entry_id: WaitlistEntryId) -> AppResult<()> {
        self.store.set_status(entry_id, WaitlistStatus::Fulfilled).await
    }

    /// Put a held entry back in the queue. Used when the replacement
    /// booking could not claim the slot after all.
    pub async fn requeue(&self, entry_id: WaitlistEntryId) -> AppResult<()> {
        self.store.set_status(entry_id, WaitlistStatus::Queued).await
    }

    /// All of the caller's entries, oldest first.
    pub async fn entries_for(&self, ctx: &RequestContext) -> AppResult<Vec<WaitlistEntry>> {
        self.store.entries_for(&ctx.requester_id).await
    }
}

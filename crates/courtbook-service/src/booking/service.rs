//! Booking lifecycle service.
//!
//! Creation runs Catalog (pricing) -> Slot Ledger (conflict check +
//! claim) -> record + points credit. Cancellation runs the request ->
//! approve/deny state machine; approval releases the slots and attempts
//! one waitlist promotion per freed slot.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use courtbook_core::error::{AppError, ErrorKind};
use courtbook_core::result::AppResult;
use courtbook_core::types::{BookingId, EquipmentId, FacilityId, Money, SlotKey, SlotSet};
use courtbook_entity::booking::{
    AppliedVoucher, Booking, BookingStatus, CancellationOutcome, CancellationRequest,
    EquipmentLine,
};
use courtbook_entity::points::{LedgerEntry, LedgerSource};
use courtbook_entity::waitlist::WaitlistEntry;
use courtbook_store::traits::{BookingStore, PointsStore, SlotLedger, VoucherStore};

use super::pricing;
use crate::catalog::CatalogService;
use crate::clock::Clock;
use crate::context::RequestContext;
use crate::waitlist::WaitlistService;

/// One equipment rental line in a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRental {
    /// Catalog equipment id.
    pub equipment_id: EquipmentId,
    /// Units to rent.
    pub quantity: u32,
}

/// Request to create a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Facility to book.
    pub facility_id: FacilityId,
    /// Booking date.
    pub date: NaiveDate,
    /// Contiguous hourly slots to claim.
    pub slots: SlotSet,
    /// Equipment to rent with the booking.
    #[serde(default)]
    pub equipment: Vec<EquipmentRental>,
    /// Redemption code of an owned voucher to apply, if any.
    #[serde(default)]
    pub voucher_code: Option<String>,
}

/// Outcome of a booking attempt that falls back to the waitlist.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    /// The slot set was free and the booking was created.
    Booked(Booking),
    /// The slot was taken; the caller was enqueued instead.
    Waitlisted(WaitlistEntry),
}

/// Drives booking creation and the cancellation state machine.
pub struct BookingService {
    /// Catalog cache for pricing and validity.
    catalog: Arc<CatalogService>,
    /// The authoritative slot occupancy index.
    ledger: Arc<dyn SlotLedger>,
    /// Booking records.
    bookings: Arc<dyn BookingStore>,
    /// Waitlist queue, promoted on slot release.
    waitlist: Arc<WaitlistService>,
    /// Points ledger for booking credits.
    points: Arc<dyn PointsStore>,
    /// Owned vouchers, consumed at checkout.
    vouchers: Arc<dyn VoucherStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        catalog: Arc<CatalogService>,
        ledger: Arc<dyn SlotLedger>,
        bookings: Arc<dyn BookingStore>,
        waitlist: Arc<WaitlistService>,
        points: Arc<dyn PointsStore>,
        vouchers: Arc<dyn VoucherStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            bookings,
            waitlist,
            points,
            vouchers,
            clock,
        }
    }

    /// Create a booking.
    ///
    /// Validates the facility and the slot set, claims the slots
    /// atomically, consumes the applied voucher, persists the booking,
    /// and credits points. A voucher that fails to redeem backs the slot
    /// claim out again, so a failed creation leaves no booking behind.
    /// On a conflict the distinguished `SlotTaken` error is returned so
    /// the caller can offer the waitlist instead.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateBookingRequest,
    ) -> AppResult<Booking> {
        let facility = self.catalog.facility(&req.facility_id).await?;
        let now = self.clock.now();
        self.validate_slot_timing(&req, now)?;

        let equipment = self.price_equipment(&req.equipment).await?;

        let voucher = match &req.voucher_code {
            Some(code) => Some(
                self.vouchers
                    .find_unused_by_code(&ctx.requester_id, code)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("No unused voucher with code {code}"))
                    })?,
            ),
            None => None,
        };

        let quote = pricing::quote(
            facility.hourly_rate,
            req.slots.len(),
            &equipment,
            voucher.as_ref().map(|v| v.amount_off),
        );

        let booking_id = BookingId::new();
        self.ledger
            .reserve(&req.facility_id, req.date, &req.slots, booking_id)
            .await?;

        // Consume the voucher before persisting the booking. The code was
        // only looked up above, so a concurrent session may have redeemed
        // it since; in that case back out the slot claim and report the
        // failure with nothing left behind.
        if let Some(v) = &voucher {
            if let Err(err) = self.vouchers.mark_used(v.id).await {
                self.ledger
                    .release(&req.facility_id, req.date, &req.slots, booking_id)
                    .await?;
                warn!(
                    booking_id = %booking_id,
                    voucher_id = %v.id,
                    "Voucher was redeemed concurrently, booking backed out"
                );
                return Err(err);
            }
        }

        let booking = Booking {
            id: booking_id,
            facility_id: req.facility_id,
            sport: facility.sport.clone(),
            requester_id: ctx.requester_id.clone(),
            date: req.date,
            slots: req.slots,
            status: BookingStatus::Booked,
            cancellation: None,
            equipment,
            voucher: voucher.as_ref().map(|v| AppliedVoucher {
                owned_voucher_id: v.id,
                code: v.code.clone(),
                amount_off: quote.discount,
            }),
            total_paid: quote.total,
            points_earned: quote.points_earned,
            created_at: now,
        };
        self.bookings.insert(&booking).await?;

        if booking.points_earned > 0 {
            let credit = LedgerEntry::booking_credit(
                ctx.requester_id.clone(),
                booking.id,
                booking.points_earned,
                format!("Booking {}", facility.name),
            );
            self.points.append(&credit).await?;
        }

        info!(
            booking_id = %booking.id,
            requester_id = %booking.requester_id,
            facility_id = %booking.facility_id,
            date = %booking.date,
            hours = booking.slots.len(),
            total = %booking.total_paid,
            "Booking created"
        );
        Ok(booking)
    }

    /// Create a booking, falling back to the waitlist on a conflict.
    ///
    /// Booking and waitlisting are mutually exclusive outcomes of one
    /// request. A waitlist entry is per exact slot, so the fallback only
    /// applies to single-slot requests; a conflicting multi-slot request
    /// reports `SlotTaken` and leaves the choice of slot to the caller.
    pub async fn create_or_waitlist(
        &self,
        ctx: &RequestContext,
        req: CreateBookingRequest,
    ) -> AppResult<BookingOutcome> {
        let facility_id = req.facility_id.clone();
        let date = req.date;
        let slots = req.slots.clone();

        match self.create(ctx, req).await {
            Ok(booking) => Ok(BookingOutcome::Booked(booking)),
            Err(err) if err.is(ErrorKind::SlotTaken) && slots.len() == 1 => {
                let facility = self.catalog.facility(&facility_id).await?;
                let entry = self
                    .waitlist
                    .join(ctx, facility_id, date, slots.first(), facility.sport)
                    .await?;
                Ok(BookingOutcome::Waitlisted(entry))
            }
            Err(err) => Err(err),
        }
    }

    /// Request cancellation of the caller's own booking.
    ///
    /// Moves a booked booking to pending-cancel. Re-requesting while
    /// already pending overwrites the note and timestamp but keeps the
    /// state.
    pub async fn request_cancellation(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
        note: impl Into<String>,
    ) -> AppResult<Booking> {
        let mut booking = self.get_existing(booking_id).await?;

        if booking.requester_id != ctx.requester_id {
            return Err(AppError::forbidden(
                "Only the booking's requester may ask to cancel it",
            ));
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::invalid_state(format!(
                "Booking {booking_id} is already cancelled"
            )));
        }

        booking.status = BookingStatus::PendingCancel;
        booking.cancellation = Some(CancellationRequest {
            note: note.into().trim().to_string(),
            requested_by: ctx.requester_id.clone(),
            requested_at: self.clock.now(),
            outcome: CancellationOutcome::Pending,
            processed_at: None,
        });
        self.bookings.update(&booking).await?;

        info!(booking_id = %booking_id, "Cancellation requested");
        Ok(booking)
    }

    /// Approve a pending cancellation (admin).
    ///
    /// Cancels the booking, releases every slot it held, and attempts
    /// one waitlist promotion per freed slot. Idempotent on an
    /// already-cancelled booking so retries are safe. Returns the
    /// bookings created for promoted waitlisters.
    pub async fn approve_cancellation(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> AppResult<Vec<Booking>> {
        self.require_admin(ctx)?;
        let booking = self.get_existing(booking_id).await?;

        match booking.status {
            BookingStatus::Cancelled => Ok(Vec::new()),
            BookingStatus::PendingCancel => {
                self.cancel_and_promote(ctx, booking, CancellationOutcome::Approved)
                    .await
            }
            BookingStatus::Booked => Err(AppError::invalid_state(format!(
                "Booking {booking_id} has no pending cancellation to approve"
            ))),
        }
    }

    /// Deny a pending cancellation (admin): the booking reverts to
    /// booked and keeps its slots.
    pub async fn deny_cancellation(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> AppResult<Booking> {
        self.require_admin(ctx)?;
        let mut booking = self.get_existing(booking_id).await?;

        if booking.status != BookingStatus::PendingCancel {
            return Err(AppError::invalid_state(format!(
                "Booking {booking_id} has no pending cancellation to deny"
            )));
        }

        booking.status = BookingStatus::Booked;
        if let Some(cancellation) = &mut booking.cancellation {
            cancellation.outcome = CancellationOutcome::Denied;
            cancellation.processed_at = Some(self.clock.now());
        }
        self.bookings.update(&booking).await?;

        info!(booking_id = %booking_id, "Cancellation denied");
        Ok(booking)
    }

    /// Cancel a booking directly (admin), with the same release and
    /// promotion effects as an approval. Idempotent on an
    /// already-cancelled booking.
    pub async fn force_cancel(
        &self,
        ctx: &RequestContext,
        booking_id: BookingId,
    ) -> AppResult<Vec<Booking>> {
        self.require_admin(ctx)?;
        let booking = self.get_existing(booking_id).await?;

        if booking.status == BookingStatus::Cancelled {
            return Ok(Vec::new());
        }
        self.cancel_and_promote(ctx, booking, CancellationOutcome::Approved)
            .await
    }

    /// Re-issue the points credit for a booking whose ledger entry went
    /// missing (e.g. a crash between booking persistence and the points
    /// step). Idempotent: a second call finds the entry and does
    /// nothing. Returns whether a credit was written.
    pub async fn repair_points_credit(&self, booking_id: BookingId) -> AppResult<bool> {
        let booking = self.get_existing(booking_id).await?;
        if booking.points_earned <= 0 {
            return Ok(false);
        }

        let source = LedgerSource::Booking(booking.id);
        if self
            .points
            .has_entry_for_source(&booking.requester_id, &source)
            .await?
        {
            return Ok(false);
        }

        let credit = LedgerEntry::booking_credit(
            booking.requester_id.clone(),
            booking.id,
            booking.points_earned,
            "Booking credit (reconciled)",
        );
        self.points.append(&credit).await?;
        warn!(booking_id = %booking_id, points = booking.points_earned, "Re-issued missing points credit");
        Ok(true)
    }

    /// Fetch a booking; the owner or an admin may view it.
    pub async fn get(&self, ctx: &RequestContext, booking_id: BookingId) -> AppResult<Booking> {
        let booking = self.get_existing(booking_id).await?;
        if booking.requester_id != ctx.requester_id && !ctx.is_admin() {
            return Err(AppError::forbidden("You can only view your own bookings"));
        }
        Ok(booking)
    }

    /// All bookings owned by the caller, newest first.
    pub async fn list_mine(&self, ctx: &RequestContext) -> AppResult<Vec<Booking>> {
        self.bookings.list_for_requester(&ctx.requester_id).await
    }

    /// Taken start times for a facility/date, for availability screens.
    pub async fn taken_slots(
        &self,
        facility_id: &FacilityId,
        date: NaiveDate,
    ) -> AppResult<BTreeSet<SlotKey>> {
        Ok(self
            .ledger
            .claims(facility_id, date)
            .await?
            .into_keys()
            .collect())
    }

    async fn get_existing(&self, booking_id: BookingId) -> AppResult<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {booking_id} not found")))
    }

    fn require_admin(&self, ctx: &RequestContext) -> AppResult<()> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Cancellation decisions require the admin role",
            ))
        }
    }

    /// Reject dates in the past and same-day slots whose start time has
    /// already elapsed.
    fn validate_slot_timing(
        &self,
        req: &CreateBookingRequest,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let today = now.date_naive();
        if req.date < today {
            return Err(AppError::validation(format!(
                "Booking date {} is in the past",
                req.date
            )));
        }
        if req.date == today && req.slots.first().start_time() < now.time() {
            return Err(AppError::validation(format!(
                "Slot {} has already started today",
                req.slots.first()
            )));
        }
        Ok(())
    }

    /// Price the requested equipment lines against the catalog.
    async fn price_equipment(
        &self,
        rentals: &[EquipmentRental],
    ) -> AppResult<Vec<EquipmentLine>> {
        let mut lines = Vec::with_capacity(rentals.len());
        for rental in rentals {
            let item = self.catalog.equipment(&rental.equipment_id).await?;
            if rental.quantity == 0 {
                return Err(AppError::validation(format!(
                    "Rental quantity for {} must be positive",
                    item.label
                )));
            }
            if rental.quantity > item.stock {
                return Err(AppError::validation(format!(
                    "Only {} x {} in stock",
                    item.stock, item.label
                )));
            }
            lines.push(EquipmentLine {
                equipment_id: item.id,
                label: item.label,
                quantity: rental.quantity,
                rate: item.rental_rate,
            });
        }
        Ok(lines)
    }

    /// Cancel the booking, release its slots, and run one promotion
    /// attempt per freed slot.
    ///
    /// A force-cancel has no prior request on file, so the audit record
    /// created here names the acting admin, not the booking owner.
    async fn cancel_and_promote(
        &self,
        ctx: &RequestContext,
        mut booking: Booking,
        outcome: CancellationOutcome,
    ) -> AppResult<Vec<Booking>> {
        let now = self.clock.now();
        booking.status = BookingStatus::Cancelled;
        let cancellation = booking.cancellation.get_or_insert(CancellationRequest {
            note: String::new(),
            requested_by: ctx.requester_id.clone(),
            requested_at: now,
            outcome: CancellationOutcome::Pending,
            processed_at: None,
        });
        cancellation.outcome = outcome;
        cancellation.processed_at = Some(now);
        self.bookings.update(&booking).await?;

        self.ledger
            .release(&booking.facility_id, booking.date, &booking.slots, booking.id)
            .await?;
        info!(booking_id = %booking.id, "Booking cancelled, slots released");

        let mut promoted = Vec::new();
        for slot in booking.slots.iter() {
            if let Some(replacement) = self
                .promote_into_booking(&booking.facility_id, booking.date, slot)
                .await?
            {
                promoted.push(replacement);
            }
        }
        Ok(promoted)
    }

    /// Promote the earliest waitlister for one freed slot into a fresh
    /// single-slot booking. Promoted bookings settle on site: zero paid,
    /// no points.
    async fn promote_into_booking(
        &self,
        facility_id: &FacilityId,
        date: NaiveDate,
        slot: SlotKey,
    ) -> AppResult<Option<Booking>> {
        let Some(entry) = self.waitlist.promote_first(facility_id, date, slot).await? else {
            return Ok(None);
        };

        let booking_id = BookingId::new();
        let slots = SlotSet::single(slot);
        if let Err(err) = self.ledger.reserve(facility_id, date, &slots, booking_id).await {
            if err.is(ErrorKind::SlotTaken) {
                // The freed slot was re-claimed before the promotion
                // landed; put the waitlister back at their old position.
                warn!(entry_id = %entry.id, slot = %slot, "Promotion lost the slot, requeueing");
                self.waitlist.requeue(entry.id).await?;
                return Ok(None);
            }
            return Err(err);
        }

        let booking = Booking {
            id: booking_id,
            facility_id: facility_id.clone(),
            sport: entry.sport.clone(),
            requester_id: entry.requester_id.clone(),
            date,
            slots,
            status: BookingStatus::Booked,
            cancellation: None,
            equipment: Vec::new(),
            voucher: None,
            total_paid: Money::ZERO,
            points_earned: 0,
            created_at: self.clock.now(),
        };
        self.bookings.insert(&booking).await?;
        self.waitlist.fulfill(entry.id).await?;

        info!(
            booking_id = %booking.id,
            requester_id = %booking.requester_id,
            slot = %slot,
            "Waitlisted requester promoted into a booking"
        );
        Ok(Some(booking))
    }
}

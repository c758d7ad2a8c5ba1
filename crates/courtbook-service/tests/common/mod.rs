//! Shared wiring for the service integration tests: a fully injected
//! service layer over one `MemoryStore` with a seeded catalog and a
//! movable clock.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use courtbook_core::types::{
    EquipmentId, FacilityId, LedgerEntryId, Money, RequesterId, SlotSet, SportTag, VoucherId,
};
use courtbook_entity::catalog::{Equipment, Facility, VoucherOffer};
use courtbook_entity::points::LedgerEntry;
use courtbook_service::{
    BookingService, CatalogService, Clock, CreateBookingRequest, FixedClock, PointsService,
    VoucherService, WaitlistService,
};
use courtbook_store::traits::{
    BookingStore, CatalogSource, PointsStore, SlotLedger, VoucherStore, WaitlistStore,
};
use courtbook_store::MemoryStore;

/// The fixed "now" every test starts from.
pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
}

/// A booking date comfortably after [`opening_time`].
pub fn booking_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 21).expect("valid date")
}

/// The whole service layer wired over a single in-memory store.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub bookings: Arc<BookingService>,
    pub waitlist: Arc<WaitlistService>,
    pub vouchers: Arc<VoucherService>,
    pub points: Arc<PointsService>,
}

impl TestApp {
    /// Wires every service against one seeded store.
    pub fn new() -> Self {
        let store = seeded_store();
        let vouchers: Arc<dyn VoucherStore> = store.clone();
        Self::wire(store, vouchers)
    }

    /// Wire the service layer over a store, with a caller-supplied
    /// voucher store so tests can interpose on the voucher path.
    pub fn wire(store: Arc<MemoryStore>, voucher_store: Arc<dyn VoucherStore>) -> Self {
        let clock = Arc::new(FixedClock::at(opening_time()));

        let catalog_source: Arc<dyn CatalogSource> = store.clone();
        let slot_ledger: Arc<dyn SlotLedger> = store.clone();
        let booking_store: Arc<dyn BookingStore> = store.clone();
        let waitlist_store: Arc<dyn WaitlistStore> = store.clone();
        let points_store: Arc<dyn PointsStore> = store.clone();
        let clock_dyn: Arc<dyn Clock> = clock.clone();

        let catalog = Arc::new(CatalogService::new(catalog_source));
        let waitlist = Arc::new(WaitlistService::new(waitlist_store, clock_dyn.clone()));
        let bookings = Arc::new(BookingService::new(
            catalog.clone(),
            slot_ledger,
            booking_store,
            waitlist.clone(),
            points_store.clone(),
            voucher_store.clone(),
            clock_dyn.clone(),
        ));
        let vouchers = Arc::new(VoucherService::new(
            catalog,
            voucher_store,
            points_store.clone(),
            clock_dyn,
        ));
        let points = Arc::new(PointsService::new(points_store));

        Self {
            store,
            clock,
            bookings,
            waitlist,
            vouchers,
            points,
        }
    }

    /// Seed a starting balance outside the booking flows.
    pub async fn grant_points(&self, requester: &str, points: i64) {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            requester_id: RequesterId::from(requester),
            delta: points,
            reason: "Signup bonus".to_string(),
            source: None,
            created_at: self.clock.now(),
        };
        PointsStore::append(self.store.as_ref(), &entry)
            .await
            .expect("seed credit");
    }
}

/// A `MemoryStore` with the shared catalog fixture: two RM18/h badminton
/// courts, racquet rental at RM5, and an RM10-for-60-points offer plus a
/// retired one.
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.seed_facility(Facility {
        id: FacilityId::from("court-1"),
        name: "Badminton Court A".to_string(),
        sport: SportTag::from("BADMINTON"),
        hourly_rate: Money::from_sen(1800),
    });
    store.seed_facility(Facility {
        id: FacilityId::from("court-2"),
        name: "Badminton Court B".to_string(),
        sport: SportTag::from("BADMINTON"),
        hourly_rate: Money::from_sen(1800),
    });
    store.seed_equipment(Equipment {
        id: EquipmentId::from("eq-racquet"),
        sport: SportTag::from("BADMINTON"),
        label: "Racquet".to_string(),
        stock: 4,
        rental_rate: Money::from_sen(500),
    });
    store.seed_offer(VoucherOffer {
        id: VoucherId::from("offer-rm10"),
        amount_off: Money::from_units(10),
        cost_points: 60,
        active: true,
    });
    store.seed_offer(VoucherOffer {
        id: VoucherId::from("offer-retired"),
        amount_off: Money::from_units(5),
        cost_points: 30,
        active: false,
    });
    store
}

/// A one-hour request for `court-1` on [`booking_date`].
pub fn slot_request(start: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        facility_id: FacilityId::from("court-1"),
        date: booking_date(),
        slots: SlotSet::parse(&[start]).expect("valid slot"),
        equipment: Vec::new(),
        voucher_code: None,
    }
}

//! End-to-end booking lifecycle tests: creation, the cancellation
//! request/approve/deny workflow, and waitlist promotion.

mod common;

use chrono::{NaiveDate, TimeZone, Utc};

use courtbook_core::types::{FacilityId, Money, SlotKey, SlotSet};
use courtbook_core::ErrorKind;
use courtbook_entity::booking::{Booking, BookingStatus, CancellationOutcome};
use courtbook_entity::waitlist::WaitlistStatus;
use courtbook_service::{BookingOutcome, CreateBookingRequest, EquipmentRental, RequestContext};
use courtbook_store::traits::{BookingStore, SlotLedger};

use common::{booking_date, slot_request, TestApp};

fn court_1() -> FacilityId {
    FacilityId::from("court-1")
}

fn slot(start: &str) -> SlotKey {
    start.parse().expect("valid slot")
}

#[tokio::test]
async fn test_cancellation_approval_promotes_waitlisted_requester() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .expect("slot is free");
    assert_eq!(booking.status, BookingStatus::Booked);
    assert_eq!(booking.total_paid, Money::from_sen(1800));
    assert_eq!(booking.points_earned, 18);

    // Bob's identical request conflicts and lands on the waitlist.
    let outcome = app
        .bookings
        .create_or_waitlist(&bob, slot_request("10:00"))
        .await
        .unwrap();
    let entry = match outcome {
        BookingOutcome::Waitlisted(entry) => entry,
        BookingOutcome::Booked(_) => panic!("slot was already taken"),
    };
    assert_eq!(entry.status, WaitlistStatus::Queued);

    app.bookings
        .request_cancellation(&alice, booking.id, "schedule clash")
        .await
        .unwrap();

    let promoted = app
        .bookings
        .approve_cancellation(&admin, booking.id)
        .await
        .unwrap();
    assert_eq!(promoted.len(), 1);
    let replacement = &promoted[0];
    assert_eq!(replacement.requester_id, bob.requester_id);
    assert_eq!(replacement.status, BookingStatus::Booked);
    assert_eq!(replacement.total_paid, Money::ZERO);
    assert_eq!(replacement.points_earned, 0);

    let cancelled = app.bookings.get(&alice, booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    let cancellation = cancelled.cancellation.expect("request recorded");
    assert_eq!(cancellation.outcome, CancellationOutcome::Approved);
    assert_eq!(cancellation.note, "schedule clash");
    assert_eq!(cancellation.requested_by, alice.requester_id);
    assert!(cancellation.processed_at.is_some());

    // The slot now belongs to Bob's replacement booking.
    let holder = app
        .store
        .holder(&court_1(), booking_date(), slot("10:00"))
        .await
        .unwrap();
    assert_eq!(holder, Some(replacement.id));
    let entries = app.waitlist.entries_for(&bob).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, WaitlistStatus::Fulfilled);
}

#[tokio::test]
async fn test_denied_cancellation_keeps_booking_and_slots() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings
        .request_cancellation(&alice, booking.id, "maybe not")
        .await
        .unwrap();

    let denied = app
        .bookings
        .deny_cancellation(&admin, booking.id)
        .await
        .unwrap();
    assert_eq!(denied.status, BookingStatus::Booked);
    let cancellation = denied.cancellation.expect("request preserved");
    assert_eq!(cancellation.outcome, CancellationOutcome::Denied);
    assert!(cancellation.processed_at.is_some());

    // The slot was never released.
    let err = app
        .bookings
        .create(&bob, slot_request("10:00"))
        .await
        .expect_err("slot still held");
    assert_eq!(err.kind, ErrorKind::SlotTaken);
}

#[tokio::test]
async fn test_cancellation_request_is_owner_only() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();

    let err = app
        .bookings
        .request_cancellation(&bob, booking.id, "not mine")
        .await
        .expect_err("only the owner may request");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_cancellation_decisions_require_admin() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings
        .request_cancellation(&alice, booking.id, "clash")
        .await
        .unwrap();

    let approve = app.bookings.approve_cancellation(&alice, booking.id).await;
    assert_eq!(approve.expect_err("not an admin").kind, ErrorKind::Forbidden);
    let deny = app.bookings.deny_cancellation(&alice, booking.id).await;
    assert_eq!(deny.expect_err("not an admin").kind, ErrorKind::Forbidden);
    let force = app.bookings.force_cancel(&alice, booking.id).await;
    assert_eq!(force.expect_err("not an admin").kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_decisions_need_a_pending_request() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();

    let approve = app.bookings.approve_cancellation(&admin, booking.id).await;
    assert_eq!(
        approve.expect_err("nothing pending").kind,
        ErrorKind::InvalidState
    );
    let deny = app.bookings.deny_cancellation(&admin, booking.id).await;
    assert_eq!(
        deny.expect_err("nothing pending").kind,
        ErrorKind::InvalidState
    );
}

#[tokio::test]
async fn test_approve_is_idempotent_once_cancelled() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings
        .request_cancellation(&alice, booking.id, "clash")
        .await
        .unwrap();
    app.bookings
        .approve_cancellation(&admin, booking.id)
        .await
        .unwrap();

    // A retried approval changes nothing and promotes nobody.
    let again = app
        .bookings
        .approve_cancellation(&admin, booking.id)
        .await
        .unwrap();
    assert!(again.is_empty());
    let still = app.bookings.get(&alice, booking.id).await.unwrap();
    assert_eq!(still.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancelled_is_absorbing() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings.force_cancel(&admin, booking.id).await.unwrap();

    let err = app
        .bookings
        .request_cancellation(&alice, booking.id, "again")
        .await
        .expect_err("cancelled bookings stay cancelled");
    assert_eq!(err.kind, ErrorKind::InvalidState);

    // Force-cancel retries are no-ops too.
    let again = app.bookings.force_cancel(&admin, booking.id).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_force_cancel_audit_names_the_admin() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings.force_cancel(&admin, booking.id).await.unwrap();

    // No request was ever on file, so the record distinguishes the
    // forced cancellation from an owner-requested one.
    let cancelled = app.bookings.get(&alice, booking.id).await.unwrap();
    let cancellation = cancelled.cancellation.expect("audit record created");
    assert_eq!(cancellation.requested_by, admin.requester_id);
    assert_eq!(cancellation.outcome, CancellationOutcome::Approved);
    assert!(cancellation.note.is_empty());
    assert!(cancellation.processed_at.is_some());
}

#[tokio::test]
async fn test_re_request_overwrites_the_note() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings
        .request_cancellation(&alice, booking.id, "first reason")
        .await
        .unwrap();
    let updated = app
        .bookings
        .request_cancellation(&alice, booking.id, "  better reason  ")
        .await
        .unwrap();

    assert_eq!(updated.status, BookingStatus::PendingCancel);
    let cancellation = updated.cancellation.expect("request recorded");
    assert_eq!(cancellation.note, "better reason");
    assert_eq!(cancellation.outcome, CancellationOutcome::Pending);
}

#[tokio::test]
async fn test_freed_slot_is_rebookable_when_nobody_waits() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    app.bookings
        .request_cancellation(&alice, booking.id, "clash")
        .await
        .unwrap();
    let promoted = app
        .bookings
        .approve_cancellation(&admin, booking.id)
        .await
        .unwrap();
    assert!(promoted.is_empty());

    // The slot is simply free again.
    let rebooked = app
        .bookings
        .create(&bob, slot_request("10:00"))
        .await
        .expect("slot was released");
    assert_eq!(rebooked.requester_id, bob.requester_id);
}

#[tokio::test]
async fn test_multi_slot_conflict_does_not_waitlist() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");

    app.bookings
        .create(&alice, slot_request("11:00"))
        .await
        .unwrap();

    let mut req = slot_request("10:00");
    req.slots = SlotSet::parse(&["10:00", "11:00"]).unwrap();
    let err = app
        .bookings
        .create_or_waitlist(&bob, req)
        .await
        .expect_err("multi-slot conflicts report the error");
    assert_eq!(err.kind, ErrorKind::SlotTaken);
    assert!(app.waitlist.entries_for(&bob).await.unwrap().is_empty());

    // The free 10:00 slot was not partially claimed by the failed attempt.
    let taken = app
        .bookings
        .taken_slots(&court_1(), booking_date())
        .await
        .unwrap();
    assert_eq!(taken.len(), 1);
    assert!(taken.contains(&slot("11:00")));
}

#[tokio::test]
async fn test_rejects_past_and_elapsed_dates() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let mut past = slot_request("10:00");
    past.date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
    let err = app.bookings.create(&alice, past).await.expect_err("past date");
    assert_eq!(err.kind, ErrorKind::Validation);

    // Same day, 11:30: the 10:00 slot has started, 12:00 has not.
    app.clock
        .set(Utc.with_ymd_and_hms(2025, 10, 21, 11, 30, 0).unwrap());
    let err = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .expect_err("elapsed same-day slot");
    assert_eq!(err.kind, ErrorKind::Validation);

    app.bookings
        .create(&alice, slot_request("12:00"))
        .await
        .expect("future same-day slot books");
}

#[tokio::test]
async fn test_unknown_facility_rejected() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let mut req = slot_request("10:00");
    req.facility_id = FacilityId::from("court-99");
    let err = app.bookings.create(&alice, req).await.expect_err("no such court");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_equipment_validation() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let mut unknown = slot_request("10:00");
    unknown.equipment = vec![EquipmentRental {
        equipment_id: "eq-ghost".into(),
        quantity: 1,
    }];
    let err = app.bookings.create(&alice, unknown).await.expect_err("unknown item");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let mut zero = slot_request("10:00");
    zero.equipment = vec![EquipmentRental {
        equipment_id: "eq-racquet".into(),
        quantity: 0,
    }];
    let err = app.bookings.create(&alice, zero).await.expect_err("zero quantity");
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut over = slot_request("10:00");
    over.equipment = vec![EquipmentRental {
        equipment_id: "eq-racquet".into(),
        quantity: 5,
    }];
    let err = app.bookings.create(&alice, over).await.expect_err("beyond stock");
    assert_eq!(err.kind, ErrorKind::Validation);

    // Nothing was claimed by the failed attempts.
    let taken = app
        .bookings
        .taken_slots(&court_1(), booking_date())
        .await
        .unwrap();
    assert!(taken.is_empty());
}

#[tokio::test]
async fn test_two_hour_booking_with_equipment_earns_points() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    let req = CreateBookingRequest {
        facility_id: court_1(),
        date: booking_date(),
        slots: SlotSet::parse(&["10:00", "11:00"]).unwrap(),
        equipment: vec![EquipmentRental {
            equipment_id: "eq-racquet".into(),
            quantity: 2,
        }],
        voucher_code: None,
    };
    let booking = app.bookings.create(&alice, req).await.unwrap();

    // 2 x RM18 court + 2 x RM5 racquets = RM46, 46 points.
    assert_eq!(booking.total_paid, Money::from_sen(4600));
    assert_eq!(booking.points_earned, 46);
    assert_eq!(app.points.balance(&alice).await.unwrap(), 46);

    let taken = app
        .bookings
        .taken_slots(&court_1(), booking_date())
        .await
        .unwrap();
    assert_eq!(taken.len(), 2);
}

#[tokio::test]
async fn test_get_is_owner_or_admin() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();

    let err = app.bookings.get(&bob, booking.id).await.expect_err("not the owner");
    assert_eq!(err.kind, ErrorKind::Forbidden);
    app.bookings.get(&admin, booking.id).await.expect("admins may view");

    let mine = app.bookings.list_mine(&alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(app.bookings.list_mine(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repair_points_credit_is_idempotent() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");

    // A normally created booking already carries its credit.
    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    assert!(!app.bookings.repair_points_credit(booking.id).await.unwrap());
    assert_eq!(app.points.balance(&alice).await.unwrap(), 18);

    // A booking record whose credit never landed gets repaired once.
    let orphan = Booking {
        id: courtbook_core::types::BookingId::new(),
        points_earned: 25,
        ..booking.clone()
    };
    app.store.insert(&orphan).await.unwrap();
    assert!(app.bookings.repair_points_credit(orphan.id).await.unwrap());
    assert_eq!(app.points.balance(&alice).await.unwrap(), 43);
    assert!(!app.bookings.repair_points_credit(orphan.id).await.unwrap());
    assert_eq!(app.points.balance(&alice).await.unwrap(), 43);
}

#[tokio::test]
async fn test_waitlist_withdraw() {
    let app = TestApp::new();
    let alice = RequestContext::new("alice");
    let bob = RequestContext::new("bob");
    let carol = RequestContext::new("carol");
    let admin = RequestContext::admin("staff-1");

    let booking = app
        .bookings
        .create(&alice, slot_request("10:00"))
        .await
        .unwrap();
    let BookingOutcome::Waitlisted(bob_entry) = app
        .bookings
        .create_or_waitlist(&bob, slot_request("10:00"))
        .await
        .unwrap()
    else {
        panic!("slot was taken");
    };
    app.bookings
        .create_or_waitlist(&carol, slot_request("10:00"))
        .await
        .unwrap();

    // Carol may not withdraw Bob's entry; Bob may.
    let err = app.waitlist.withdraw(&carol, bob_entry.id).await.expect_err("not hers");
    assert_eq!(err.kind, ErrorKind::Forbidden);
    app.waitlist.withdraw(&bob, bob_entry.id).await.unwrap();

    // A withdrawn entry is skipped at promotion time.
    app.bookings
        .request_cancellation(&alice, booking.id, "clash")
        .await
        .unwrap();
    let promoted = app
        .bookings
        .approve_cancellation(&admin, booking.id)
        .await
        .unwrap();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].requester_id, carol.requester_id);

    // Withdrawing again is rejected, not silently accepted.
    let err = app.waitlist.withdraw(&bob, bob_entry.id).await.expect_err("no longer queued");
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

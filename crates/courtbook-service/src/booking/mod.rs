//! Booking lifecycle: creation, pricing, and the cancellation workflow.

mod pricing;
mod service;

pub use pricing::Quote;
pub use service::{BookingOutcome, BookingService, CreateBookingRequest, EquipmentRental};

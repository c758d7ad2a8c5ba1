//! # courtbook-service
//!
//! Business logic service layer for Courtbook. Each service orchestrates
//! the store traits to implement application-level use cases: booking a
//! court, driving the cancellation workflow, promoting the waitlist, and
//! spending points on vouchers.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references, so the whole layer runs
//! against the in-memory store in tests and against a real backend in
//! production.

pub mod booking;
pub mod catalog;
pub mod clock;
pub mod context;
pub mod points;
pub mod voucher;
pub mod waitlist;

pub use booking::{BookingOutcome, BookingService, CreateBookingRequest, EquipmentRental};
pub use catalog::CatalogService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use context::RequestContext;
pub use points::PointsService;
pub use voucher::VoucherService;
pub use waitlist::WaitlistService;

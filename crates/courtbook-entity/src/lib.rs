//! # courtbook-entity
//!
//! Domain entity models for Courtbook. Every struct in this crate
//! represents a persisted record or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod booking;
pub mod catalog;
pub mod points;
pub mod voucher;
pub mod waitlist;

pub use booking::{
    AppliedVoucher, Booking, BookingStatus, CancellationOutcome, CancellationRequest,
    EquipmentLine,
};
pub use catalog::{CatalogSnapshot, Equipment, Facility, VoucherOffer};
pub use points::{LedgerEntry, LedgerSource};
pub use voucher::OwnedVoucher;
pub use waitlist::{WaitlistEntry, WaitlistStatus};

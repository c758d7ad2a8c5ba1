//! Shared core types: identifiers, the hourly slot grid, and money.

pub mod id;
pub mod money;
pub mod slot;

pub use id::{
    BookingId, EquipmentId, FacilityId, LedgerEntryId, OwnedVoucherId, RequesterId, SportTag,
    VoucherId, WaitlistEntryId,
};
pub use money::Money;
pub use slot::{SlotKey, SlotSet, parse_date};

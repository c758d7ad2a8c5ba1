//! # courtbook-store
//!
//! Store abstraction for Courtbook. The traits in [`traits`] are the
//! only way the core touches shared state; their documented atomicity
//! guarantees are part of the contract every backend must honor. The
//! [`memory`] module ships the in-memory provider used in tests and
//! single-node deployments; any engine with a per-key atomic
//! conditional write can implement the same traits.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{BookingStore, CatalogSource, PointsStore, SlotLedger, VoucherStore, WaitlistStore};

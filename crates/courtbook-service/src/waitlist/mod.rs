//! Waitlist queue: per-slot FIFO of requesters waiting for a taken slot.

mod service;

pub use service::WaitlistService;

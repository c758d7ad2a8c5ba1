//! In-memory store provider.

mod store;

pub use store::MemoryStore;

//! Points balance and history reads.

mod service;

pub use service::PointsService;

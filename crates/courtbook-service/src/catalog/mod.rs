//! Catalog cache: read-only snapshot of facilities, equipment, sports,
//! and voucher offers, refreshed on demand.

mod service;

pub use service::CatalogService;

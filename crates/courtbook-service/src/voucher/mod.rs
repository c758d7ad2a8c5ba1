//! Voucher purchase, redemption, and checkout application.

mod code;
mod service;

pub use code::redemption_code;
pub use service::VoucherService;

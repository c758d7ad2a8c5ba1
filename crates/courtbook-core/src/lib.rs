//! # courtbook-core
//!
//! Core crate for Courtbook. Contains the unified error system,
//! configuration schemas, typed identifiers, the hourly slot grid, and
//! the money type used for pricing.
//!
//! This crate has **no** internal dependencies on other Courtbook crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;

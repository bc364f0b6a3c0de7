//! # paywatch-core
//!
//! Core crate for PayWatch. Contains configuration schemas, the email
//! provider seam, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PayWatch crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

//! # paywatch-entity
//!
//! Domain entity models for PayWatch. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod delivery;
pub mod finance;
pub mod notification;
pub mod recipient;

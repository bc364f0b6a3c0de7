//! In-process implementation of every store trait.
//!
//! Used by the test suites and by dry runs that should not touch the
//! database. Enforces the same uniqueness backstops as the SQL schema.

mod store;

pub use store::MemoryStore;

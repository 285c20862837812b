//! Domain model for owner-scoped location records.
//!
//! # Responsibility
//! - Define the records returned to callers and the validated inputs accepted
//!   by write paths.
//!
//! # Invariants
//! - Every location is identified externally by an immutable public id.
//! - Validated inputs never carry blank or oversized text.

pub mod location;
pub mod user;

//! Pure domain logic for the session generation engine.
//!
//! This crate has zero internal deps so it can be used by both the
//! API/repository layer and any future worker or CLI tooling. Nothing in
//! here touches the database or the network.

pub mod classify;
pub mod error;
pub mod recurrence;
pub mod timezone;
pub mod types;

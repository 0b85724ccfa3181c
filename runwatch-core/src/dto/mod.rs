//! Data Transfer Objects
//!
//! Request and report shapes exchanged between runwatch and its callers.
//! DTOs are thin wrappers over the domain snapshots, built for a single use.

pub mod status;
pub mod task;

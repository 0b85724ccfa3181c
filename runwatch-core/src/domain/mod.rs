//! Core domain types
//!
//! Execution snapshots as reported by the orchestration engine. Every value
//! here is a read-only snapshot of one fetch: nothing in runwatch mutates a
//! `status` block, and a fresh fetch is the only way to observe progress.

pub mod condition;
pub mod meta;
pub mod pipeline;
pub mod pod;
pub mod task;

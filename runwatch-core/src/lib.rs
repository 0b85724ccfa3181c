//! Runwatch Core
//!
//! Core types for tracking pipeline and task executions run by a
//! Tekton-style orchestration engine.
//!
//! This crate contains:
//! - Domain types: execution snapshots as the engine reports them (PipelineRun, TaskRun, Pod)
//! - DTOs: request and report shapes built on top of the domain types

pub mod domain;
pub mod dto;

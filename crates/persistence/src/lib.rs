//! Persistence layer for the Ami SOS backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//!
//! Both quorum transitions (vigilance escalation, abuse blocking) are
//! implemented here as single conditional UPDATEs so they are exactly-once
//! under concurrent writers.

pub mod db;
pub mod entities;
pub mod repositories;

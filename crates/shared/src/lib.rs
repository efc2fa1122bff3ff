//! Shared utilities for the Ami SOS backend.
//!
//! This crate contains cross-cutting helpers used by every other crate:
//! - Phone-number identity canonicalization
//! - Common input validation functions

pub mod phone;
pub mod validation;

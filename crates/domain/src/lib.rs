//! Domain logic for the Ami SOS alert routing engine.
//!
//! This crate contains:
//! - Geographic radius search (`geo`)
//! - The static emergency protocol table (`protocol`)
//! - Domain models and request/response payloads (`models`)
//! - Service trait seams consumed by the API layer (`services`)
//!
//! Nothing in this crate touches the database or the network.

pub mod geo;
pub mod models;
pub mod protocol;
pub mod services;

//! HTTP route handlers.

pub mod alerts;
pub mod health;
pub mod network;
pub mod reports;
pub mod vigilance;

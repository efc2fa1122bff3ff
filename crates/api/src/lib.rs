//! Alert routing and escalation engine for the Ami SOS network.
//!
//! Receives panic alerts from phones, BLE wristbands and ESP32 buttons,
//! resolves the personal, institutional and community circles that should
//! hear about each one, and fans out push notifications.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;

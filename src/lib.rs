//! Oficina - vehicle check-in for auto shops
//!
//! The library holds the check-in wizard core, backend providers and the
//! terminal UI; `main.rs` only parses the command line.

pub mod api;
pub mod app;
pub mod auth;
pub mod checkin;
pub mod config;
pub mod logging;
pub mod ui;

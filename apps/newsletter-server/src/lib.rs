//! # Newsletter Server
//!
//! Posts and comments over HTML forms, plus a small JSON auth API.
//! The binary in `main.rs` only wires configuration and telemetry.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
pub mod views;

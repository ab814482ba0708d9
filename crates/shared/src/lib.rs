//! Shared types and configuration for Cobro.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{ClientId, DebtId, PaymentId, ProductId};

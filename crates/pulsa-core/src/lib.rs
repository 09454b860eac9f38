//! Pulsa Store Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Pulsa Store settlement engine. It includes:
//!
//! - Domain models (Account, Package, Transaction, Topup, Withdrawal, LedgerEntry)
//! - Money arithmetic in integer minor units
//! - Common traits for repositories and external collaborators
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

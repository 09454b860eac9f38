//! Data Transfer Objects (DTOs) for API requests and responses

pub mod admin;
pub mod balance;
pub mod common;
pub mod purchase;

pub use admin::*;
pub use balance::*;
pub use common::*;
pub use purchase::*;

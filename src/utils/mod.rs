//! Utilities Module
//!
//! Logging, configuration and hashing helpers shared across the crate.

pub mod engine_config;
pub mod hashing;
pub mod logging;

pub use hashing::{hash160, hmac_sha512, sha256};

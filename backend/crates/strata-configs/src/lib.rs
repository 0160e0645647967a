//! strata-configs
//!
//! Server configuration types and loader for Strata.

pub mod config;

pub use config::*;

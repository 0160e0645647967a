//! Strata Server Library
//!
//! Logging initialisation and bootstrap of the live query subsystem. Exposed
//! as a library for integration testing.

pub mod lifecycle;
pub mod logging;

pub use lifecycle::StrataServer;

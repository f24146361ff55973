//! clipshape Common Utilities
//!
//! Shared infrastructure for all clipshape crates:
//! - Error taxonomy and result aliases
//! - Localized message catalogue
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod messages;

pub use config::*;
pub use error::*;
pub use messages::*;

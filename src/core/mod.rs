//! Ambient engine concerns: error types, logging, and shared config.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use error::Error;
pub use types::Result;

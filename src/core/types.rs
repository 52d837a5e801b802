//! Core type aliases.

/// Standard Result type for the streaming pipeline.
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

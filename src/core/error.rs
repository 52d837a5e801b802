//! Error types for the streaming pipeline.

use thiserror::Error;

/// Main error type for the world-streaming pipeline.
///
/// `EvictionSkipped` from the design is deliberately not a variant here: it is
/// not an error, it's a stat reported alongside a successful eviction sweep
/// (see [`crate::client::eviction::EvictionReport`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The node pipeline graph has a cycle or references an unknown node type.
    /// Fatal to the request; no partial state is produced.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A node's `execute` returned an error. The whole region result is discarded.
    #[error("node {node_id} failed: {cause}")]
    NodeFailure { node_id: String, cause: String },

    /// The world's pipeline or config file is missing or malformed.
    #[error("region unavailable: {0}")]
    RegionUnavailable(String),

    /// Wire codec magic/version mismatch, or a truncated payload.
    #[error("invalid chunk: {0}")]
    InvalidChunk(String),

    /// A chunk fetch failed (I/O, decode, etc). Counted, never retried within the frame.
    #[error("fetch error: {0}")]
    FetchError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! World/pipeline configuration loading and the chunk request contract (§4.10, §4.11).

pub mod config;
pub mod contract;
pub mod pipeline;

pub use config::WorldConfig;
pub use contract::{request_chunk, ChunkResponse};
pub use pipeline::World;

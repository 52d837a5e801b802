//! The GPU-request-driven chunk cache: dedup pool, eviction, meta-grid,
//! host-side GPU buffer packing, and the per-frame request loop (§4.5-§4.8).

pub mod chunk_cache;
pub mod dedup_pool;
pub mod eviction;
pub mod frame;
pub mod gpu_buffers;
pub mod meta_grid;
pub mod request_loop;

pub use chunk_cache::ChunkCache;
pub use dedup_pool::DedupPool;
pub use eviction::{EvictionController, EvictionReason, EvictionReport};
pub use frame::{FrameOutcome, FrameSession};
pub use gpu_buffers::{pack, PackedBuffers, UploadBytes};
pub use meta_grid::MetaGrid;
pub use request_loop::{RequestLoop, RequestLoopTick};

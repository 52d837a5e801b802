//! Per-frame orchestration: drains the request buffer, packs the GPU
//! buffers, then runs eviction sweeps — in that order (§4.7 steps 1-5, §5
//! ordering guarantee (c): "an evict-then-upload ordering within a frame is
//! forbidden — always pack/upload, then evict").

use crate::client::chunk_cache::ChunkCache;
use crate::client::eviction::{EvictionController, EvictionReport};
use crate::client::gpu_buffers::{self, PackedBuffers};
use crate::client::request_loop::{FetchFn, RequestLoop, RequestLoopTick};
use crate::coord::ChunkCoord;

/// One frame's outcome: the request-loop tick, the packed buffers (if the
/// tick mutated the cache), and any eviction sweeps that ran afterward.
pub struct FrameOutcome {
    pub tick: RequestLoopTick,
    pub packed: Option<PackedBuffers>,
    pub emergency: Option<EvictionReport>,
    pub proactive: Option<EvictionReport>,
}

/// Drives one frame of the client cache loop. Owns the request loop and
/// eviction controller so their single-flight/cooldown state persists
/// across calls (§5: "the request loop has a single-flight guard").
pub struct FrameSession {
    pub request_loop: RequestLoop,
    pub eviction: EvictionController,
}

impl FrameSession {
    pub fn new(request_loop: RequestLoop, eviction: EvictionController) -> Self {
        Self { request_loop, eviction }
    }

    /// Runs one frame: drain the request buffer and dispatch fetches (§4.7
    /// 1-3); if that mutated the cache, repack the GPU buffers (§4.7 4); only
    /// then do the emergency and proactive eviction sweeps run (§4.7 5, §5c).
    /// Packing before evicting means the shader's snapshot this frame still
    /// reflects every chunk the hash table now points at — any chunk the
    /// sweep removes disappears from the *next* frame's pack, not this one.
    pub async fn run_frame(
        &mut self,
        cache: &mut ChunkCache,
        request_buffer: &[u32],
        camera: ChunkCoord,
        now_millis: u64,
        fetch: FetchFn,
    ) -> FrameOutcome {
        let tick = self
            .request_loop
            .tick(cache, request_buffer, camera, now_millis, fetch)
            .await;

        let mutated = tick.touched > 0 || !tick.fetched.is_empty();
        let packed = mutated.then(|| gpu_buffers::pack(cache, camera));

        let emergency = self.eviction.check_emergency(cache, camera, now_millis);
        let proactive = if emergency.is_none() {
            self.eviction.maybe_proactive_trim(cache, camera, now_millis)
        } else {
            None
        };

        FrameOutcome { tick, packed, emergency, proactive }
    }
}

//! Drains the GPU's per-frame chunk request buffer and dispatches fetches (§4.7).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::client::chunk_cache::ChunkCache;
use crate::core::config::RequestLoopConfig;
use crate::core::error::Error;
use crate::coord::ChunkCoord;
use crate::svdag::ChunkPayload;

/// Fetches one chunk's decoded payload, e.g. by calling the chunk request
/// contract (§4.11) over HTTP, or directly in-process in tests.
pub type FetchFn =
    Arc<dyn Fn(ChunkCoord) -> Pin<Box<dyn Future<Output = Result<ChunkPayload, Error>> + Send>> + Send + Sync>;

/// What one `tick` accomplished.
#[derive(Debug, Clone, Default)]
pub struct RequestLoopTick {
    pub touched: usize,
    pub fetched: Vec<ChunkCoord>,
    pub failed_fetches: usize,
    /// `true` if the tick was a no-op because a previous tick is still in flight.
    pub skipped: bool,
}

/// Per-frame driver: decode the request buffer, touch already-cached
/// chunks, fetch the rest up to `max_fetches_per_frame`/`max_parallel`
/// (§4.7, §5). Re-entrance while a tick is running is a single-flight no-op.
pub struct RequestLoop {
    config: RequestLoopConfig,
    running: bool,
}

impl RequestLoop {
    pub fn new(config: RequestLoopConfig) -> Self {
        Self { config, running: false }
    }

    pub async fn tick(
        &mut self,
        cache: &mut ChunkCache,
        request_buffer: &[u32],
        camera: ChunkCoord,
        now_millis: u64,
        fetch: FetchFn,
    ) -> RequestLoopTick {
        if self.running {
            return RequestLoopTick { skipped: true, ..Default::default() };
        }
        self.running = true;
        let result = self.tick_inner(cache, request_buffer, camera, now_millis, fetch).await;
        self.running = false;
        result
    }

    async fn tick_inner(
        &mut self,
        cache: &mut ChunkCache,
        request_buffer: &[u32],
        camera: ChunkCoord,
        now_millis: u64,
        fetch: FetchFn,
    ) -> RequestLoopTick {
        let requests = decode_request_buffer(request_buffer, camera, self.config.request_radius);

        let mut touched = 0;
        let mut to_fetch = Vec::new();
        for (coord, request_count) in requests {
            if cache.touch(coord, now_millis) {
                touched += 1;
            } else {
                to_fetch.push((coord, request_count));
            }
        }

        to_fetch.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
        to_fetch.truncate(self.config.max_fetches_per_frame);

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_parallel.max(1)));
        let mut set = tokio::task::JoinSet::new();
        for (coord, _) in to_fetch {
            let sem = semaphore.clone();
            let fetch = fetch.clone();
            set.spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore is never closed");
                (coord, fetch(coord).await)
            });
        }

        let mut fetched = Vec::new();
        let mut failed_fetches = 0;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((coord, Ok(payload))) => {
                    cache.insert(coord, payload, now_millis);
                    fetched.push(coord);
                }
                Ok((coord, Err(err))) => {
                    log::warn!("chunk fetch failed for {coord:?}: {err}");
                    failed_fetches += 1;
                }
                Err(join_err) => {
                    log::warn!("chunk fetch task did not complete: {join_err}");
                    failed_fetches += 1;
                }
            }
        }

        RequestLoopTick { touched, fetched, failed_fetches, skipped: false }
    }
}

/// Decodes a `(2R+1)^3` request buffer (one u32 count per slot) into the
/// chunk coords with nonzero counts, centered on `camera`.
fn decode_request_buffer(buffer: &[u32], camera: ChunkCoord, radius: i32) -> Vec<(ChunkCoord, u32)> {
    let size = 2 * radius + 1;
    let mut out = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let idx = (((dx + radius) * size + (dy + radius)) * size + (dz + radius)) as usize;
                if let Some(&count) = buffer.get(idx)
                    && count > 0 {
                        out.push((ChunkCoord::new(camera.cx + dx, camera.cy + dy, camera.cz + dz), count));
                    }
            }
        }
    }
    out
}

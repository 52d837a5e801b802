//! Client-side cache of decoded chunks, keyed by [`ChunkCoord`] (§4.5).

use std::collections::HashMap;

use crate::client::dedup_pool::DedupPool;
use crate::coord::ChunkCoord;
use crate::svdag::ChunkPayload;

/// One cached chunk: when it was last referenced by the GPU request buffer,
/// when it was first loaded, and which dedup pool entry backs it.
#[derive(Clone, Copy, Debug)]
pub struct CacheEntry {
    pub coord: ChunkCoord,
    pub last_seen_millis: u64,
    pub loaded_millis: u64,
    pub pool_id: u64,
}

/// Maps live [`ChunkCoord`]s to a dedup-pool-backed payload. Owns the pool
/// outright so the refcount invariant (§8 #4) is enforced at one seam.
#[derive(Default)]
pub struct ChunkCache {
    entries: HashMap<ChunkCoord, CacheEntry>,
    pool: DedupPool,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), pool: DedupPool::new() }
    }

    /// Inserts or replaces a chunk's payload. Re-admitting a chunk that
    /// already has a live entry releases the old pool reference first, so a
    /// fetch that completes after the chunk was already reloaded elsewhere
    /// never double-counts (§4.7 cancellation semantics).
    pub fn insert(&mut self, coord: ChunkCoord, payload: ChunkPayload, now_millis: u64) {
        if let Some(existing) = self.entries.remove(&coord) {
            self.pool.release(existing.pool_id);
        }
        let pool_id = self.pool.bump_or_insert(payload);
        self.entries.insert(
            coord,
            CacheEntry { coord, last_seen_millis: now_millis, loaded_millis: now_millis, pool_id },
        );
    }

    /// Updates `last_seen` for a chunk still referenced by the GPU request
    /// buffer. Returns whether the chunk was present.
    pub fn touch(&mut self, coord: ChunkCoord, now_millis: u64) -> bool {
        match self.entries.get_mut(&coord) {
            Some(entry) => {
                entry.last_seen_millis = now_millis;
                true
            }
            None => false,
        }
    }

    pub fn evict(&mut self, coord: ChunkCoord) -> Option<CacheEntry> {
        let entry = self.entries.remove(&coord)?;
        self.pool.release(entry.pool_id);
        Some(entry)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&CacheEntry> {
        self.entries.get(&coord)
    }

    pub fn payload(&self, coord: ChunkCoord) -> Option<&ChunkPayload> {
        let entry = self.entries.get(&coord)?;
        self.pool.get(entry.pool_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn pool(&self) -> &DedupPool {
        &self.pool
    }

    /// Sum of dedup-pool refcounts over every distinct pool entry currently
    /// referenced by this cache — should always equal `self.len()` (§8 #4).
    pub fn refcount_invariant_holds(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let mut total = 0u32;
        for entry in self.entries.values() {
            if seen.insert(entry.pool_id) {
                total += self.pool.ref_count(entry.pool_id);
            }
        }
        total as usize == self.len()
    }
}

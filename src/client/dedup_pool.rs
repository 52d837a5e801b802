//! Reference-counted dedup pool: one stored payload per distinct content hash (§4.5).

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::svdag::ChunkPayload;

fn content_hash(payload: &ChunkPayload) -> u64 {
    let mut hasher = DefaultHasher::new();
    payload.nodes.hash(&mut hasher);
    payload.leaves.hash(&mut hasher);
    hasher.finish()
}

struct PoolEntry {
    payload: ChunkPayload,
    ref_count: u32,
}

/// Content-addressed store of decoded chunk payloads, shared by reference
/// count across however many [`crate::coord::ChunkCoord`] cache entries
/// point at the same bytes (§4.5, invariant #4 in §8).
#[derive(Default)]
pub struct DedupPool {
    entries: HashMap<u64, PoolEntry>,
}

impl DedupPool {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Inserts a payload, returning its pool id (the content hash) and
    /// whether this was a fresh insert (`true`) or a ref-count bump on an
    /// existing entry (`false`).
    pub fn insert(&mut self, payload: ChunkPayload) -> (u64, bool) {
        let id = content_hash(&payload);
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.ref_count += 1;
                (id, false)
            }
            None => {
                self.entries.insert(id, PoolEntry { payload, ref_count: 1 });
                (id, true)
            }
        }
    }

    /// Marks a chunk payload as loaded without taking a brand-new reference
    /// when the fetch raced an eviction and a live reference already exists
    /// (§4.7 "cancellation": re-admitting must not double-count).
    pub fn bump_or_insert(&mut self, payload: ChunkPayload) -> u64 {
        self.insert(payload).0
    }

    /// Drops one reference; frees the payload once the count reaches zero.
    pub fn release(&mut self, id: u64) {
        let Some(entry) = self.entries.get_mut(&id) else { return };
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if entry.ref_count == 0 {
            self.entries.remove(&id);
        }
    }

    pub fn get(&self, id: u64) -> Option<&ChunkPayload> {
        self.entries.get(&id).map(|e| &e.payload)
    }

    pub fn ref_count(&self, id: u64) -> u32 {
        self.entries.get(&id).map(|e| e.ref_count).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(root: u32) -> ChunkPayload {
        ChunkPayload { root_idx: root, nodes: vec![1, root], leaves: vec![root] }
    }

    #[test]
    fn identical_payloads_share_one_entry() {
        let mut pool = DedupPool::new();
        let (a, fresh_a) = pool.insert(payload(5));
        let (b, fresh_b) = pool.insert(payload(5));
        assert_eq!(a, b);
        assert!(fresh_a);
        assert!(!fresh_b);
        assert_eq!(pool.ref_count(a), 2);
    }

    #[test]
    fn distinct_payloads_get_distinct_entries() {
        let mut pool = DedupPool::new();
        let (a, _) = pool.insert(payload(1));
        let (b, _) = pool.insert(payload(2));
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn release_to_zero_frees_entry() {
        let mut pool = DedupPool::new();
        let (id, _) = pool.insert(payload(9));
        pool.release(id);
        assert!(pool.get(id).is_none());
        assert!(pool.is_empty());
    }
}

//! Packs the chunk cache into upload-ready host-side GPU buffers (§4.7).

use std::collections::HashMap;

use crate::client::chunk_cache::ChunkCache;
use crate::client::meta_grid::MetaGrid;
use crate::coord::ChunkCoord;
use crate::svdag::voxels::CHUNK_SIZE;
use crate::svdag::node::TAG_LEAF;

/// Linear-probe bound for hash table lookups (§4.7, §8 invariant #7).
pub const MAX_PROBES: usize = 64;

const HASH_EMPTY: u32 = u32::MAX;
const PRIME_X: i64 = 0x9E3779B1u32 as i64;
const PRIME_Y: i64 = 0x85EBCA6Bu32 as i64;
const PRIME_Z: i64 = 0xC2B2AE35u32 as i64;

/// One chunk's GPU-visible metadata record: world offset, size, and where
/// its nodes live in the shared arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub world_offset: (i32, i32, i32),
    pub chunk_size: u32,
    pub root_idx: u32,
    pub node_count: u32,
    pub node_base_offset: u32,
}

impl ChunkMetadata {
    const WORDS: usize = 7;

    fn write_into(&self, out: &mut Vec<u32>) {
        out.push(self.world_offset.0 as u32);
        out.push(self.world_offset.1 as u32);
        out.push(self.world_offset.2 as u32);
        out.push(self.chunk_size);
        out.push(self.root_idx);
        out.push(self.node_count);
        out.push(self.node_base_offset);
    }
}

/// The full set of buffers one frame uploads: concatenated metadata, nodes,
/// leaves, an open-addressing `ChunkCoord -> metadata index` hash table, and
/// the meta-grid skip bitmap.
pub struct PackedBuffers {
    pub metadata: Vec<u32>,
    pub nodes: Vec<u32>,
    pub leaves: Vec<u32>,
    pub hash_table: Vec<u32>,
    pub hash_capacity: usize,
    pub meta_grid: Vec<u32>,
    pub chunk_count: usize,
}

impl PackedBuffers {
    /// Casts each `u32` buffer to its little-endian byte representation,
    /// ready for an upload call that takes raw bytes.
    pub fn as_upload_bytes(&self) -> UploadBytes<'_> {
        UploadBytes {
            metadata: bytemuck::cast_slice(&self.metadata),
            nodes: bytemuck::cast_slice(&self.nodes),
            leaves: bytemuck::cast_slice(&self.leaves),
            hash_table: bytemuck::cast_slice(&self.hash_table),
            meta_grid: bytemuck::cast_slice(&self.meta_grid),
        }
    }

    /// Looks up a chunk's metadata index the same way the shader would.
    pub fn lookup(&self, coord: ChunkCoord) -> Option<u32> {
        let mut slot = spatial_hash(coord, self.hash_capacity);
        for _ in 0..MAX_PROBES {
            let value = self.hash_table[slot];
            if value == HASH_EMPTY {
                return None;
            }
            let meta_idx = value as usize;
            let base = meta_idx * ChunkMetadata::WORDS;
            let offset = (
                self.metadata[base] as i32,
                self.metadata[base + 1] as i32,
                self.metadata[base + 2] as i32,
            );
            let (wx, wy, wz) = coord.world_origin();
            if offset == (wx, wy, wz) {
                return Some(value);
            }
            slot = (slot + 1) % self.hash_capacity;
        }
        None
    }
}

/// Byte-slice view of a [`PackedBuffers`], borrowed for the duration of one upload.
pub struct UploadBytes<'a> {
    pub metadata: &'a [u8],
    pub nodes: &'a [u8],
    pub leaves: &'a [u8],
    pub hash_table: &'a [u8],
    pub meta_grid: &'a [u8],
}

fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

fn spatial_hash(coord: ChunkCoord, capacity: usize) -> usize {
    let h = (coord.cx as i64).wrapping_mul(PRIME_X)
        ^ (coord.cy as i64).wrapping_mul(PRIME_Y)
        ^ (coord.cz as i64).wrapping_mul(PRIME_Z);
    (h.rem_euclid(capacity as i64)) as usize
}

/// Rewrites a chunk's `nodes` array for the shared arena: leaf records get
/// their leaf index shifted by `leaf_base_offset`; inner records are copied
/// verbatim, since their child pointers stay chunk-relative (§4.7).
fn rewrite_nodes(nodes: &[u32], leaf_base_offset: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut i = 0;
    while i < nodes.len() {
        let tag = nodes[i];
        if tag == TAG_LEAF {
            out.push(tag);
            out.push(nodes[i + 1] + leaf_base_offset);
            i += 2;
        } else {
            let mask = nodes[i + 1];
            let count = (mask as u8).count_ones() as usize;
            out.extend_from_slice(&nodes[i..i + 2 + count]);
            i += 2 + count;
        }
    }
    out
}

/// Packs every cached chunk into one frame's upload-ready buffer set.
pub fn pack(cache: &ChunkCache, camera: ChunkCoord) -> PackedBuffers {
    let mut metadata = Vec::new();
    let mut nodes = Vec::new();
    let mut leaves = Vec::new();
    let mut coord_to_index: HashMap<ChunkCoord, u32> = HashMap::new();

    let mut entries: Vec<&crate::client::chunk_cache::CacheEntry> = cache.iter().collect();
    entries.sort_unstable_by_key(|e| (e.coord.cx, e.coord.cy, e.coord.cz));

    for (index, entry) in entries.into_iter().enumerate() {
        let payload = cache.payload(entry.coord).expect("cache entry always has a backing payload");

        let node_base_offset = nodes.len() as u32;
        let leaf_base_offset = leaves.len() as u32;

        nodes.extend(rewrite_nodes(&payload.nodes, leaf_base_offset));
        leaves.extend_from_slice(&payload.leaves);

        ChunkMetadata {
            world_offset: entry.coord.world_origin(),
            chunk_size: CHUNK_SIZE,
            root_idx: payload.root_idx,
            node_count: payload.nodes.len() as u32,
            node_base_offset,
        }
        .write_into(&mut metadata);

        coord_to_index.insert(entry.coord, index as u32);
    }

    let chunk_count = coord_to_index.len();
    let hash_capacity = next_power_of_two(4 * chunk_count.max(1));
    let mut hash_table = vec![HASH_EMPTY; hash_capacity];
    for (coord, index) in &coord_to_index {
        let mut slot = spatial_hash(*coord, hash_capacity);
        for _ in 0..MAX_PROBES {
            if hash_table[slot] == HASH_EMPTY {
                hash_table[slot] = *index;
                break;
            }
            slot = (slot + 1) % hash_capacity;
        }
    }

    let meta_grid = MetaGrid::rebuild(cache, camera).as_slice().to_vec();

    PackedBuffers { metadata, nodes, leaves, hash_table, hash_capacity, meta_grid, chunk_count }
}

//! Builds a deduplicated SVDAG from a dense 32³ voxel grid (§4.4).
//!
//! The tree is assembled bottom-up: each level groups 2x2x2 children. A group
//! that's all air collapses to nothing; a group of 8 identical leaves
//! collapses to a single leaf that bubbles further up without being
//! materialized until something actually needs to point at it. Identical
//! node records (same tag + mask + children, or same tag + leaf index) are
//! deduplicated via a hashmap keyed on the record's own words, mirroring the
//! brick/node hashmap-dedup approach used for octree compression.

use std::collections::HashMap;

use super::node::{ChunkPayload, TAG_INNER, TAG_LEAF};
use super::voxels::{MaterialId, VoxelGrid, CHUNK_SIZE};

/// What a subtree collapsed to, before it's necessarily materialized as a node record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeRef {
    Empty,
    /// All voxels in this subtree share this material; not yet emitted as a record.
    Leaf(MaterialId),
    /// Already emitted; this is its offset in `nodes`.
    Node(u32),
}

/// Builds one chunk's SVDAG. A fresh builder is created per chunk; dedup
/// tables are scoped to that single chunk (§3: "deduplicated within a chunk").
pub struct SvdagBuilder {
    nodes: Vec<u32>,
    node_dedup: HashMap<Vec<u32>, u32>,
    leaves: Vec<u32>,
    leaf_dedup: HashMap<MaterialId, u32>,
}

impl SvdagBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_dedup: HashMap::new(),
            leaves: Vec::new(),
            leaf_dedup: HashMap::new(),
        }
    }

    /// Compress `grid` into a chunk payload.
    pub fn build(mut self, grid: &VoxelGrid) -> ChunkPayload {
        let root = self.build_subtree(grid, CHUNK_SIZE, 0, 0, 0);

        match root {
            NodeRef::Empty => ChunkPayload::empty(),
            NodeRef::Leaf(material) => {
                let root_idx = self.emit_leaf(material);
                ChunkPayload {
                    root_idx,
                    nodes: self.nodes,
                    leaves: self.leaves,
                }
            }
            NodeRef::Node(offset) => ChunkPayload {
                root_idx: offset,
                nodes: self.nodes,
                leaves: self.leaves,
            },
        }
    }

    /// Recursively builds the subtree covering the `size^3` cube at `(x, y, z)`.
    fn build_subtree(&mut self, grid: &VoxelGrid, size: u32, x: u32, y: u32, z: u32) -> NodeRef {
        if size == 1 {
            let material = grid.get(x, y, z);
            return if material == 0 {
                NodeRef::Empty
            } else {
                NodeRef::Leaf(material)
            };
        }

        let half = size / 2;
        let mut children = [NodeRef::Empty; 8];
        for (i, child) in children.iter_mut().enumerate() {
            let ox = x + ((i as u32) & 1) * half;
            let oz = z + (((i as u32) >> 1) & 1) * half;
            let oy = y + (((i as u32) >> 2) & 1) * half;
            *child = self.build_subtree(grid, half, ox, oy, oz);
        }

        if children.iter().all(|c| *c == NodeRef::Empty) {
            return NodeRef::Empty;
        }

        if let NodeRef::Leaf(first) = children[0]
            && children
                .iter()
                .all(|c| matches!(c, NodeRef::Leaf(m) if *m == first))
            {
                return NodeRef::Leaf(first);
            }

        let mut mask: u8 = 0;
        let mut child_offsets = Vec::with_capacity(8);
        for (i, child) in children.iter().enumerate() {
            match child {
                NodeRef::Empty => {}
                NodeRef::Leaf(material) => {
                    mask |= 1 << i;
                    child_offsets.push(self.emit_leaf(*material));
                }
                NodeRef::Node(offset) => {
                    mask |= 1 << i;
                    child_offsets.push(*offset);
                }
            }
        }

        debug_assert!(mask.count_ones() >= 1 && mask.count_ones() <= 8);
        NodeRef::Node(self.emit_inner(mask, &child_offsets))
    }

    fn emit_leaf(&mut self, material: MaterialId) -> u32 {
        let leaf_idx = *self.leaf_dedup.entry(material).or_insert_with(|| {
            let idx = self.leaves.len() as u32;
            self.leaves.push(material as u32);
            idx
        });

        let record = vec![TAG_LEAF, leaf_idx];
        self.emit_record(record)
    }

    fn emit_inner(&mut self, mask: u8, children: &[u32]) -> u32 {
        let mut record = Vec::with_capacity(2 + children.len());
        record.push(TAG_INNER);
        record.push(mask as u32);
        record.extend_from_slice(children);
        self.emit_record(record)
    }

    fn emit_record(&mut self, record: Vec<u32>) -> u32 {
        if let Some(&offset) = self.node_dedup.get(&record) {
            return offset;
        }
        let offset = self.nodes.len() as u32;
        self.nodes.extend_from_slice(&record);
        self.node_dedup.insert(record, offset);
        offset
    }
}

impl Default for SvdagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

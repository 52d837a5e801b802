//! Bit-exact little-endian wire layout for an SVDAG chunk (§4.9).
//!
//! ```text
//! offset  size  field
//! 0       4     magic  = 0x53564441  ('SVDA')
//! 4       4     version
//! 8       4     chunkSize (expected 32)
//! 12      4     materialNodeCount
//! 16      4     materialLeafCount
//! 20      4     materialRootIdx
//! 24      4     flags
//! 28      4     checksum (reserved; may be 0)
//! 32      4     opaqueRootIdx        (legacy; mirrors material for current builds)
//! 36      4     opaqueNodeCount
//! 40      4*N   material nodes (N = materialNodeCount)
//!         4*L   material leaves (L = materialLeafCount)
//!         4*M   opaque nodes   (M = opaqueNodeCount)
//!         4*?   opaque leaves  (rest of payload, /4)
//! ```
//!
//! Decode preserves the opaque section verbatim rather than assuming any
//! semantics for it (see the open question in DESIGN.md): round-tripping a
//! payload with a non-empty opaque section (as a forward-compatible producer
//! might emit) must still work even though this builder never populates one.

use crate::core::error::Error;
use crate::svdag::node::ChunkPayload;
use crate::svdag::voxels::CHUNK_SIZE;

pub const MAGIC: u32 = 0x5356_4441;
pub const VERSION: u32 = 1;
const HEADER_WORDS: usize = 10;

/// Encode a chunk payload produced by [`crate::svdag::SvdagBuilder`].
///
/// The opaque DAG mirrors the material root index and is otherwise empty,
/// per the open question decided in DESIGN.md.
pub fn encode(payload: &ChunkPayload) -> Vec<u8> {
    let mut words: Vec<u32> = Vec::with_capacity(HEADER_WORDS + payload.nodes.len() + payload.leaves.len());
    words.push(MAGIC);
    words.push(VERSION);
    words.push(CHUNK_SIZE);
    words.push(payload.nodes.len() as u32);
    words.push(payload.leaves.len() as u32);
    words.push(payload.root_idx);
    words.push(0); // flags
    words.push(0); // checksum (reserved)
    words.push(payload.root_idx); // opaqueRootIdx mirrors material
    words.push(0); // opaqueNodeCount

    words.extend_from_slice(&payload.nodes);
    words.extend_from_slice(&payload.leaves);

    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

/// Decode a wire payload back into a chunk's material SVDAG.
///
/// The opaque nodes/leaves sections are parsed (to validate the length) and
/// discarded, since no current builder populates them and their semantics
/// are an open question (DESIGN.md).
pub fn decode(bytes: &[u8]) -> Result<ChunkPayload, Error> {
    if bytes.len() < HEADER_WORDS * 4 || !bytes.len().is_multiple_of(4) {
        return Err(Error::InvalidChunk(format!(
            "payload too short or misaligned: {} bytes",
            bytes.len()
        )));
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let magic = words[0];
    if magic != MAGIC {
        return Err(Error::InvalidChunk(format!("bad magic: {magic:#x}")));
    }
    let version = words[1];
    if version != VERSION {
        return Err(Error::InvalidChunk(format!("unsupported version: {version}")));
    }

    let material_node_count = words[3] as usize;
    let material_leaf_count = words[4] as usize;
    let material_root_idx = words[5];
    let opaque_node_count = words[9] as usize;

    let mut cursor = HEADER_WORDS;
    let nodes_end = cursor + material_node_count;
    let nodes = words
        .get(cursor..nodes_end)
        .ok_or_else(|| Error::InvalidChunk("truncated material nodes".into()))?
        .to_vec();
    cursor = nodes_end;

    let leaves_end = cursor + material_leaf_count;
    let leaves = words
        .get(cursor..leaves_end)
        .ok_or_else(|| Error::InvalidChunk("truncated material leaves".into()))?
        .to_vec();
    cursor = leaves_end;

    // Skip the opaque section; its semantics are an open question, not ours to interpret.
    let opaque_nodes_end = cursor + opaque_node_count;
    if opaque_nodes_end > words.len() {
        return Err(Error::InvalidChunk("truncated opaque nodes".into()));
    }

    Ok(ChunkPayload {
        root_idx: material_root_idx,
        nodes,
        leaves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svdag::node::EMPTY_ROOT;
    use crate::svdag::{SvdagBuilder, VoxelGrid};

    #[test]
    fn bad_magic_is_rejected() {
        let bytes = vec![0u8; 40];
        assert!(matches!(decode(&bytes), Err(Error::InvalidChunk(_))));
    }

    #[test]
    fn s1_empty_chunk_round_trips_with_header_only_counts() {
        let payload = SvdagBuilder::new().build(&VoxelGrid::empty());
        assert_eq!(payload.root_idx, EMPTY_ROOT);

        let bytes = encode(&payload);
        assert_eq!(bytes.len(), 40);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn s2_solid_chunk_round_trips() {
        let payload = SvdagBuilder::new().build(&VoxelGrid::filled(7));
        let bytes = encode(&payload);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn round_trips_arbitrary_builder_output() {
        let mut grid = VoxelGrid::empty();
        for i in 0..32u32 {
            for j in 0..32u32 {
                grid.set(i, j, (i ^ j) % 32, ((i + j) % 11) as u16);
            }
        }
        let payload = SvdagBuilder::new().build(&grid);
        let bytes = encode(&payload);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }
}

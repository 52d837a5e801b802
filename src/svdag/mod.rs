//! Sparse voxel DAG: a 32-voxel cube compressed into a pointer-compact,
//! deduplicated pointer graph (§4.4 of the design).

pub mod builder;
pub mod node;
pub mod voxels;

pub use builder::SvdagBuilder;
pub use node::{ChunkPayload, EMPTY_ROOT};
pub use voxels::{MaterialId, VoxelGrid, CHUNK_SIZE};

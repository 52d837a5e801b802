//! vdagstream - SVDAG chunk codec, procedural pipeline cache, and
//! GPU-request-driven chunk cache for streaming an infinite voxel world.

pub mod chunkgen;
pub mod client;
pub mod coord;
pub mod core;
pub mod graph;
pub mod region;
pub mod svdag;
pub mod wire;
pub mod world;

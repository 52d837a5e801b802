//! Samples a region's 2D pipeline outputs into a 32³ voxel array for one chunk (§4.3).

use rayon::prelude::*;

use crate::coord::ChunkCoord;
use crate::region::cache::RegionOutputs;
use crate::svdag::{MaterialId, VoxelGrid, CHUNK_SIZE};

pub const MATERIAL_AIR: MaterialId = 0;
pub const MATERIAL_STONE: MaterialId = 1;
pub const MATERIAL_DIRT: MaterialId = 2;
pub const MATERIAL_GRASS: MaterialId = 3;
pub const MATERIAL_SAND: MaterialId = 4;
pub const MATERIAL_SNOW: MaterialId = 5;

/// How many voxels below the surface use the biome's sub-surface material
/// before falling back to stone.
const SUBSURFACE_DEPTH: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BiomeMaterials {
    top: MaterialId,
    sub_surface: MaterialId,
}

/// Matches [`crate::graph::nodes::biome::BiomeClassify`]'s id scheme:
/// 0 = desert, 1 = plains, 2 = forest, 3 = tundra.
fn biome_materials(biome_id: f32) -> BiomeMaterials {
    match biome_id.round() as i32 {
        0 => BiomeMaterials { top: MATERIAL_SAND, sub_surface: MATERIAL_SAND },
        2 => BiomeMaterials { top: MATERIAL_GRASS, sub_surface: MATERIAL_DIRT },
        3 => BiomeMaterials { top: MATERIAL_SNOW, sub_surface: MATERIAL_DIRT },
        _ => BiomeMaterials { top: MATERIAL_GRASS, sub_surface: MATERIAL_DIRT }, // plains, and any out-of-range id
    }
}

/// Samples chunk-local voxels from a region's cached 2D outputs. The
/// heightmap's value is treated as the absolute world-space surface height
/// in voxels — pipeline authors scale raw noise into that range with
/// `Remap` before feeding a `HeightmapOutput` node.
pub struct ChunkGenerator;

impl ChunkGenerator {
    pub fn generate(chunk: ChunkCoord, region_origin: (i32, i32), region: &RegionOutputs) -> VoxelGrid {
        let (world_x0, world_y0, world_z0) = chunk.world_origin();
        let size = region.size as i32;
        let mut grid = VoxelGrid::empty();

        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let world_x = world_x0 + lx as i32;
                let world_z = world_z0 + lz as i32;

                let region_x = (world_x - region_origin.0).clamp(0, size - 1);
                let region_z = (world_z - region_origin.1).clamp(0, size - 1);
                let sample_idx = (region_z * size + region_x) as usize;

                let surface_y = region.heightmap[sample_idx].round() as i32;
                let biome = biome_materials(region.biome_ids[sample_idx]);

                for ly in 0..CHUNK_SIZE {
                    let world_y = world_y0 + ly as i32;
                    let material = if world_y > surface_y {
                        MATERIAL_AIR
                    } else if world_y == surface_y {
                        biome.top
                    } else if world_y > surface_y - SUBSURFACE_DEPTH {
                        biome.sub_surface
                    } else {
                        MATERIAL_STONE
                    };
                    grid.set(lx, ly, lz, material);
                }
            }
        }

        grid
    }

    /// Samples every chunk in `coords` against the same region, in parallel.
    /// Generation is pure per chunk, so a region with many in-flight requests
    /// (e.g. the request loop draining a burst of misses) fans out across
    /// cores the way world generation does for whole worlds.
    pub fn generate_batch(coords: &[ChunkCoord], region_origin: (i32, i32), region: &RegionOutputs) -> Vec<VoxelGrid> {
        coords.par_iter().map(|&coord| Self::generate(coord, region_origin, region)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_region(height: f32, biome: f32) -> RegionOutputs {
        let size = 512u32;
        let count = (size * size) as usize;
        RegionOutputs {
            heightmap: vec![height; count],
            moisture: vec![0.0; count],
            temperature: vec![0.0; count],
            biome_ids: vec![biome; count],
            size,
        }
    }

    #[test]
    fn flat_plains_surface_at_zero_is_grass_over_dirt_over_stone() {
        let region = flat_region(0.0, 1.0);

        let surface_chunk = ChunkGenerator::generate(ChunkCoord::new(0, 0, 0), (0, 0), &region);
        assert_eq!(surface_chunk.get(0, 0, 0), MATERIAL_GRASS);
        assert_eq!(surface_chunk.get(0, 31, 0), MATERIAL_AIR);

        // world y = -1 .. -32: just below the surface, then stone further down.
        let below_chunk = ChunkGenerator::generate(ChunkCoord::new(0, -1, 0), (0, 0), &region);
        assert_eq!(below_chunk.get(0, 31, 0), MATERIAL_DIRT); // world y = -1, depth 1
        assert_eq!(below_chunk.get(0, 29, 0), MATERIAL_DIRT); // world y = -3, depth 3
        assert_eq!(below_chunk.get(0, 28, 0), MATERIAL_STONE); // world y = -4, depth 4
    }

    #[test]
    fn surface_above_chunk_is_all_stone_or_dirt_below() {
        let region = flat_region(1000.0, 1.0);
        let chunk = ChunkCoord::new(0, 0, 0);
        let grid = ChunkGenerator::generate(chunk, (0, 0), &region);
        for ly in 0..CHUNK_SIZE {
            assert_eq!(grid.get(0, ly, 0), MATERIAL_STONE);
        }
    }

    #[test]
    fn batch_matches_sequential_generation() {
        let region = flat_region(0.0, 1.0);
        let coords = [ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 0), ChunkCoord::new(0, 0, 1)];

        let batched = ChunkGenerator::generate_batch(&coords, (0, 0), &region);
        for (coord, grid) in coords.iter().zip(batched.iter()) {
            assert_eq!(*grid, ChunkGenerator::generate(*coord, (0, 0), &region));
        }
    }

    #[test]
    fn desert_biome_uses_sand() {
        let region = flat_region(0.0, 0.0);
        let grid = ChunkGenerator::generate(ChunkCoord::new(0, 0, 0), (0, 0), &region);
        assert_eq!(grid.get(0, 0, 0), MATERIAL_SAND);
    }
}

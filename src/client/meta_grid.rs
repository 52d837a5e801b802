//! Coarse 4×4×4-chunk skip bitmap, camera-centered (§4.8).

use crate::client::chunk_cache::ChunkCache;
use crate::coord::ChunkCoord;
use crate::svdag::EMPTY_ROOT;

/// Chunks per meta-cell edge.
const CHUNKS_PER_CELL: i32 = 4;
/// Cells per grid edge.
pub const GRID_CELLS: i32 = 16;

/// `16x16x16` grid of `0`/`1` cells, recomputed from the chunk cache on
/// every upload (§4.8). Indexed `[x + y*16 + z*16*16]`.
pub struct MetaGrid {
    cells: Vec<u32>,
}

impl MetaGrid {
    pub fn empty() -> Self {
        Self { cells: vec![0; (GRID_CELLS * GRID_CELLS * GRID_CELLS) as usize] }
    }

    /// Rebuilds the grid from scratch: every cache entry with a non-empty
    /// payload marks its meta-cell `1`, centered on `camera`.
    pub fn rebuild(cache: &ChunkCache, camera: ChunkCoord) -> Self {
        let mut grid = Self::empty();
        let center = GRID_CELLS / 2;
        let camera_cell = (
            camera.cx.div_euclid(CHUNKS_PER_CELL),
            camera.cy.div_euclid(CHUNKS_PER_CELL),
            camera.cz.div_euclid(CHUNKS_PER_CELL),
        );

        for entry in cache.iter() {
            let Some(payload) = cache.payload(entry.coord) else { continue };
            if payload.root_idx == EMPTY_ROOT || payload.nodes.len() <= 1 {
                continue;
            }

            let cell = (
                entry.coord.cx.div_euclid(CHUNKS_PER_CELL) - camera_cell.0 + center,
                entry.coord.cy.div_euclid(CHUNKS_PER_CELL) - camera_cell.1 + center,
                entry.coord.cz.div_euclid(CHUNKS_PER_CELL) - camera_cell.2 + center,
            );

            if let Some(idx) = grid.index(cell.0, cell.1, cell.2) {
                grid.cells[idx] = 1;
            }
        }

        grid
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !(0..GRID_CELLS).contains(&x) || !(0..GRID_CELLS).contains(&y) || !(0..GRID_CELLS).contains(&z) {
            return None;
        }
        Some((x + y * GRID_CELLS + z * GRID_CELLS * GRID_CELLS) as usize)
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> u32 {
        self.index(x, y, z).map(|i| self.cells[i]).unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(root: u32) -> crate::svdag::ChunkPayload {
        crate::svdag::ChunkPayload { root_idx: root, nodes: vec![1, root], leaves: vec![root] }
    }

    #[test]
    fn empty_cache_yields_all_zero_grid() {
        let cache = ChunkCache::new();
        let grid = MetaGrid::rebuild(&cache, ChunkCoord::new(0, 0, 0));
        assert!(grid.as_slice().iter().all(|&c| c == 0));
    }

    #[test]
    fn non_empty_chunk_marks_its_cell() {
        let mut cache = ChunkCache::new();
        cache.insert(ChunkCoord::new(0, 0, 0), payload(1), 0);
        let grid = MetaGrid::rebuild(&cache, ChunkCoord::new(0, 0, 0));
        assert_eq!(grid.get(GRID_CELLS / 2, GRID_CELLS / 2, GRID_CELLS / 2), 1);
    }

    #[test]
    fn empty_payload_does_not_mark_a_cell() {
        let mut cache = ChunkCache::new();
        cache.insert(ChunkCoord::new(0, 0, 0), crate::svdag::ChunkPayload::empty(), 0);
        let grid = MetaGrid::rebuild(&cache, ChunkCoord::new(0, 0, 0));
        assert!(grid.as_slice().iter().all(|&c| c == 0));
    }
}

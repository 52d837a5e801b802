//! Pure chunk-request function an embedding HTTP layer calls (§4.11, §6).

use std::time::Duration;

use crate::coord::ChunkCoord;
use crate::chunkgen::ChunkGenerator;
use crate::core::error::Error;
use crate::graph::GraphExecutor;
use crate::region::RegionCache;
use crate::svdag::SvdagBuilder;
use crate::wire;
use crate::world::pipeline::World;

/// Response metadata the embedding HTTP layer would surface as
/// `X-Generation-Time` / `X-Material-Nodes` / `X-Material-Leaves` headers (§6).
#[derive(Debug, Clone)]
pub struct ChunkResponse {
    pub bytes: Vec<u8>,
    pub generation_time: Duration,
    pub material_nodes: usize,
    pub material_leaves: usize,
}

/// `World + ChunkCoord -> wire bytes`, going through the region cache, chunk
/// generator, and SVDAG builder. No socket, no HTTP status code — those are
/// the embedder's concern (§1, §4.11).
pub fn request_chunk(
    world: &World,
    coord: ChunkCoord,
    region_cache: &mut RegionCache,
    executor: &mut GraphExecutor,
) -> Result<ChunkResponse, Error> {
    let started = std::time::Instant::now();

    let (region_x, region_z) = coord.region();
    let region_origin = (
        region_x * crate::coord::REGION_CHUNKS * crate::svdag::CHUNK_SIZE as i32,
        region_z * crate::coord::REGION_CHUNKS * crate::svdag::CHUNK_SIZE as i32,
    );

    let outputs = region_cache.get(executor, region_x, region_z, &world.graph, world.config.seed)?;
    let grid = ChunkGenerator::generate(coord, region_origin, &outputs);
    let payload = SvdagBuilder::new().build(&grid);
    let bytes = wire::encode(&payload);

    Ok(ChunkResponse {
        material_nodes: payload.nodes.len(),
        material_leaves: payload.leaves.len(),
        generation_time: started.elapsed(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RegionCacheConfig;
    use crate::graph::{GraphDef, NodeDef};
    use crate::world::config::WorldConfig;
    use std::collections::HashMap;

    fn flat_world() -> World {
        let mut params = HashMap::new();
        params.insert("value".to_string(), 5.0);
        let graph = GraphDef {
            nodes: vec![
                NodeDef { id: "h".to_string(), node_type: "ConstantOutput".to_string(), params: params.clone(), is_output: false },
                NodeDef { id: "b".to_string(), node_type: "ConstantOutput".to_string(), params, is_output: false },
            ],
            connections: vec![],
            outputs: Some(HashMap::from([
                ("heightmap".to_string(), "h".to_string()),
                ("biomes".to_string(), "b".to_string()),
            ])),
        };
        World { graph, config: WorldConfig { seed: 1, name: "test".to_string() } }
    }

    #[test]
    fn produces_decodable_wire_bytes() {
        let world = flat_world();
        let mut region_cache = RegionCache::new(RegionCacheConfig::default());
        let mut executor = GraphExecutor::with_builtins();

        let response = request_chunk(&world, ChunkCoord::new(0, 0, 0), &mut region_cache, &mut executor).unwrap();
        let decoded = wire::decode(&response.bytes).unwrap();
        assert_eq!(decoded.nodes.len(), response.material_nodes);
        assert_eq!(decoded.leaves.len(), response.material_leaves);
    }
}

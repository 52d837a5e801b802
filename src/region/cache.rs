//! LRU cache of pipeline outputs per region (§4.2, §9: "global mutable state: none").

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::core::config::RegionCacheConfig;
use crate::core::error::Error;
use crate::graph::{ExecContext, GraphDef, GraphExecutor, NodeValue};

/// Side length in world units of one region's sampling grid (16 chunks * 32 voxels).
pub const REGION_SIZE: u32 = 512;

/// The four named outputs a world pipeline is expected to resolve (§3, §6).
#[derive(Debug, Clone)]
pub struct RegionOutputs {
    pub heightmap: Vec<f32>,
    pub moisture: Vec<f32>,
    pub temperature: Vec<f32>,
    pub biome_ids: Vec<f32>,
    pub size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct RegionKey {
    region_x: i32,
    region_z: i32,
    graph_hash: u64,
    seed: u32,
}

/// Memoizes one [`RegionOutputs`] per `(regionX, regionZ, graphHash, seed)` key,
/// evicting least-recently-used entries beyond `capacity`.
pub struct RegionCache {
    config: RegionCacheConfig,
    entries: HashMap<RegionKey, Arc<RegionOutputs>>,
    lru: VecDeque<RegionKey>,
    pub hits: usize,
    pub misses: usize,
}

impl RegionCache {
    pub fn new(config: RegionCacheConfig) -> Self {
        Self { config, entries: HashMap::new(), lru: VecDeque::new(), hits: 0, misses: 0 }
    }

    /// Returns the region's outputs, running the graph executor on a miss.
    pub fn get(
        &mut self,
        executor: &mut GraphExecutor,
        region_x: i32,
        region_z: i32,
        graph: &GraphDef,
        seed: u32,
    ) -> Result<Arc<RegionOutputs>, Error> {
        let key = RegionKey { region_x, region_z, graph_hash: graph.graph_hash(), seed };

        if let Some(outputs) = self.entries.get(&key).cloned() {
            self.hits += 1;
            self.touch(key);
            return Ok(outputs);
        }

        self.misses += 1;
        let ctx = ExecContext {
            width: REGION_SIZE,
            height: REGION_SIZE,
            origin_x: (region_x * REGION_SIZE as i32) as f64,
            origin_z: (region_z * REGION_SIZE as i32) as f64,
            cell_size: 1.0,
            seed,
        };
        let result = executor.execute(graph, &ctx)?;
        let outputs = Arc::new(extract_outputs(graph, &result.outputs, REGION_SIZE));

        self.entries.insert(key, outputs.clone());
        self.lru.push_back(key);
        self.evict_over_capacity();

        Ok(outputs)
    }

    /// Drops every cached region belonging to `(regionX, regionZ)`, across all graphs/seeds.
    pub fn invalidate_region(&mut self, region_x: i32, region_z: i32) {
        self.entries.retain(|k, _| !(k.region_x == region_x && k.region_z == region_z));
        self.lru.retain(|k| !(k.region_x == region_x && k.region_z == region_z));
    }

    /// Drops every cached region.
    pub fn invalidate_world(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, key: RegionKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.config.capacity {
            if let Some(oldest) = self.lru.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

/// Resolves the four well-known pipeline outputs from an executed graph's
/// result map: prefers an explicit `outputs` mapping entry of that name,
/// falls back to a dedicated `*Output` node of the matching kind.
fn extract_outputs(graph: &GraphDef, outputs: &HashMap<String, NodeValue>, size: u32) -> RegionOutputs {
    RegionOutputs {
        heightmap: resolve_named(graph, outputs, "heightmap", "HeightmapOutput", size),
        moisture: resolve_named(graph, outputs, "moisture", "MoistureOutput", size),
        temperature: resolve_named(graph, outputs, "temperature", "TemperatureOutput", size),
        biome_ids: resolve_named(graph, outputs, "biomes", "BiomeOutput", size),
        size,
    }
}

fn resolve_named(
    graph: &GraphDef,
    outputs: &HashMap<String, NodeValue>,
    explicit_name: &str,
    output_node_type: &str,
    size: u32,
) -> Vec<f32> {
    if let Some(value) = outputs.get(explicit_name) {
        return value.as_buffer(size, size).data;
    }

    if let Some(node) = graph.nodes.iter().find(|n| n.node_type == output_node_type) {
        let key = format!("{}.value", node.id);
        if let Some(value) = outputs.get(&key) {
            return value.as_buffer(size, size).data;
        }
    }

    vec![0.0; (size * size) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeDef;
    use std::collections::HashMap as Map;

    fn sample_graph() -> GraphDef {
        let mut params = Map::new();
        params.insert("value".to_string(), 12.0);
        GraphDef {
            nodes: vec![NodeDef {
                id: "h".to_string(),
                node_type: "ConstantOutput".to_string(),
                params,
                is_output: false,
            }],
            connections: vec![],
            outputs: Some(Map::from([("heightmap".to_string(), "h".to_string())])),
        }
    }

    #[test]
    fn miss_then_hit() {
        let mut cache = RegionCache::new(RegionCacheConfig::default());
        let mut executor = GraphExecutor::with_builtins();
        let graph = sample_graph();

        let first = cache.get(&mut executor, 0, 0, &graph, 1).unwrap();
        assert_eq!(cache.misses, 1);
        assert_eq!(first.heightmap[0], 12.0);

        let second = cache.get(&mut executor, 0, 0, &graph, 1).unwrap();
        assert_eq!(cache.hits, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_region_drops_only_that_region() {
        let mut cache = RegionCache::new(RegionCacheConfig::default());
        let mut executor = GraphExecutor::with_builtins();
        let graph = sample_graph();

        cache.get(&mut executor, 0, 0, &graph, 1).unwrap();
        cache.get(&mut executor, 1, 0, &graph, 1).unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate_region(0, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn lru_evicts_oldest_over_capacity() {
        let mut cache = RegionCache::new(RegionCacheConfig { capacity: 2 });
        let mut executor = GraphExecutor::with_builtins();
        let graph = sample_graph();

        cache.get(&mut executor, 0, 0, &graph, 1).unwrap();
        cache.get(&mut executor, 1, 0, &graph, 1).unwrap();
        cache.get(&mut executor, 2, 0, &graph, 1).unwrap();

        assert_eq!(cache.len(), 2);
    }
}

//! Loads a world's `pipeline.json` + `config.json` pair (§3, §4.10, §6).

use std::path::Path;

use crate::core::error::Error;
use crate::graph::{validate_graph, GraphDef, NodeRegistry};
use crate::world::config::WorldConfig;

/// A loaded, validated pipeline graph plus its seed and name. Loading and
/// validation happen once per world and are expected to be cached by the
/// caller (§4.10).
#[derive(Clone, Debug)]
pub struct World {
    pub graph: GraphDef,
    pub config: WorldConfig,
}

impl World {
    /// Reads `{dir}/pipeline.json` and `{dir}/config.json`, parses them, and
    /// validates the graph against the built-in node registry. A missing or
    /// malformed file, an unknown node type, or a cycle all surface as
    /// errors an embedding HTTP layer maps to 404/500 (§4.10, §7).
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let pipeline_path = dir.join("pipeline.json");
        let config_path = dir.join("config.json");

        let pipeline_bytes = std::fs::read_to_string(&pipeline_path)
            .map_err(|e| Error::RegionUnavailable(format!("reading {}: {e}", pipeline_path.display())))?;
        let config_bytes = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::RegionUnavailable(format!("reading {}: {e}", config_path.display())))?;

        let graph: GraphDef = serde_json::from_str(&pipeline_bytes)
            .map_err(|e| Error::RegionUnavailable(format!("parsing {}: {e}", pipeline_path.display())))?;
        let config: WorldConfig = serde_json::from_str(&config_bytes)
            .map_err(|e| Error::RegionUnavailable(format!("parsing {}: {e}", config_path.display())))?;

        let registry = NodeRegistry::with_builtins();
        validate_graph(&graph, &registry)?;

        Ok(Self { graph, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_world(dir: &Path, pipeline_json: &str, config_json: &str) {
        let mut pipeline = std::fs::File::create(dir.join("pipeline.json")).unwrap();
        pipeline.write_all(pipeline_json.as_bytes()).unwrap();
        let mut config = std::fs::File::create(dir.join("config.json")).unwrap();
        config.write_all(config_json.as_bytes()).unwrap();
    }

    #[test]
    fn loads_a_valid_world() {
        let dir = tempfile::tempdir().unwrap();
        write_world(
            dir.path(),
            r#"{"nodes":[{"id":"h","type":"ConstantOutput","params":{"value":1.0}}],"connections":[],"outputs":{"heightmap":"h"}}"#,
            r#"{"seed": 7, "name": "test"}"#,
        );

        let world = World::load(dir.path()).unwrap();
        assert_eq!(world.config.seed, 7);
        assert_eq!(world.graph.nodes.len(), 1);
    }

    #[test]
    fn missing_pipeline_file_is_region_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = World::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::RegionUnavailable(_)));
    }

    #[test]
    fn unknown_node_type_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        write_world(
            dir.path(),
            r#"{"nodes":[{"id":"h","type":"NotARealNode","params":{}}],"connections":[],"outputs":null}"#,
            r#"{"seed": 1, "name": "test"}"#,
        );
        let err = World::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidGraph(_)));
    }
}

//! Serializable graph definition — the shape of `worlds/{worldId}/pipeline.json` (§6).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One node instance in the pipeline graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub params: HashMap<String, f64>,
    #[serde(rename = "isOutput", default)]
    pub is_output: bool,
}

/// A directed connection between two node ports.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    #[serde(rename = "fromOutput")]
    pub from_output: String,
    pub to: String,
    #[serde(rename = "toInput")]
    pub to_input: String,
}

/// The full pipeline graph: nodes, connections, and an optional explicit output mapping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphDef {
    pub nodes: Vec<NodeDef>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub outputs: Option<HashMap<String, String>>,
}

impl GraphDef {
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Stable hash over node types + canonical params + connection list, used
    /// as part of the Region Cache key (§4.2). Order-independent in node and
    /// connection listing so structurally-identical graphs hash identically.
    pub fn graph_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut node_strs: Vec<String> = self
            .nodes
            .iter()
            .map(|n| {
                let mut params: Vec<(String, f64)> =
                    n.params.iter().map(|(k, v)| (k.clone(), *v)).collect();
                params.sort_by(|a, b| a.0.cmp(&b.0));
                format!("{}:{}:{:?}:{}", n.id, n.node_type, params, n.is_output)
            })
            .collect();
        node_strs.sort();

        let mut conn_strs: Vec<String> = self
            .connections
            .iter()
            .map(|c| format!("{}.{}->{}.{}", c.from, c.from_output, c.to, c.to_input))
            .collect();
        conn_strs.sort();

        let mut hasher = DefaultHasher::new();
        node_strs.hash(&mut hasher);
        conn_strs.hash(&mut hasher);
        if let Some(outputs) = &self.outputs {
            let mut out_strs: Vec<String> =
                outputs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            out_strs.sort();
            out_strs.hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphDef {
        let mut params = HashMap::new();
        params.insert("octaves".to_string(), 4.0);
        GraphDef {
            nodes: vec![NodeDef {
                id: "n1".into(),
                node_type: "PerlinNoise".into(),
                params,
                is_output: false,
            }],
            connections: vec![],
            outputs: None,
        }
    }

    #[test]
    fn graph_hash_is_stable() {
        let g = sample();
        assert_eq!(g.graph_hash(), g.graph_hash());
    }

    #[test]
    fn graph_hash_changes_with_params() {
        let mut g = sample();
        let hash_before = g.graph_hash();
        g.nodes[0].params.insert("octaves".to_string(), 5.0);
        assert_ne!(hash_before, g.graph_hash());
    }

    #[test]
    fn parses_pipeline_json_shape() {
        let json = r#"{
            "nodes": [{"id": "a", "type": "PerlinNoise", "params": {"octaves": 4.0}}],
            "connections": [],
            "outputs": {"heightmap": "a"}
        }"#;
        let g: GraphDef = serde_json::from_str(json).unwrap();
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.outputs.unwrap()["heightmap"], "a");
    }
}

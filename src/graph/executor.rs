//! Runs a [`GraphDef`] to completion: topological ordering, per-node
//! dispatch through the [`NodeRegistry`], and output resolution (§4.1).

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use super::def::{GraphDef, NodeDef};
use super::node::{ExecContext, NodeValue};
use super::registry::NodeRegistry;
use crate::core::error::Error;

/// The resolved outputs of one execution, plus per-node timing and cache stats.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub outputs: HashMap<String, NodeValue>,
    pub node_timings: HashMap<String, Duration>,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Executes procedural graphs against a node registry, caching per-node
/// results across calls keyed on node type, params, and input fingerprints
/// (§4.1, §9: "approximate but cheap" caching).
pub struct GraphExecutor {
    registry: NodeRegistry,
    cache: HashMap<String, HashMap<String, NodeValue>>,
}

impl GraphExecutor {
    pub fn new(registry: NodeRegistry) -> Self {
        Self { registry, cache: HashMap::new() }
    }

    pub fn with_builtins() -> Self {
        Self::new(NodeRegistry::with_builtins())
    }

    /// Drops all cached per-node results.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn execute(&mut self, graph: &GraphDef, ctx: &ExecContext) -> Result<ExecutionResult, Error> {
        let order = topo_sort(graph)?;

        let mut node_outputs: HashMap<String, HashMap<String, NodeValue>> = HashMap::new();
        let mut node_timings = HashMap::new();
        let mut cache_hits = 0;
        let mut cache_misses = 0;

        for node_id in &order {
            let node_def = graph.node(node_id).expect("topo order only yields known node ids");
            let node = self
                .registry
                .create(&node_def.node_type)
                .ok_or_else(|| Error::InvalidGraph(format!("unknown node type `{}`", node_def.node_type)))?;

            let mut inputs = HashMap::new();
            for conn in graph.connections.iter().filter(|c| c.to == *node_id) {
                if let Some(value) = node_outputs.get(&conn.from).and_then(|o| o.get(&conn.from_output)) {
                    inputs.insert(conn.to_input.clone(), value.clone());
                }
            }

            let cache_key = node.cacheable().then(|| cache_key_for(node_def, &inputs));
            let started = std::time::Instant::now();

            let outputs = match cache_key.as_ref().and_then(|key| self.cache.get(key)) {
                Some(cached) => {
                    cache_hits += 1;
                    cached.clone()
                }
                None => {
                    cache_misses += 1;
                    let result = node
                        .execute(ctx, &inputs, &node_def.params)
                        .map_err(|e| Error::NodeFailure { node_id: node_id.clone(), cause: e.to_string() })?;
                    if let Some(key) = cache_key {
                        self.cache.insert(key, result.clone());
                    }
                    result
                }
            };

            node_timings.insert(node_id.clone(), started.elapsed());
            node_outputs.insert(node_id.clone(), outputs);
        }

        let outputs = resolve_outputs(graph, &node_outputs);
        Ok(ExecutionResult { outputs, node_timings, cache_hits, cache_misses })
    }
}

fn cache_key_for(node_def: &NodeDef, inputs: &HashMap<String, NodeValue>) -> String {
    let mut params: Vec<(String, u64)> =
        node_def.params.iter().map(|(k, v)| (k.clone(), v.to_bits())).collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    let mut input_fps: Vec<(String, u64)> =
        inputs.iter().map(|(k, v)| (k.clone(), v.fingerprint())).collect();
    input_fps.sort_by(|a, b| a.0.cmp(&b.0));

    format!("{}:{:?}:{:?}", node_def.node_type, params, input_fps)
}

/// Validates a graph without running it: every node type must be known to
/// `registry`, every connection must reference real nodes, and the graph
/// must be acyclic (§4.10: "reuses the Graph Executor's own check").
pub fn validate_graph(graph: &GraphDef, registry: &NodeRegistry) -> Result<(), Error> {
    for node in &graph.nodes {
        if !registry.contains(&node.node_type) {
            return Err(Error::InvalidGraph(format!("unknown node type `{}`", node.node_type)));
        }
    }
    topo_sort(graph).map(|_| ())
}

/// Kahn's algorithm over the node/connection graph. Connections referencing
/// unknown node ids, or any remaining cycle, fail as `InvalidGraph`.
fn topo_sort(graph: &GraphDef) -> Result<Vec<String>, Error> {
    for conn in &graph.connections {
        if graph.node(&conn.from).is_none() {
            return Err(Error::InvalidGraph(format!("connection references unknown node `{}`", conn.from)));
        }
        if graph.node(&conn.to).is_none() {
            return Err(Error::InvalidGraph(format!("connection references unknown node `{}`", conn.to)));
        }
    }

    let mut in_degree: HashMap<&str, usize> = graph.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for conn in &graph.connections {
        *in_degree.entry(conn.to.as_str()).or_insert(0) += 1;
        adjacency.entry(conn.from.as_str()).or_default().push(conn.to.as_str());
    }

    let mut ready: Vec<&str> = in_degree.iter().filter(|&(_, &d)| d == 0).map(|(&id, _)| id).collect();
    ready.sort_unstable();
    let mut queue: VecDeque<&str> = ready.into_iter().collect();

    let mut order = Vec::with_capacity(graph.nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        if let Some(next) = adjacency.get(id) {
            for &succ in next {
                let degree = in_degree.get_mut(succ).expect("adjacency only references known nodes");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ);
                }
            }
        }
    }

    if order.len() != graph.nodes.len() {
        return Err(Error::InvalidGraph("cycle detected in node graph".to_string()));
    }
    Ok(order)
}

/// Resolves final outputs in order: nodes whose type ends in `Output` (or
/// are explicitly marked `isOutput`), then the explicit `outputs` mapping,
/// then any node with no outgoing connection as a last resort (§4.1).
fn resolve_outputs(
    graph: &GraphDef,
    node_outputs: &HashMap<String, HashMap<String, NodeValue>>,
) -> HashMap<String, NodeValue> {
    let mut outputs = HashMap::new();

    for node in &graph.nodes {
        if (node.is_output || node.node_type.ends_with("Output"))
            && let Some(result) = node_outputs.get(&node.id) {
                for (port, value) in result {
                    outputs.insert(format!("{}.{}", node.id, port), value.clone());
                }
            }
    }

    if let Some(explicit) = &graph.outputs {
        for (name, node_id) in explicit {
            if let Some(result) = node_outputs.get(node_id)
                && let Some(value) = result.get("value").or_else(|| result.values().next()) {
                    outputs.insert(name.clone(), value.clone());
                }
        }
    }

    let has_outgoing: HashSet<&str> = graph.connections.iter().map(|c| c.from.as_str()).collect();
    for node in &graph.nodes {
        if !has_outgoing.contains(node.id.as_str())
            && let Some(result) = node_outputs.get(&node.id) {
                for (port, value) in result {
                    outputs.entry(format!("{}.{}", node.id, port)).or_insert_with(|| value.clone());
                }
            }
    }

    outputs
}

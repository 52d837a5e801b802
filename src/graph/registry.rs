//! Node registry: a `type -> constructor` map (§9: "Registry is a name→constructor map").

use std::collections::HashMap;
use std::sync::Arc;

use super::node::Node;
use super::nodes;

type Constructor = Arc<dyn Fn() -> Box<dyn Node> + Send + Sync>;

pub struct NodeRegistry {
    constructors: HashMap<&'static str, Constructor>,
}

impl NodeRegistry {
    /// A registry pre-populated with the built-in node set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("ConstantOutput", || Box::new(nodes::constant::Constant));
        registry.register("PerlinNoise", || Box::new(nodes::noise::PerlinNoise));
        registry.register("Remap", || Box::new(nodes::arith::Remap));
        registry.register("Add", || Box::new(nodes::arith::Add));
        registry.register("Multiply", || Box::new(nodes::arith::Multiply));
        registry.register("Curve", || Box::new(nodes::arith::Curve));
        registry.register("Select", || Box::new(nodes::arith::Select));
        registry.register("BiomeClassify", || Box::new(nodes::biome::BiomeClassify));
        registry.register("HeightmapOutput", || Box::new(nodes::output::HeightmapOutput));
        registry.register("MoistureOutput", || Box::new(nodes::output::MoistureOutput));
        registry.register("TemperatureOutput", || Box::new(nodes::output::TemperatureOutput));
        registry.register("BiomeOutput", || Box::new(nodes::output::BiomeOutput));
        registry
    }

    pub fn empty() -> Self {
        Self { constructors: HashMap::new() }
    }

    pub fn register<F>(&mut self, node_type: &'static str, ctor: F)
    where
        F: Fn() -> Box<dyn Node> + Send + Sync + 'static,
    {
        self.constructors.insert(node_type, Arc::new(ctor));
    }

    pub fn create(&self, node_type: &str) -> Option<Box<dyn Node>> {
        self.constructors.get(node_type).map(|ctor| ctor())
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.constructors.contains_key(node_type)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

use std::collections::HashMap;

use crate::core::error::Error;
use crate::graph::node::{Buffer, ExecContext, Node, NodeValue};

/// Expands to a pass-through node whose type name ends in `Output`, marking
/// it as a resolvable graph output (§4.1: "a node's type ending in `Output`
/// marks it as resolvable without an explicit `outputs` mapping").
macro_rules! output_node {
    ($name:ident, $type_name:literal) => {
        pub struct $name;

        impl Node for $name {
            fn node_type(&self) -> &'static str {
                $type_name
            }

            fn category(&self) -> &'static str {
                "output"
            }

            fn inputs(&self) -> &'static [&'static str] {
                &["value"]
            }

            fn outputs(&self) -> &'static [&'static str] {
                &["value"]
            }

            fn execute(
                &self,
                ctx: &ExecContext,
                inputs: &HashMap<String, NodeValue>,
                _params: &HashMap<String, f64>,
            ) -> Result<HashMap<String, NodeValue>, Error> {
                let value = inputs
                    .get("value")
                    .cloned()
                    .unwrap_or_else(|| NodeValue::Buffer(Buffer::filled(ctx.width, ctx.height, 0.0)));
                Ok(HashMap::from([("value".to_string(), value)]))
            }
        }
    };
}

output_node!(HeightmapOutput, "HeightmapOutput");
output_node!(MoistureOutput, "MoistureOutput");
output_node!(TemperatureOutput, "TemperatureOutput");
output_node!(BiomeOutput, "BiomeOutput");

use std::collections::HashMap;

use crate::core::error::Error;
use crate::graph::node::{param_or_default, Buffer, ExecContext, Node, NodeValue, ParamSpec};

/// Classifies a `(moisture, temperature)` pair into a biome id:
/// 0 = desert, 1 = plains, 2 = forest, 3 = tundra.
#[derive(Default)]
pub struct BiomeClassify;

const MOISTURE_THRESHOLD: ParamSpec = ParamSpec::new("moistureThreshold", 0.4);
const TEMPERATURE_THRESHOLD: ParamSpec = ParamSpec::new("temperatureThreshold", 0.4);

impl Node for BiomeClassify {
    fn node_type(&self) -> &'static str {
        "BiomeClassify"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &["moisture", "temperature"]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["biome"]
    }

    fn params_schema(&self) -> Vec<ParamSpec> {
        vec![MOISTURE_THRESHOLD, TEMPERATURE_THRESHOLD]
    }

    fn execute(
        &self,
        ctx: &ExecContext,
        inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let moisture_threshold = param_or_default(params, &MOISTURE_THRESHOLD) as f32;
        let temperature_threshold = param_or_default(params, &TEMPERATURE_THRESHOLD) as f32;

        let moisture = inputs
            .get("moisture")
            .map(|v| v.as_buffer(ctx.width, ctx.height))
            .unwrap_or_else(|| Buffer::filled(ctx.width, ctx.height, 0.0));
        let temperature = inputs
            .get("temperature")
            .map(|v| v.as_buffer(ctx.width, ctx.height))
            .unwrap_or_else(|| Buffer::filled(ctx.width, ctx.height, 0.0));

        let data: Vec<f32> = moisture
            .data
            .iter()
            .zip(temperature.data.iter())
            .map(|(&m, &t)| {
                
                match (m >= moisture_threshold, t >= temperature_threshold) {
                    (false, true) => 0.0,  // dry + hot: desert
                    (false, false) => 3.0, // dry + cold: tundra
                    (true, true) => 2.0,   // wet + hot: forest
                    (true, false) => 1.0,  // wet + cold: plains
                }
            })
            .collect();

        let buf = Buffer { width: moisture.width, height: moisture.height, data };
        Ok(HashMap::from([("biome".to_string(), NodeValue::Buffer(buf))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_quadrant() {
        let ctx = ExecContext { width: 4, height: 1, origin_x: 0.0, origin_z: 0.0, cell_size: 1.0, seed: 0 };
        let mut inputs = HashMap::new();
        inputs.insert(
            "moisture".to_string(),
            NodeValue::Buffer(Buffer { width: 4, height: 1, data: vec![0.0, 0.0, 1.0, 1.0] }),
        );
        inputs.insert(
            "temperature".to_string(),
            NodeValue::Buffer(Buffer { width: 4, height: 1, data: vec![1.0, 0.0, 1.0, 0.0] }),
        );
        let out = BiomeClassify.execute(&ctx, &inputs, &HashMap::new()).unwrap();
        match &out["biome"] {
            NodeValue::Buffer(b) => assert_eq!(b.data, vec![0.0, 3.0, 2.0, 1.0]),
            _ => panic!("expected buffer"),
        }
    }
}

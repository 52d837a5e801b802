use std::collections::HashMap;

use noise::{NoiseFn, Perlin};

use crate::core::error::Error;
use crate::graph::node::{param_or_default, Buffer, ExecContext, Node, NodeValue, ParamSpec};

/// Samples fractal Perlin noise over the region's sampling grid.
#[derive(Default)]
pub struct PerlinNoise;

const FREQUENCY: ParamSpec = ParamSpec::new("frequency", 0.01);
const OCTAVES: ParamSpec = ParamSpec { name: "octaves", default: 4.0, min: Some(1.0), max: Some(8.0), step: Some(1.0) };
const PERSISTENCE: ParamSpec = ParamSpec::new("persistence", 0.5);
const LACUNARITY: ParamSpec = ParamSpec::new("lacunarity", 2.0);
const SEED_OFFSET: ParamSpec = ParamSpec::new("seedOffset", 0.0);

impl Node for PerlinNoise {
    fn node_type(&self) -> &'static str {
        "PerlinNoise"
    }

    fn category(&self) -> &'static str {
        "source"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[]
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["value"]
    }

    fn params_schema(&self) -> Vec<ParamSpec> {
        vec![FREQUENCY, OCTAVES, PERSISTENCE, LACUNARITY, SEED_OFFSET]
    }

    fn execute(
        &self,
        ctx: &ExecContext,
        _inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let frequency = param_or_default(params, &FREQUENCY);
        let octaves = param_or_default(params, &OCTAVES).max(1.0) as u32;
        let persistence = param_or_default(params, &PERSISTENCE);
        let lacunarity = param_or_default(params, &LACUNARITY);
        let seed_offset = param_or_default(params, &SEED_OFFSET) as i64;

        let seed = (ctx.seed as i64).wrapping_add(seed_offset) as u32;
        let perlin = Perlin::new(seed);

        let mut buffer = Buffer::filled(ctx.width, ctx.height, 0.0);
        for y in 0..ctx.height {
            for x in 0..ctx.width {
                let wx = ctx.origin_x + x as f64 * ctx.cell_size;
                let wz = ctx.origin_z + y as f64 * ctx.cell_size;

                let mut amplitude = 1.0f64;
                let mut freq = frequency;
                let mut sum = 0.0f64;
                let mut norm = 0.0f64;
                for _ in 0..octaves {
                    sum += perlin.get([wx * freq, wz * freq]) * amplitude;
                    norm += amplitude;
                    amplitude *= persistence;
                    freq *= lacunarity;
                }
                let value = if norm > 0.0 { sum / norm } else { 0.0 };
                buffer.set(x, y, value as f32);
            }
        }

        let mut out = HashMap::new();
        out.insert("value".to_string(), NodeValue::Buffer(buffer));
        Ok(out)
    }
}

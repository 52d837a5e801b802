//! The per-node contract (§6: "Node contract").

use std::collections::HashMap;

use crate::core::error::Error;

/// A 2D buffer of `width*height` samples, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Buffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Buffer {
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width * height) as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, v: f32) {
        let idx = (y * self.width + x) as usize;
        self.data[idx] = v;
    }

    /// Approximate fingerprint for node-cache keys (§4.1, §9): samples the
    /// first, middle, and last elements plus the length. Intentionally
    /// cheap and intentionally capable of colliding on crafted inputs — this
    /// mirrors the design's explicit admission that the fingerprint is
    /// approximate.
    pub fn fingerprint(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf29ce484222325;
        const FNV_PRIME: u64 = 0x100000001b3;

        let mut hash = FNV_OFFSET;
        let mut mix = |bits: u32| {
            hash ^= bits as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        };

        mix(self.data.len() as u32);
        if !self.data.is_empty() {
            mix(self.data[0].to_bits());
            mix(self.data[self.data.len() / 2].to_bits());
            mix(self.data[self.data.len() - 1].to_bits());
        }
        hash
    }
}

/// A value flowing along a graph connection: either a scalar (broadcast to
/// any buffer shape it's combined with) or a full 2D buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Scalar(f64),
    Buffer(Buffer),
}

impl NodeValue {
    pub fn fingerprint(&self) -> u64 {
        match self {
            NodeValue::Scalar(s) => s.to_bits(),
            NodeValue::Buffer(b) => b.fingerprint(),
        }
    }

    /// Resolve to a buffer of the given shape, broadcasting scalars.
    pub fn as_buffer(&self, width: u32, height: u32) -> Buffer {
        match self {
            NodeValue::Scalar(s) => Buffer::filled(width, height, *s as f32),
            NodeValue::Buffer(b) => b.clone(),
        }
    }
}

/// Global settings shared by every node in one execution: the sampling grid
/// and the world seed (§4.1: "global settings merged with node params").
#[derive(Clone, Copy, Debug)]
pub struct ExecContext {
    pub width: u32,
    pub height: u32,
    pub origin_x: f64,
    pub origin_z: f64,
    /// World units covered by one buffer cell.
    pub cell_size: f64,
    pub seed: u32,
}

/// One entry of a node's params schema (§6: "params schema").
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl ParamSpec {
    pub const fn new(name: &'static str, default: f64) -> Self {
        Self { name, default, min: None, max: None, step: None }
    }
}

/// A procedural graph node: stable type name, ordered ports, a params
/// schema, and an `execute` dispatch. Expressed as a trait object rather
/// than a class hierarchy (§9: "avoid deep inheritance trees").
pub trait Node: Send + Sync {
    fn node_type(&self) -> &'static str;
    fn category(&self) -> &'static str {
        "generic"
    }
    fn inputs(&self) -> &'static [&'static str];
    fn outputs(&self) -> &'static [&'static str];
    fn params_schema(&self) -> Vec<ParamSpec> {
        Vec::new()
    }
    fn cacheable(&self) -> bool {
        true
    }

    fn execute(
        &self,
        ctx: &ExecContext,
        inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error>;
}

/// Reads a param by name, falling back to the node's declared default.
pub fn param_or_default(params: &HashMap<String, f64>, spec: &ParamSpec) -> f64 {
    params.get(spec.name).copied().unwrap_or(spec.default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn fingerprint_is_stable_for_equal_buffers() {
        let a = Buffer { width: 3, height: 3, data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0] };
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    /// §9 admits `Buffer::fingerprint` is approximate (it samples only the
    /// first/middle/last element plus length), so this checks the collision
    /// rate it produces over random, fully-distinguishable buffers stays
    /// rare rather than asserting zero collisions are impossible.
    #[test]
    fn fingerprint_collisions_stay_rare_for_distinguishable_buffers() {
        let mut rng = rand::thread_rng();
        let trials = 5_000;
        let mut collisions = 0;

        for _ in 0..trials {
            let len = rng.gen_range(4..64);
            let data_a: Vec<f32> = (0..len).map(|_| rng.gen_range(-1e6..1e6)).collect();
            let data_b: Vec<f32> = (0..len).map(|_| rng.gen_range(-1e6..1e6)).collect();
            if data_a == data_b {
                continue;
            }
            let a = Buffer { width: len as u32, height: 1, data: data_a };
            let b = Buffer { width: len as u32, height: 1, data: data_b };
            if a.fingerprint() == b.fingerprint() {
                collisions += 1;
            }
        }

        let rate = collisions as f64 / trials as f64;
        assert!(rate < 0.01, "fingerprint collision rate {rate} too high over {trials} random distinguishable buffers");
    }
}

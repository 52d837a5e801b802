use std::collections::HashMap;

use crate::core::error::Error;
use crate::graph::node::{param_or_default, Buffer, ExecContext, Node, NodeValue, ParamSpec};

fn require_buffer_shape(inputs: &HashMap<String, NodeValue>, ctx: &ExecContext) -> (u32, u32) {
    for v in inputs.values() {
        if let NodeValue::Buffer(b) = v {
            return (b.width, b.height);
        }
    }
    (ctx.width, ctx.height)
}

/// Combines two inputs elementwise. If neither input is a [`Buffer`], the
/// result stays a [`NodeValue::Scalar`] instead of materializing a
/// `ctx.width * ctx.height` buffer of a single repeated value.
fn elementwise(
    ctx: &ExecContext,
    inputs: &HashMap<String, NodeValue>,
    a_name: &str,
    b_name: &str,
    op: impl Fn(f32, f32) -> f32,
) -> NodeValue {
    let a_scalar = match inputs.get(a_name) {
        Some(NodeValue::Scalar(s)) => Some(*s as f32),
        None => Some(0.0),
        Some(NodeValue::Buffer(_)) => None,
    };
    let b_scalar = match inputs.get(b_name) {
        Some(NodeValue::Scalar(s)) => Some(*s as f32),
        None => Some(0.0),
        Some(NodeValue::Buffer(_)) => None,
    };
    if let (Some(a), Some(b)) = (a_scalar, b_scalar) {
        return NodeValue::Scalar(op(a, b) as f64);
    }

    let (width, height) = require_buffer_shape(inputs, ctx);
    let a = inputs
        .get(a_name)
        .map(|v| v.as_buffer(width, height))
        .unwrap_or_else(|| Buffer::filled(width, height, 0.0));
    let b = inputs
        .get(b_name)
        .map(|v| v.as_buffer(width, height))
        .unwrap_or_else(|| Buffer::filled(width, height, 0.0));

    let data: Vec<f32> = a.data.iter().zip(b.data.iter()).map(|(&x, &y)| op(x, y)).collect();
    NodeValue::Buffer(Buffer { width, height, data })
}

/// Elementwise sum of two inputs (scalars broadcast).
pub struct Add;

impl Node for Add {
    fn node_type(&self) -> &'static str {
        "Add"
    }
    fn inputs(&self) -> &'static [&'static str] {
        &["a", "b"]
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
        let value = elementwise(ctx, inputs, "a", "b", |x, y| x + y);
        Ok(HashMap::from([("value".to_string(), value)]))
    }
}

/// Elementwise product of two inputs (scalars broadcast).
pub struct Multiply;

impl Node for Multiply {
    fn node_type(&self) -> &'static str {
        "Multiply"
    }
    fn inputs(&self) -> &'static [&'static str] {
        &["a", "b"]
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
        let value = elementwise(ctx, inputs, "a", "b", |x, y| x * y);
        Ok(HashMap::from([("value".to_string(), value)]))
    }
}

/// Linearly remaps `value` from `[inMin, inMax]` to `[outMin, outMax]`.
pub struct Remap;

const IN_MIN: ParamSpec = ParamSpec::new("inMin", -1.0);
const IN_MAX: ParamSpec = ParamSpec::new("inMax", 1.0);
const OUT_MIN: ParamSpec = ParamSpec::new("outMin", 0.0);
const OUT_MAX: ParamSpec = ParamSpec::new("outMax", 1.0);

impl Node for Remap {
    fn node_type(&self) -> &'static str {
        "Remap"
    }
    fn inputs(&self) -> &'static [&'static str] {
        &["value"]
    }
    fn outputs(&self) -> &'static [&'static str] {
        &["value"]
    }
    fn params_schema(&self) -> Vec<ParamSpec> {
        vec![IN_MIN, IN_MAX, OUT_MIN, OUT_MAX]
    }
    fn execute(
        &self,
        ctx: &ExecContext,
        inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let in_min = param_or_default(params, &IN_MIN) as f32;
        let in_max = param_or_default(params, &IN_MAX) as f32;
        let out_min = param_or_default(params, &OUT_MIN) as f32;
        let out_max = param_or_default(params, &OUT_MAX) as f32;
        let span = (in_max - in_min).max(f32::EPSILON);

        let input = inputs
            .get("value")
            .map(|v| v.as_buffer(ctx.width, ctx.height))
            .unwrap_or_else(|| Buffer::filled(ctx.width, ctx.height, 0.0));

        let data: Vec<f32> = input
            .data
            .iter()
            .map(|&v| out_min + (v - in_min) / span * (out_max - out_min))
            .collect();
        let buf = Buffer { width: input.width, height: input.height, data };
        Ok(HashMap::from([("value".to_string(), NodeValue::Buffer(buf))]))
    }
}

/// Applies a power curve `sign(v) * |v|^exponent` to `value`.
pub struct Curve;

const EXPONENT: ParamSpec = ParamSpec::new("exponent", 1.0);

impl Node for Curve {
    fn node_type(&self) -> &'static str {
        "Curve"
    }
    fn inputs(&self) -> &'static [&'static str] {
        &["value"]
    }
    fn outputs(&self) -> &'static [&'static str] {
        &["value"]
    }
    fn params_schema(&self) -> Vec<ParamSpec> {
        vec![EXPONENT]
    }
    fn execute(
        &self,
        ctx: &ExecContext,
        inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let exponent = param_or_default(params, &EXPONENT) as f32;
        let input = inputs
            .get("value")
            .map(|v| v.as_buffer(ctx.width, ctx.height))
            .unwrap_or_else(|| Buffer::filled(ctx.width, ctx.height, 0.0));

        let data: Vec<f32> = input
            .data
            .iter()
            .map(|&v| v.signum() * v.abs().powf(exponent))
            .collect();
        let buf = Buffer { width: input.width, height: input.height, data };
        Ok(HashMap::from([("value".to_string(), NodeValue::Buffer(buf))]))
    }
}

/// Picks `a` where `mask >= threshold`, else `b`.
pub struct Select;

const THRESHOLD: ParamSpec = ParamSpec::new("threshold", 0.5);

impl Node for Select {
    fn node_type(&self) -> &'static str {
        "Select"
    }
    fn inputs(&self) -> &'static [&'static str] {
        &["a", "b", "mask"]
    }
    fn outputs(&self) -> &'static [&'static str] {
        &["value"]
    }
    fn params_schema(&self) -> Vec<ParamSpec> {
        vec![THRESHOLD]
    }
    fn execute(
        &self,
        ctx: &ExecContext,
        inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let threshold = param_or_default(params, &THRESHOLD) as f32;
        let (width, height) = require_buffer_shape(inputs, ctx);
        let a = inputs.get("a").map(|v| v.as_buffer(width, height)).unwrap_or_else(|| Buffer::filled(width, height, 0.0));
        let b = inputs.get("b").map(|v| v.as_buffer(width, height)).unwrap_or_else(|| Buffer::filled(width, height, 0.0));
        let mask = inputs.get("mask").map(|v| v.as_buffer(width, height)).unwrap_or_else(|| Buffer::filled(width, height, 0.0));

        let data: Vec<f32> = a
            .data
            .iter()
            .zip(b.data.iter())
            .zip(mask.data.iter())
            .map(|((&av, &bv), &mv)| if mv >= threshold { av } else { bv })
            .collect();
        let buf = Buffer { width, height, data };
        Ok(HashMap::from([("value".to_string(), NodeValue::Buffer(buf))]))
    }
}

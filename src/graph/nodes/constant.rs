use std::collections::HashMap;

use crate::core::error::Error;
use crate::graph::node::{ExecContext, Node, NodeValue, ParamSpec};

/// Emits a single scalar value, broadcast to whatever shape downstream needs.
#[derive(Default)]
pub struct Constant;

impl Node for Constant {
    fn node_type(&self) -> &'static str {
        "ConstantOutput"
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
        vec![ParamSpec::new("value", 0.0)]
    }

    fn execute(
        &self,
        _ctx: &ExecContext,
        _inputs: &HashMap<String, NodeValue>,
        params: &HashMap<String, f64>,
    ) -> Result<HashMap<String, NodeValue>, Error> {
        let value = params.get("value").copied().unwrap_or(0.0);
        let mut out = HashMap::new();
        out.insert("value".to_string(), NodeValue::Scalar(value));
        Ok(out)
    }
}

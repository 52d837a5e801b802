//! The procedural graph executor (§4.1): runs a user-authored DAG of typed
//! nodes in topological order to produce per-region 2D output buffers.

pub mod def;
pub mod executor;
pub mod node;
pub mod nodes;
pub mod registry;

pub use def::{Connection, GraphDef, NodeDef};
pub use executor::{validate_graph, ExecutionResult, GraphExecutor};
pub use node::{Buffer, ExecContext, Node, NodeValue, ParamSpec};
pub use registry::NodeRegistry;

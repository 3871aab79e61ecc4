//! Execution of compiled mappings against sources
//!
//! One [`Executor`] owns the output graph for a run. Each TriplesMap is
//! handled by the engine its reference formulation selects; parent maps run
//! on demand from inside the child's row.

mod executor;

pub use executor::{ExecutionStats, Executor};

use bibcat_graph_ir::Graph;

use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::RmlResult;
use crate::mapping::{CompiledMapping, ReferenceFormulation};
use crate::source::Source;

/// The closed set of engine variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// XPath over an XML document
    Xml,
    /// JSONPath over a JSON document
    Json,
    /// Rows of a remote query result
    Bindings,
    /// Delimited text rows
    Rows,
}

impl EngineKind {
    pub fn for_formulation(formulation: ReferenceFormulation) -> Self {
        match formulation {
            ReferenceFormulation::XPath => EngineKind::Xml,
            ReferenceFormulation::JsonPath => EngineKind::Json,
            ReferenceFormulation::Sparql => EngineKind::Bindings,
            ReferenceFormulation::Rows => EngineKind::Rows,
        }
    }
}

/// Run every top-level map of `mapping` over `source` and return the graph
///
/// Bindings maps need [`Executor::with_store`]; use the executor directly
/// for those.
pub async fn transform(
    mapping: &CompiledMapping,
    config: &EngineConfig,
    source: &Source,
    ctx: &Context,
) -> RmlResult<Graph> {
    let mut executor = Executor::new(mapping, config);
    executor.run(source, ctx).await?;
    Ok(executor.into_graph())
}

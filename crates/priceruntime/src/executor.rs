use crate::registry::NodeRegistry;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use pricecore::{ExecutionContext, FieldMap, Pipeline, PipelineError, ValidationError};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::Instant;

/// Aggregate result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Output of every node, keyed by node id
    pub outputs: HashMap<String, FieldMap>,

    /// The order nodes actually ran in
    pub execution_order: Vec<String>,

    /// Wall-clock span of the whole run
    pub duration_ms: u64,
}

/// Executes pipelines as DAGs, one node at a time.
///
/// Execution is strictly sequential across the whole run, even across
/// independent branches; the only suspension point is each node's own
/// `execute`. A node therefore observes exactly the completed outputs of
/// its declared predecessors, and the context's results map needs no
/// locking.
pub struct PipelineExecutor;

impl PipelineExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a pipeline and return the aggregate result.
    ///
    /// Any failure terminates the run: validation errors before any node
    /// executes, an unregistered node type or a node error mid-run. No
    /// partial result is ever returned, though outputs recorded before a
    /// mid-run abort remain in the context until it is discarded.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        registry: &NodeRegistry,
        ctx: &mut ExecutionContext,
    ) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();

        self.validate(pipeline)?;
        let order = execution_order(pipeline);

        tracing::info!(
            nodes = pipeline.nodes.len(),
            edges = pipeline.edges.len(),
            "starting pipeline run"
        );

        let mut outputs = HashMap::new();
        let mut execution_order = Vec::with_capacity(order.len());

        for idx in order {
            let node_spec = &pipeline.nodes[idx];
            let input = merge_inputs(pipeline, &node_spec.id, &ctx.results);
            let node = registry.create(&node_spec.node_type)?;

            tracing::debug!(node = %node_spec.id, node_type = %node_spec.node_type, "executing node");
            let node_start = Instant::now();

            let output = node
                .execute(input, &node_spec.config, ctx)
                .await
                .map_err(|source| {
                    tracing::error!(node = %node_spec.id, error = %source, "node failed");
                    PipelineError::NodeExecution {
                        node_id: node_spec.id.clone(),
                        node_type: node_spec.node_type.clone(),
                        source,
                    }
                })?;

            tracing::info!(
                node = %node_spec.id,
                duration_ms = node_start.elapsed().as_millis() as u64,
                "node completed"
            );

            ctx.results.insert(node_spec.id.clone(), output.clone());
            outputs.insert(node_spec.id.clone(), output);
            execution_order.push(node_spec.id.clone());
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(duration_ms, "pipeline run completed");

        Ok(PipelineResult {
            outputs,
            execution_order,
            duration_ms,
        })
    }

    /// Check the pipeline's structural invariants before anything runs.
    ///
    /// Failure here has zero side effects: no node executes and no storage
    /// writes occur.
    pub fn validate(&self, pipeline: &Pipeline) -> Result<(), ValidationError> {
        let mut ids = HashSet::new();
        for node in &pipeline.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(ValidationError::DuplicateNodeId(node.id.clone()));
            }
        }

        for edge in &pipeline.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(ValidationError::UnknownNodeReference {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        unknown: endpoint.clone(),
                    });
                }
            }
        }

        let mut graph = DiGraph::<&str, ()>::new();
        let mut index_of = HashMap::new();
        for node in &pipeline.nodes {
            index_of.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
        }
        for edge in &pipeline.edges {
            graph.add_edge(index_of[edge.from.as_str()], index_of[edge.to.as_str()], ());
        }
        if toposort(&graph, None).is_err() {
            return Err(ValidationError::CyclicGraph);
        }

        Ok(())
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Topological order by in-degree elimination over node indices.
///
/// Ties among simultaneously-ready nodes break by position in the original
/// `nodes` list, so the same definition always runs in the same order.
/// Assumes a validated (acyclic, reference-consistent) pipeline.
fn execution_order(pipeline: &Pipeline) -> Vec<usize> {
    let index_of: HashMap<&str, usize> = pipeline
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; pipeline.nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); pipeline.nodes.len()];
    for edge in &pipeline.edges {
        let from = index_of[edge.from.as_str()];
        let to = index_of[edge.to.as_str()];
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(pipeline.nodes.len());
    while let Some(Reverse(idx)) = ready.pop() {
        order.push(idx);
        for &succ in &successors[idx] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.push(Reverse(succ));
            }
        }
    }

    debug_assert_eq!(order.len(), pipeline.nodes.len());
    order
}

/// Merge the recorded outputs of a node's predecessors into one input map.
///
/// Edges are walked in the order they appear in the pipeline's edge list,
/// and each mapping list in its own declared order; a later write to the
/// same target field wins. Nodes with no incoming edges get an empty map.
fn merge_inputs(
    pipeline: &Pipeline,
    node_id: &str,
    results: &HashMap<String, FieldMap>,
) -> FieldMap {
    let mut merged = FieldMap::new();

    for edge in pipeline.edges.iter().filter(|e| e.to == node_id) {
        let Some(output) = results.get(&edge.from) else {
            continue;
        };
        match &edge.mapping {
            None => {
                for (field, value) in output {
                    merged.insert(field.clone(), value.clone());
                }
            }
            Some(mapping) => {
                for rename in mapping {
                    if let Some(value) = output.get(&rename.source) {
                        merged.insert(rename.target.clone(), value.clone());
                    }
                }
            }
        }
    }

    merged
}

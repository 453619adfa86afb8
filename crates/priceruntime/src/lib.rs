//! Pipeline execution runtime
//!
//! This crate provides the node registry and the sequential DAG executor
//! that validates a pipeline, computes a deterministic topological order,
//! merges predecessor outputs into each node's input, and assembles the
//! run result.

mod executor;
mod registry;

pub use executor::{PipelineExecutor, PipelineResult};
pub use registry::{NodeFactory, NodeRegistry};

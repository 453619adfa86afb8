//! Core contracts and types for the pipeline engine
//!
//! This crate defines the pipeline definition format, the node execution
//! capability, the per-run execution context, the storage contract, and the
//! error taxonomy shared by the runtime and the node library.

mod context;
mod error;
mod node;
mod pipeline;
mod storage;
mod value;

pub use context::ExecutionContext;
pub use error::{NodeError, PipelineError, StorageError, ValidationError};
pub use node::Node;
pub use pipeline::{Edge, FieldMapping, Pipeline, PipelineNode};
pub use storage::{MemoryStorage, NewSnapshot, Snapshot, StorageAdapter};
pub use value::{FieldMap, FieldMapExt, Value};

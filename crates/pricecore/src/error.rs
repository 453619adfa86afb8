use thiserror::Error;

/// Top-level error surfaced by a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown node type '{node_type}' (known types: {})", .known.join(", "))]
    UnknownNodeType { node_type: String, known: Vec<String> },

    #[error("node '{node_id}' ({node_type}) failed: {source}")]
    NodeExecution {
        node_id: String,
        node_type: String,
        #[source]
        source: NodeError,
    },
}

/// Structural problems with a pipeline definition, raised before any node runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("edge {from} -> {to} references unknown node '{unknown}'")]
    UnknownNodeReference {
        from: String,
        to: String,
        unknown: String,
    },

    #[error("pipeline contains a cycle")]
    CyclicGraph,
}

/// Failures raised from within a node's execute
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("invalid input type for '{field}': expected {expected}")]
    InvalidInputType { field: String, expected: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the storage adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("snapshot not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

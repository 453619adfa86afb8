use crate::{FieldMap, StorageAdapter};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-run shared state threaded through every node invocation.
///
/// Created fresh for each run, mutated by exactly one writer (the executor,
/// once per completed node), and discarded afterwards unless the caller
/// keeps it for snapshot history. Nodes see it immutably and use it only to
/// reach storage.
pub struct ExecutionContext {
    pub storage: Arc<dyn StorageAdapter>,
    pub results: HashMap<String, FieldMap>,
}

impl ExecutionContext {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            results: HashMap::new(),
        }
    }

    /// Recorded output of a completed node, if any
    pub fn output_of(&self, node_id: &str) -> Option<&FieldMap> {
        self.results.get(node_id)
    }
}

use crate::{ExecutionContext, FieldMap, NodeError};
use async_trait::async_trait;

/// Core capability implemented by every executable node.
///
/// Instances are created fresh per scheduled node and carry no state between
/// invocations. `execute` is the engine's sole suspension point; it may
/// perform network or storage I/O of unbounded duration, and any timeout
/// must be enforced inside the node itself.
#[async_trait]
pub trait Node: Send + Sync {
    /// Type tag matching the registry key (e.g. "fetch", "detect-fees")
    fn node_type(&self) -> &str;

    /// Run the node over its merged input and static config.
    ///
    /// Non-fatal local conditions (a webhook that fails to deliver, say)
    /// should be absorbed and reported as output fields; returning an error
    /// aborts the whole run.
    async fn execute(
        &self,
        input: FieldMap,
        config: &FieldMap,
        ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError>;
}

impl std::fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("node_type", &self.node_type())
            .finish()
    }
}

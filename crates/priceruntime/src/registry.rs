use pricecore::{Node, PipelineError};
use std::collections::HashMap;
use std::sync::Arc;

/// Factory trait producing fresh node instances.
///
/// Invoked once per scheduled node; instances are stateless and carry
/// nothing between invocations.
pub trait NodeFactory: Send + Sync {
    /// Type tag this factory is registered under
    fn node_type(&self) -> &str;

    /// Create a new instance of the node
    fn create(&self) -> Box<dyn Node>;
}

struct FnFactory {
    node_type: String,
    make: Box<dyn Fn() -> Box<dyn Node> + Send + Sync>,
}

impl NodeFactory for FnFactory {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn create(&self) -> Box<dyn Node> {
        (self.make)()
    }
}

/// Registry of available node types.
///
/// Populated once at startup and read-only during any run.
pub struct NodeRegistry {
    factories: HashMap<String, Arc<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a node factory, overwriting any previous one for the type
    pub fn register(&mut self, factory: Arc<dyn NodeFactory>) {
        let node_type = factory.node_type().to_string();
        tracing::info!(node_type = %node_type, "registering node type");
        self.factories.insert(node_type, factory);
    }

    /// Register a closure that constructs node instances
    pub fn register_fn<F>(&mut self, node_type: impl Into<String>, make: F)
    where
        F: Fn() -> Box<dyn Node> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnFactory {
            node_type: node_type.into(),
            make: Box::new(make),
        }));
    }

    /// Instantiate a fresh node for a type tag
    pub fn create(&self, node_type: &str) -> Result<Box<dyn Node>, PipelineError> {
        let factory = self
            .factories
            .get(node_type)
            .ok_or_else(|| PipelineError::UnknownNodeType {
                node_type: node_type.to_string(),
                known: self.types(),
            })?;
        Ok(factory.create())
    }

    pub fn has(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// All registered type tags, sorted for stable output
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

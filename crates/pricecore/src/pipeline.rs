use crate::{FieldMap, Value};
use serde::{Deserialize, Serialize};

/// A typed processing step in a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineNode {
    /// Unique within the pipeline
    pub id: String,

    /// Registry key resolving to a node implementation
    #[serde(rename = "type")]
    pub node_type: String,

    /// Static data baked into the definition, distinct from computed input
    #[serde(default)]
    pub config: FieldMap,
}

impl PipelineNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            config: FieldMap::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// One source-field to target-field rename on an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub target: String,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A dependency link carrying a predecessor's output into a successor's input.
///
/// Without a `mapping`, every output field is copied through. With one, only
/// the listed source fields are copied, renamed to their targets, in list
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Vec<FieldMapping>>,
}

/// Immutable description of a DAG of nodes and edges.
///
/// Serializes to the external definition format
/// `{nodes: [{id, type, config}], edges: [{from, to, mapping?}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    pub nodes: Vec<PipelineNode>,
    pub edges: Vec<Edge>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: PipelineNode) {
        self.nodes.push(node);
    }

    /// Connect two nodes, copying every output field through
    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            mapping: None,
        });
    }

    /// Connect two nodes, copying only the mapped fields under new names
    pub fn connect_mapped(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        mapping: Vec<FieldMapping>,
    ) {
        self.edges.push(Edge {
            from: from.into(),
            to: to.into(),
            mapping: Some(mapping),
        });
    }

    pub fn find_node(&self, id: &str) -> Option<&PipelineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

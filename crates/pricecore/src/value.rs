use crate::NodeError;

/// Dynamic value carried between nodes
pub type Value = serde_json::Value;

/// Ordered field container for node inputs, outputs, and config.
///
/// Backed by `serde_json::Map` with `preserve_order`, so fields iterate in
/// insertion order. The executor relies on this when merging edges: a later
/// insert of the same key overwrites the earlier one, and declaration order
/// is the only order in play.
pub type FieldMap = serde_json::Map<String, Value>;

/// Typed accessors over a [`FieldMap`], shared by input and config handling
pub trait FieldMapExt {
    fn require_str(&self, name: &str) -> Result<&str, NodeError>;
    fn require_i64(&self, name: &str) -> Result<i64, NodeError>;
    fn get_str(&self, name: &str) -> Option<&str>;
    fn get_i64(&self, name: &str) -> Option<i64>;
    fn get_f64(&self, name: &str) -> Option<f64>;
    fn get_array(&self, name: &str) -> Option<&Vec<Value>>;

    /// Builder-style insert for assembling outputs
    fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self;
}

impl FieldMapExt for FieldMap {
    fn require_str(&self, name: &str) -> Result<&str, NodeError> {
        let value = self
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))?;
        value.as_str().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "string".to_string(),
        })
    }

    fn require_i64(&self, name: &str) -> Result<i64, NodeError> {
        let value = self
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))?;
        value.as_i64().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "integer".to_string(),
        })
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    fn get_array(&self, name: &str) -> Option<&Vec<Value>> {
        self.get(name).and_then(Value::as_array)
    }

    fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name.into(), value.into());
        self
    }
}

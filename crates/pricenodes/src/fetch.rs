use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError};
use priceruntime::NodeFactory;

/// Fetches a product page over HTTP
pub struct FetchNode {
    client: reqwest::Client,
}

impl FetchNode {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for FetchNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for FetchNode {
    fn node_type(&self) -> &str {
        "fetch"
    }

    async fn execute(
        &self,
        input: FieldMap,
        config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let url = config
            .get_str("url")
            .or_else(|| input.get_str("url"))
            .ok_or_else(|| NodeError::Configuration("missing url".to_string()))?;

        tracing::debug!(url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NodeError::ExecutionFailed(format!("request failed: {}", e)))?;

        let status = response.status().as_u16();
        let html = response
            .text()
            .await
            .map_err(|e| NodeError::ExecutionFailed(format!("failed to read body: {}", e)))?;

        Ok(FieldMap::new()
            .with("url", url.to_string())
            .with("status", status as i64)
            .with("html", html))
    }
}

pub struct FetchNodeFactory;

impl NodeFactory for FetchNodeFactory {
    fn node_type(&self) -> &str {
        "fetch"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(FetchNode::new())
    }
}

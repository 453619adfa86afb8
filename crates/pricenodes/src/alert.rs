use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError};
use priceruntime::NodeFactory;
use serde_json::json;

/// Posts a webhook notification when a listing scores below a threshold.
///
/// Delivery failure is a node-local condition: it is absorbed and reported
/// as `notified: false` rather than failing the run.
pub struct AlertNode {
    client: reqwest::Client,
}

impl AlertNode {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AlertNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for AlertNode {
    fn node_type(&self) -> &str {
        "alert"
    }

    async fn execute(
        &self,
        input: FieldMap,
        config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let min_score = config.get_i64("min_score").unwrap_or(100);
        let score = input.get_i64("score").unwrap_or(0);

        if score >= min_score {
            return Ok(FieldMap::new()
                .with("notified", false)
                .with("reason", "score above threshold"));
        }

        let Some(webhook_url) = config.get_str("webhook_url") else {
            return Ok(FieldMap::new()
                .with("notified", false)
                .with("reason", "no webhook configured"));
        };

        let payload = json!({
            "score": score,
            "issues": input.get("issues").cloned().unwrap_or_default(),
            "url": input.get_str("url"),
        });

        match self.client.post(webhook_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                Ok(FieldMap::new().with("notified", true))
            }
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "webhook rejected alert");
                Ok(FieldMap::new()
                    .with("notified", false)
                    .with("reason", format!("webhook returned {}", response.status())))
            }
            Err(e) => {
                tracing::warn!(error = %e, "webhook delivery failed");
                Ok(FieldMap::new()
                    .with("notified", false)
                    .with("reason", format!("delivery failed: {}", e)))
            }
        }
    }
}

pub struct AlertNodeFactory;

impl NodeFactory for AlertNodeFactory {
    fn node_type(&self) -> &str {
        "alert"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(AlertNode::new())
    }
}

use async_trait::async_trait;
use chrono::Utc;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, NewSnapshot, Node, NodeError};
use priceruntime::NodeFactory;

/// Persists the current price observation through the run's storage adapter
pub struct SaveSnapshotNode;

#[async_trait]
impl Node for SaveSnapshotNode {
    fn node_type(&self) -> &str {
        "save-snapshot"
    }

    async fn execute(
        &self,
        input: FieldMap,
        config: &FieldMap,
        ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let url = input
            .get_str("url")
            .or_else(|| config.get_str("url"))
            .ok_or_else(|| NodeError::MissingInput("url".to_string()))?;
        let product_name = input.require_str("product_name")?;
        let price_cents = input.require_i64("price_cents")?;
        let currency = input.get_str("currency").unwrap_or("USD");

        let id = ctx
            .storage
            .save_snapshot(NewSnapshot {
                url: url.to_string(),
                product_name: product_name.to_string(),
                price_cents,
                currency: currency.to_string(),
                captured_at: Utc::now(),
            })
            .await?;

        Ok(FieldMap::new().with("snapshot_id", id))
    }
}

pub struct SaveSnapshotNodeFactory;

impl NodeFactory for SaveSnapshotNodeFactory {
    fn node_type(&self) -> &str {
        "save-snapshot"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(SaveSnapshotNode)
    }
}

/// Queries stored snapshots for a url within a capture window
pub struct QuerySnapshotsNode;

#[async_trait]
impl Node for QuerySnapshotsNode {
    fn node_type(&self) -> &str {
        "query-snapshots"
    }

    async fn execute(
        &self,
        input: FieldMap,
        config: &FieldMap,
        ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let url = config
            .get_str("url")
            .or_else(|| input.get_str("url"))
            .ok_or_else(|| NodeError::Configuration("missing url".to_string()))?;
        let product_name = config.get_str("product_name");
        let days = config.get_i64("days");

        let snapshots = ctx.storage.query_snapshots(url, product_name, days).await?;
        let count = snapshots.len() as i64;

        let snapshots = serde_json::to_value(snapshots)
            .map_err(|e| NodeError::ExecutionFailed(format!("serialize snapshots: {}", e)))?;

        Ok(FieldMap::new()
            .with("snapshots", snapshots)
            .with("count", count))
    }
}

pub struct QuerySnapshotsNodeFactory;

impl NodeFactory for QuerySnapshotsNodeFactory {
    fn node_type(&self) -> &str {
        "query-snapshots"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(QuerySnapshotsNode)
    }
}

use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError, Value};
use priceruntime::NodeFactory;
use serde_json::json;

/// Derives a price trend from a snapshot series.
///
/// The series arrives ascending by capture time, so the trend spans the
/// oldest to the newest observation.
pub struct CompareTimeNode;

#[async_trait]
impl Node for CompareTimeNode {
    fn node_type(&self) -> &str {
        "compare-time"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let snapshots = input
            .get_array("snapshots")
            .ok_or_else(|| NodeError::MissingInput("snapshots".to_string()))?;

        let prices: Vec<i64> = snapshots
            .iter()
            .filter_map(|s| s.get("price_cents").and_then(Value::as_i64))
            .collect();

        let trend = match (prices.first(), prices.last()) {
            (Some(&from), Some(&to)) if prices.len() >= 2 && from != 0 => {
                let change_percent = (to - from) as f64 / from as f64 * 100.0;
                let change_percent = (change_percent * 100.0).round() / 100.0;
                let direction = if to > from {
                    "rising"
                } else if to < from {
                    "falling"
                } else {
                    "stable"
                };
                json!({
                    "direction": direction,
                    "change_percent": change_percent,
                    "from_cents": from,
                    "to_cents": to,
                    "samples": prices.len(),
                })
            }
            _ => json!({
                "direction": "stable",
                "change_percent": 0.0,
                "from_cents": prices.first(),
                "to_cents": prices.last(),
                "samples": prices.len(),
            }),
        };

        Ok(FieldMap::new().with("trend", trend))
    }
}

pub struct CompareTimeNodeFactory;

impl NodeFactory for CompareTimeNodeFactory {
    fn node_type(&self) -> &str {
        "compare-time"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(CompareTimeNode)
    }
}

/// Picks the cheapest offer across sites.
///
/// The site-comparison preset renames each site's extracted fields to
/// `price_<i>`, `url_<i>` and `name_<i>`; this node regroups them by suffix.
pub struct CompareSitesNode;

#[async_trait]
impl Node for CompareSitesNode {
    fn node_type(&self) -> &str {
        "compare-sites"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let mut offers: Vec<(i64, Value)> = Vec::new();

        for (key, value) in &input {
            let Some(suffix) = key.strip_prefix("price_") else {
                continue;
            };
            let Some(price_cents) = value.as_i64() else {
                continue;
            };
            let url = input.get_str(&format!("url_{}", suffix)).unwrap_or("");
            let product_name = input.get_str(&format!("name_{}", suffix)).unwrap_or("");
            offers.push((
                price_cents,
                json!({
                    "url": url,
                    "product_name": product_name,
                    "price_cents": price_cents,
                }),
            ));
        }

        if offers.is_empty() {
            return Err(NodeError::MissingInput("price_<i> fields".to_string()));
        }

        offers.sort_by_key(|(price, _)| *price);
        let best = &offers[0].1;
        let best_url = best.get("url").and_then(Value::as_str).unwrap_or("").to_string();
        let best_price_cents = offers[0].0;

        Ok(FieldMap::new()
            .with("best_url", best_url)
            .with("best_price_cents", best_price_cents)
            .with(
                "offers",
                offers.into_iter().map(|(_, o)| o).collect::<Vec<_>>(),
            ))
    }
}

pub struct CompareSitesNodeFactory;

impl NodeFactory for CompareSitesNodeFactory {
    fn node_type(&self) -> &str {
        "compare-sites"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(CompareSitesNode)
    }
}

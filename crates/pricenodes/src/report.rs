use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError, Value};
use priceruntime::NodeFactory;
use std::fmt::Write;

/// Formats whatever analysis fields arrived into a plain-text summary
pub struct ReportNode;

#[async_trait]
impl Node for ReportNode {
    fn node_type(&self) -> &str {
        "report"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let mut formatted = String::from("=== Price Analysis Report ===\n");

        if let Some(name) = input.get_str("product_name") {
            let _ = writeln!(formatted, "Product: {}", name);
        }
        if let Some(price) = input.get_i64("price_cents") {
            let currency = input.get_str("currency").unwrap_or("USD");
            let _ = writeln!(formatted, "Price: {}.{:02} {}", price / 100, price % 100, currency);
        }
        if let Some(score) = input.get_i64("score") {
            let verdict = input.get_str("verdict").unwrap_or("unknown");
            let _ = writeln!(formatted, "Score: {}/100 ({})", score, verdict);
        }
        if let Some(issues) = input.get_array("issues") {
            let _ = writeln!(formatted, "Issues found: {}", issues.len());
            for issue in issues {
                let kind = issue.get("kind").and_then(Value::as_str).unwrap_or("issue");
                let label = issue.get("label").and_then(Value::as_str).unwrap_or("unlabelled");
                match issue.get("amount_cents").and_then(Value::as_i64) {
                    Some(amount) => {
                        let _ = writeln!(
                            formatted,
                            "  - [{}] {} ({}.{:02})",
                            kind,
                            label,
                            amount / 100,
                            amount % 100
                        );
                    }
                    None => {
                        let _ = writeln!(formatted, "  - [{}] {}", kind, label);
                    }
                }
            }
        }
        if let Some(trend) = input.get("trend") {
            let direction = trend.get("direction").and_then(Value::as_str).unwrap_or("unknown");
            let change = trend
                .get("change_percent")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let _ = writeln!(formatted, "Trend: {} ({:+.1}%)", direction, change);
        }
        if let Some(best_url) = input.get_str("best_url") {
            if let Some(best_price) = input.get_i64("best_price_cents") {
                let _ = writeln!(
                    formatted,
                    "Best offer: {}.{:02} at {}",
                    best_price / 100,
                    best_price % 100,
                    best_url
                );
            }
        }

        Ok(FieldMap::new().with("formatted", formatted))
    }
}

pub struct ReportNodeFactory;

impl NodeFactory for ReportNodeFactory {
    fn node_type(&self) -> &str {
        "report"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(ReportNode)
    }
}

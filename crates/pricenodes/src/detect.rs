use crate::extract::parse_cents;
use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError, Value};
use priceruntime::NodeFactory;
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;

fn fee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\$\s*([0-9][0-9,]*)(?:\.([0-9]{2}))?\s*((?:[A-Za-z]+\s+){0,3}?(?:fee|charge|surcharge))")
            .unwrap()
    })
}

/// Scans page text for labelled add-on fees
pub struct DetectFeesNode;

#[async_trait]
impl Node for DetectFeesNode {
    fn node_type(&self) -> &str {
        "detect-fees"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let html = input.require_str("html")?;

        let mut issues: Vec<Value> = Vec::new();
        let mut fee_total_cents = 0i64;

        for captures in fee_re().captures_iter(html) {
            let amount = parse_cents(
                captures.get(1).map(|m| m.as_str()).unwrap_or("0"),
                captures.get(2).map(|m| m.as_str()),
            )
            .unwrap_or(0);
            let label = captures
                .get(3)
                .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();

            fee_total_cents += amount;
            issues.push(json!({
                "kind": "fee",
                "label": label,
                "amount_cents": amount,
            }));
        }

        tracing::debug!(fees = issues.len(), fee_total_cents, "fee scan done");

        Ok(FieldMap::new()
            .with("issues", issues)
            .with("fee_total_cents", fee_total_cents))
    }
}

pub struct DetectFeesNodeFactory;

impl NodeFactory for DetectFeesNodeFactory {
    fn node_type(&self) -> &str {
        "detect-fees"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(DetectFeesNode)
    }
}

fn trap_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(?i)<input[^>]*\bchecked\b", "pre-ticked option"),
            (r"(?i)only\s+\d+\s+left", "scarcity claim"),
            (r"(?i)offer\s+ends|countdown|hurry", "countdown urgency"),
            (r"(?i)auto[- ]renew|automatically\s+renews", "automatic renewal"),
            (r"(?i)free\s+trial[^.<]*then", "trial rollover"),
        ]
        .iter()
        .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
        .collect()
    })
}

/// Flags common checkout dark patterns on a page
pub struct DetectTrapsNode;

#[async_trait]
impl Node for DetectTrapsNode {
    fn node_type(&self) -> &str {
        "detect-traps"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let html = input.require_str("html")?;

        let issues: Vec<Value> = trap_patterns()
            .iter()
            .filter(|(re, _)| re.is_match(html))
            .map(|(_, label)| json!({ "kind": "trap", "label": label }))
            .collect();

        tracing::debug!(traps = issues.len(), "trap scan done");

        Ok(FieldMap::new().with("issues", issues))
    }
}

pub struct DetectTrapsNodeFactory;

impl NodeFactory for DetectTrapsNodeFactory {
    fn node_type(&self) -> &str {
        "detect-traps"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(DetectTrapsNode)
    }
}

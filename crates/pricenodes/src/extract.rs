use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError};
use priceruntime::NodeFactory;
use regex::Regex;
use std::sync::OnceLock;

fn price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*([0-9][0-9,]*)(?:\.([0-9]{2}))?").unwrap())
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap())
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Dollars-and-cents capture groups to an integer cent amount.
///
/// Page text is untrusted; an absurdly large dollar figure yields `None`
/// instead of overflowing.
pub(crate) fn parse_cents(dollars: &str, cents: Option<&str>) -> Option<i64> {
    let whole: i64 = dollars.replace(',', "").parse().ok()?;
    let fraction: i64 = match cents {
        Some(c) => c.parse().ok()?,
        None => 0,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

/// Extracts the product name and listed price from fetched HTML.
///
/// The first dollar amount in document order is taken as the product price;
/// product pages put the headline price ahead of fee fine print.
pub struct ExtractNode;

#[async_trait]
impl Node for ExtractNode {
    fn node_type(&self) -> &str {
        "extract"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let html = input.require_str("html")?;

        let captures = price_re()
            .captures(html)
            .ok_or_else(|| NodeError::ExecutionFailed("no price found on page".to_string()))?;
        let price_cents = parse_cents(
            captures.get(1).map(|m| m.as_str()).unwrap_or("0"),
            captures.get(2).map(|m| m.as_str()),
        )
        .ok_or_else(|| NodeError::ExecutionFailed("unparseable price on page".to_string()))?;

        let product_name = heading_re()
            .captures(html)
            .or_else(|| title_re().captures(html))
            .and_then(|c| c.get(1))
            .map(|m| tag_re().replace_all(m.as_str(), "").trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown product".to_string());

        tracing::debug!(product = %product_name, price_cents, "extracted listing");

        Ok(FieldMap::new()
            .with("product_name", product_name)
            .with("price_cents", price_cents)
            .with("currency", "USD"))
    }
}

pub struct ExtractNodeFactory;

impl NodeFactory for ExtractNodeFactory {
    fn node_type(&self) -> &str {
        "extract"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(ExtractNode)
    }
}

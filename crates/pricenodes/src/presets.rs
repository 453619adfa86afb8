//! Pre-built pipeline graphs for the common use cases

use pricecore::{FieldMapping, Pipeline, PipelineNode};

/// Single-page analysis: fetch -> extract + fee/trap detection -> score -> report.
///
/// Fee and trap issue lists are renamed into `fee_issues` and `trap_issues`
/// on their edges so the score node receives both instead of one shadowing
/// the other.
pub fn page_analysis(url: &str) -> Pipeline {
    let mut pipeline = Pipeline::new();

    pipeline.add_node(PipelineNode::new("fetch", "fetch").with_config("url", url));
    pipeline.add_node(PipelineNode::new("extract", "extract"));
    pipeline.add_node(PipelineNode::new("fees", "detect-fees"));
    pipeline.add_node(PipelineNode::new("traps", "detect-traps"));
    pipeline.add_node(PipelineNode::new("score", "score"));
    pipeline.add_node(PipelineNode::new("report", "report"));

    pipeline.connect("fetch", "extract");
    pipeline.connect("fetch", "fees");
    pipeline.connect("fetch", "traps");
    pipeline.connect_mapped(
        "fees",
        "score",
        vec![
            FieldMapping::new("issues", "fee_issues"),
            FieldMapping::new("fee_total_cents", "fee_total_cents"),
        ],
    );
    pipeline.connect_mapped(
        "traps",
        "score",
        vec![FieldMapping::new("issues", "trap_issues")],
    );
    pipeline.connect("extract", "report");
    pipeline.connect("score", "report");

    pipeline
}

/// Page analysis plus a webhook alert for listings scoring below `min_score`
pub fn page_analysis_with_alert(url: &str, webhook_url: &str, min_score: i64) -> Pipeline {
    let mut pipeline = page_analysis(url);

    pipeline.add_node(
        PipelineNode::new("alert", "alert")
            .with_config("webhook_url", webhook_url)
            .with_config("min_score", min_score),
    );
    pipeline.connect_mapped(
        "score",
        "alert",
        vec![
            FieldMapping::new("score", "score"),
            FieldMapping::new("issues", "issues"),
        ],
    );
    pipeline.connect_mapped("fetch", "alert", vec![FieldMapping::new("url", "url")]);

    pipeline
}

/// Price tracking: capture today's price, then trend over the stored history.
///
/// The empty mapping on `save -> history` carries no fields; it only orders
/// the query after the save so the fresh snapshot is part of the series.
pub fn price_tracking(url: &str, days: i64) -> Pipeline {
    let mut pipeline = Pipeline::new();

    pipeline.add_node(PipelineNode::new("fetch", "fetch").with_config("url", url));
    pipeline.add_node(PipelineNode::new("extract", "extract"));
    pipeline.add_node(PipelineNode::new("save", "save-snapshot"));
    pipeline.add_node(
        PipelineNode::new("history", "query-snapshots")
            .with_config("url", url)
            .with_config("days", days),
    );
    pipeline.add_node(PipelineNode::new("compare", "compare-time"));
    pipeline.add_node(PipelineNode::new("report", "report"));

    pipeline.connect("fetch", "extract");
    pipeline.connect("extract", "save");
    pipeline.connect_mapped("fetch", "save", vec![FieldMapping::new("url", "url")]);
    pipeline.connect_mapped("save", "history", vec![]);
    pipeline.connect("history", "compare");
    pipeline.connect("extract", "report");
    pipeline.connect("compare", "report");

    pipeline
}

/// Cross-site comparison: fetch and extract each url, then pick the
/// cheapest offer. Each site's fields are renamed with a positional suffix
/// so they survive the merge side by side.
pub fn site_comparison(urls: &[&str]) -> Pipeline {
    let mut pipeline = Pipeline::new();

    for (i, url) in urls.iter().enumerate() {
        let fetch_id = format!("fetch_{}", i);
        let extract_id = format!("extract_{}", i);
        pipeline.add_node(PipelineNode::new(&fetch_id, "fetch").with_config("url", *url));
        pipeline.add_node(PipelineNode::new(&extract_id, "extract"));
        pipeline.connect(fetch_id.clone(), extract_id.clone());
    }

    pipeline.add_node(PipelineNode::new("compare", "compare-sites"));
    pipeline.add_node(PipelineNode::new("report", "report"));

    for i in 0..urls.len() {
        pipeline.connect_mapped(
            format!("extract_{}", i),
            "compare",
            vec![
                FieldMapping::new("price_cents", format!("price_{}", i)),
                FieldMapping::new("product_name", format!("name_{}", i)),
            ],
        );
        pipeline.connect_mapped(
            format!("fetch_{}", i),
            "compare",
            vec![FieldMapping::new("url", format!("url_{}", i))],
        );
    }
    pipeline.connect("compare", "report");

    pipeline
}

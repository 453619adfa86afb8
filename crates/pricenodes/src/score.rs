use async_trait::async_trait;
use pricecore::{ExecutionContext, FieldMap, FieldMapExt, Node, NodeError, Value};
use priceruntime::NodeFactory;

/// Combines fee and trap findings into a 0-100 deal score.
///
/// Expects its predecessors' issue lists mapped in as `fee_issues` and
/// `trap_issues` so neither list shadows the other.
pub struct ScoreNode;

#[async_trait]
impl Node for ScoreNode {
    fn node_type(&self) -> &str {
        "score"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let fee_issues = input.get_array("fee_issues").cloned().unwrap_or_default();
        let trap_issues = input.get_array("trap_issues").cloned().unwrap_or_default();

        let mut score = 100i64;
        score -= 10 * fee_issues.len() as i64;
        score -= 15 * trap_issues.len() as i64;
        let score = score.max(0);

        let verdict = if score >= 80 {
            "good"
        } else if score >= 50 {
            "caution"
        } else {
            "avoid"
        };

        let mut issues: Vec<Value> = fee_issues;
        issues.extend(trap_issues);

        tracing::debug!(score, verdict, issues = issues.len(), "scored listing");

        Ok(FieldMap::new()
            .with("score", score)
            .with("verdict", verdict)
            .with("issues", issues))
    }
}

pub struct ScoreNodeFactory;

impl NodeFactory for ScoreNodeFactory {
    fn node_type(&self) -> &str {
        "score"
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new(ScoreNode)
    }
}

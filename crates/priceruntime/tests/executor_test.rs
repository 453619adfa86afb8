use async_trait::async_trait;
use pricecore::{
    ExecutionContext, FieldMap, FieldMapExt, MemoryStorage, NewSnapshot, Node, NodeError,
    Pipeline, PipelineError, PipelineNode, StorageAdapter, ValidationError,
};
use priceruntime::{NodeRegistry, PipelineExecutor};
use std::sync::Arc;

/// Emits its static config as output
struct EmitNode;

#[async_trait]
impl Node for EmitNode {
    fn node_type(&self) -> &str {
        "emit"
    }

    async fn execute(
        &self,
        _input: FieldMap,
        config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        Ok(config.clone())
    }
}

/// Returns its merged input unchanged, exposing what the executor delivered
struct EchoNode;

#[async_trait]
impl Node for EchoNode {
    fn node_type(&self) -> &str {
        "echo"
    }

    async fn execute(
        &self,
        input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        Ok(input)
    }
}

/// Writes one snapshot through the context's storage
struct WriteNode;

#[async_trait]
impl Node for WriteNode {
    fn node_type(&self) -> &str {
        "write"
    }

    async fn execute(
        &self,
        _input: FieldMap,
        config: &FieldMap,
        ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let id = ctx
            .storage
            .save_snapshot(NewSnapshot {
                url: "https://shop.example/widget".to_string(),
                product_name: "Widget".to_string(),
                price_cents: config.get_i64("price_cents").unwrap_or(999),
                currency: "USD".to_string(),
                captured_at: chrono::Utc::now(),
            })
            .await?;
        Ok(FieldMap::new().with("snapshot_id", id))
    }
}

/// Sleeps for a configured number of milliseconds before completing
struct SleepNode;

#[async_trait]
impl Node for SleepNode {
    fn node_type(&self) -> &str {
        "sleep"
    }

    async fn execute(
        &self,
        _input: FieldMap,
        config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        let ms = config.get_i64("ms").unwrap_or(0) as u64;
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        Ok(FieldMap::new().with("slept_ms", ms as i64))
    }
}

struct FailNode;

#[async_trait]
impl Node for FailNode {
    fn node_type(&self) -> &str {
        "fail"
    }

    async fn execute(
        &self,
        _input: FieldMap,
        _config: &FieldMap,
        _ctx: &ExecutionContext,
    ) -> Result<FieldMap, NodeError> {
        Err(NodeError::ExecutionFailed("boom".to_string()))
    }
}

fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register_fn("emit", || Box::new(EmitNode));
    registry.register_fn("echo", || Box::new(EchoNode));
    registry.register_fn("write", || Box::new(WriteNode));
    registry.register_fn("fail", || Box::new(FailNode));
    registry.register_fn("sleep", || Box::new(SleepNode));
    registry
}

fn test_context() -> (ExecutionContext, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (ExecutionContext::new(storage.clone()), storage)
}

#[tokio::test]
async fn diamond_runs_in_deterministic_topological_order() {
    // a -> c, a -> b, both -> d; c is declared before b so c runs first
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("a", "emit"));
    pipeline.add_node(PipelineNode::new("c", "echo"));
    pipeline.add_node(PipelineNode::new("b", "echo"));
    pipeline.add_node(PipelineNode::new("d", "echo"));
    pipeline.connect("a", "c");
    pipeline.connect("a", "b");
    pipeline.connect("c", "d");
    pipeline.connect("b", "d");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    assert_eq!(result.execution_order, vec!["a", "c", "b", "d"]);
    assert_eq!(result.outputs.len(), 4);
}

#[tokio::test]
async fn sourceless_node_receives_empty_input() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("lonely", "echo"));

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    assert!(result.outputs["lonely"].is_empty());
}

#[tokio::test]
async fn unmapped_edges_union_fields_and_later_edge_wins_collisions() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(
        PipelineNode::new("first", "emit")
            .with_config("a", 1)
            .with_config("shared", "from-first"),
    );
    pipeline.add_node(
        PipelineNode::new("second", "emit")
            .with_config("b", 2)
            .with_config("shared", "from-second"),
    );
    pipeline.add_node(PipelineNode::new("sink", "echo"));
    pipeline.connect("first", "sink");
    pipeline.connect("second", "sink");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    let merged = &result.outputs["sink"];
    assert_eq!(merged.get_i64("a"), Some(1));
    assert_eq!(merged.get_i64("b"), Some(2));
    assert_eq!(merged.get_str("shared"), Some("from-second"));
}

#[tokio::test]
async fn collision_winner_follows_edge_declaration_order_not_node_order() {
    // Same nodes, edges declared in the opposite order: now "first" wins.
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("first", "emit").with_config("shared", "from-first"));
    pipeline.add_node(PipelineNode::new("second", "emit").with_config("shared", "from-second"));
    pipeline.add_node(PipelineNode::new("sink", "echo"));
    pipeline.connect("second", "sink");
    pipeline.connect("first", "sink");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    assert_eq!(result.outputs["sink"].get_str("shared"), Some("from-first"));
}

#[tokio::test]
async fn mapping_restricts_and_renames_fields() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(
        PipelineNode::new("src", "emit")
            .with_config("keep", "yes")
            .with_config("drop", "no"),
    );
    pipeline.add_node(PipelineNode::new("sink", "echo"));
    pipeline.connect_mapped(
        "src",
        "sink",
        vec![pricecore::FieldMapping::new("keep", "kept")],
    );

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    let merged = &result.outputs["sink"];
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.get_str("kept"), Some("yes"));
}

#[tokio::test]
async fn cycle_fails_validation_with_zero_side_effects() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("a", "write"));
    pipeline.add_node(PipelineNode::new("b", "echo"));
    pipeline.connect("a", "b");
    pipeline.connect("b", "a");

    let registry = test_registry();
    let (mut ctx, storage) = test_context();
    let err = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::CyclicGraph)
    ));
    assert!(ctx.results.is_empty());
    let snapshots = storage
        .query_snapshots("https://shop.example/widget", None, None)
        .await
        .unwrap();
    assert!(snapshots.is_empty());
}

#[tokio::test]
async fn duplicate_node_id_fails_validation() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("a", "emit"));
    pipeline.add_node(PipelineNode::new("a", "echo"));

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let err = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::DuplicateNodeId(id)) if id == "a"
    ));
}

#[tokio::test]
async fn edge_to_unknown_node_fails_validation() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("a", "emit"));
    pipeline.connect("a", "ghost");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let err = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::UnknownNodeReference { unknown, .. })
            if unknown == "ghost"
    ));
}

#[tokio::test]
async fn unknown_node_type_aborts_mid_run_after_earlier_side_effects() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("writer", "write"));
    pipeline.add_node(PipelineNode::new("mystery", "not-registered"));
    pipeline.connect("writer", "mystery");

    let registry = test_registry();
    let (mut ctx, storage) = test_context();
    let err = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap_err();

    match err {
        PipelineError::UnknownNodeType { node_type, known } => {
            assert_eq!(node_type, "not-registered");
            assert_eq!(known, vec!["echo", "emit", "fail", "sleep", "write"]);
        }
        other => panic!("expected UnknownNodeType, got {:?}", other),
    }

    // The run is discarded, but the earlier node already wrote storage and
    // its output stays in the context until the context is dropped.
    let snapshots = storage
        .query_snapshots("https://shop.example/widget", None, None)
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 1);
    assert!(ctx.results.contains_key("writer"));
}

#[tokio::test]
async fn duration_stamp_spans_the_whole_run() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("nap", "sleep").with_config("ms", 25));
    pipeline.add_node(PipelineNode::new("after", "echo"));
    pipeline.connect("nap", "after");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let result = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap();

    // The sleeping node alone guarantees at least this much wall clock.
    assert!(result.duration_ms >= 20, "duration_ms = {}", result.duration_ms);
    assert_eq!(result.outputs["nap"].get_i64("slept_ms"), Some(25));
}

#[tokio::test]
async fn node_failure_is_wrapped_with_id_and_type() {
    let mut pipeline = Pipeline::new();
    pipeline.add_node(PipelineNode::new("ok", "emit"));
    pipeline.add_node(PipelineNode::new("broken", "fail"));
    pipeline.connect("ok", "broken");

    let registry = test_registry();
    let (mut ctx, _) = test_context();
    let err = PipelineExecutor::new()
        .execute(&pipeline, &registry, &mut ctx)
        .await
        .unwrap_err();

    match err {
        PipelineError::NodeExecution {
            node_id, node_type, ..
        } => {
            assert_eq!(node_id, "broken");
            assert_eq!(node_type, "fail");
        }
        other => panic!("expected NodeExecution, got {:?}", other),
    }
}

#[tokio::test]
async fn registry_introspection_reports_registered_types() {
    let registry = test_registry();
    assert!(registry.has("emit"));
    assert!(!registry.has("fetch"));
    assert_eq!(
        registry.types(),
        vec!["echo", "emit", "fail", "sleep", "write"]
    );

    let err = registry.create("fetch").unwrap_err();
    assert!(matches!(err, PipelineError::UnknownNodeType { .. }));
}

#[test]
fn pipeline_definition_round_trips_through_json() {
    let json = r#"{
        "nodes": [
            {"id": "fetch", "type": "fetch", "config": {"url": "https://shop.example"}},
            {"id": "report", "type": "report"}
        ],
        "edges": [
            {"from": "fetch", "to": "report", "mapping": [{"source": "html", "target": "page"}]}
        ]
    }"#;

    let pipeline: Pipeline = serde_json::from_str(json).unwrap();
    assert_eq!(pipeline.nodes.len(), 2);
    assert_eq!(pipeline.nodes[0].node_type, "fetch");
    assert!(pipeline.nodes[1].config.is_empty());
    let mapping = pipeline.edges[0].mapping.as_ref().unwrap();
    assert_eq!(mapping[0].source, "html");
    assert_eq!(mapping[0].target, "page");

    let serialized = serde_json::to_string(&pipeline).unwrap();
    assert!(serialized.contains(r#""type":"fetch""#));
    assert!(!serialized.contains("node_type"));
}

//! Standard node library
//!
//! The concrete node types registered before any run: page fetching, price
//! extraction, fee and dark-pattern detection, scoring, alerting, snapshot
//! persistence, trend and cross-site comparison, and report formatting.

mod alert;
mod compare;
mod detect;
mod extract;
mod fetch;
pub mod presets;
mod report;
mod score;
mod snapshot;

pub use alert::AlertNode;
pub use compare::{CompareSitesNode, CompareTimeNode};
pub use detect::{DetectFeesNode, DetectTrapsNode};
pub use extract::ExtractNode;
pub use fetch::FetchNode;
pub use report::ReportNode;
pub use score::ScoreNode;
pub use snapshot::{QuerySnapshotsNode, SaveSnapshotNode};

use priceruntime::NodeRegistry;
use std::sync::Arc;

/// Register every standard node with a registry
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register(Arc::new(fetch::FetchNodeFactory));
    registry.register(Arc::new(extract::ExtractNodeFactory));
    registry.register(Arc::new(detect::DetectFeesNodeFactory));
    registry.register(Arc::new(detect::DetectTrapsNodeFactory));
    registry.register(Arc::new(score::ScoreNodeFactory));
    registry.register(Arc::new(alert::AlertNodeFactory));
    registry.register(Arc::new(snapshot::SaveSnapshotNodeFactory));
    registry.register(Arc::new(snapshot::QuerySnapshotsNodeFactory));
    registry.register(Arc::new(compare::CompareTimeNodeFactory));
    registry.register(Arc::new(compare::CompareSitesNodeFactory));
    registry.register(Arc::new(report::ReportNodeFactory));
}

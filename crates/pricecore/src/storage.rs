use crate::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// A persisted price observation for one product page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub url: String,
    pub product_name: String,
    pub price_cents: i64,
    pub currency: String,
    pub captured_at: DateTime<Utc>,
}

/// A snapshot record before the backend assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSnapshot {
    pub url: String,
    pub product_name: String,
    pub price_cents: i64,
    pub currency: String,
    pub captured_at: DateTime<Utc>,
}

/// Persistence contract consumed by the engine's snapshot nodes.
///
/// The executor itself never calls these methods; it only threads the
/// adapter through the execution context. Execution is sequential, so
/// implementations are not required to tolerate concurrent calls.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Persist a snapshot and return its assigned id
    async fn save_snapshot(&self, snapshot: NewSnapshot) -> Result<String, StorageError>;

    /// Snapshots for a url, optionally filtered by product name and capture
    /// window (`captured_at >= now - days`), ordered ascending by capture time
    async fn query_snapshots(
        &self,
        url: &str,
        product_name: Option<&str>,
        days: Option<i64>,
    ) -> Result<Vec<Snapshot>, StorageError>;

    async fn delete_snapshot(&self, id: &str) -> Result<(), StorageError>;
}

/// In-memory adapter for tests and embedding
#[derive(Default)]
pub struct MemoryStorage {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn save_snapshot(&self, snapshot: NewSnapshot) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        snapshots.push(Snapshot {
            id: id.clone(),
            url: snapshot.url,
            product_name: snapshot.product_name,
            price_cents: snapshot.price_cents,
            currency: snapshot.currency,
            captured_at: snapshot.captured_at,
        });
        tracing::debug!(id = %id, "snapshot saved");
        Ok(id)
    }

    async fn query_snapshots(
        &self,
        url: &str,
        product_name: Option<&str>,
        days: Option<i64>,
    ) -> Result<Vec<Snapshot>, StorageError> {
        let cutoff = days.map(|d| Utc::now() - Duration::days(d));
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut matching: Vec<Snapshot> = snapshots
            .iter()
            .filter(|s| s.url == url)
            .filter(|s| product_name.map_or(true, |name| s.product_name == name))
            .filter(|s| cutoff.map_or(true, |c| s.captured_at >= c))
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.captured_at);
        Ok(matching)
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), StorageError> {
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let before = snapshots.len();
        snapshots.retain(|s| s.id != id);
        if snapshots.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

//! Canonical job store access
//!
//! The relational store is the source of truth for jobs; this subsystem only
//! ever reads from it. The [`JobStore`] trait is the full extent of that
//! dependency: resolve one job, with all relation names already joined in.

use crate::models::CanonicalJob;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by the canonical store adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached; retryable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the record could not be decoded
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Read access to canonical jobs.
///
/// A missing job is `Ok(None)`, not an error: the sync worker treats it as a
/// no-op because the job may have been deleted before its event was consumed.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a full job by id, with resolved company/category/skill names.
    async fn get_full_job_by_id(&self, id: &Uuid) -> StoreResult<Option<CanonicalJob>>;
}

/// In-memory store used in tests and as a seed for embedded deployments.
pub struct InMemoryJobStore {
    jobs: Arc<DashMap<Uuid, CanonicalJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Insert or replace a job.
    pub fn put(&self, job: CanonicalJob) {
        self.jobs.insert(job.id, job);
    }

    /// Remove a job, simulating a hard delete in the relational store.
    pub fn remove(&self, id: &Uuid) {
        self.jobs.remove(id);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get_full_job_by_id(&self, id: &Uuid) -> StoreResult<Option<CanonicalJob>> {
        Ok(self.jobs.get(id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryJobStore::new();
        let id = Uuid::new_v4();
        store.put(CanonicalJob::new(id, "Backend Engineer"));

        let job = store.get_full_job_by_id(&id).await.unwrap();
        assert_eq!(job.unwrap().title, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_missing_is_none() {
        let store = InMemoryJobStore::new();
        let job = store.get_full_job_by_id(&Uuid::new_v4()).await.unwrap();
        assert!(job.is_none());
    }
}

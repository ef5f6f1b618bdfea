//! Index sync worker
//!
//! Consumes job events and applies upserts or deletes to the search index.
//! Delivery is at-least-once and may reorder events for the same job, so
//! every handler re-derives the current canonical state instead of trusting
//! the event payload: the write reflecting true database state wins, not the
//! last event processed. That makes redelivery and out-of-order arrival
//! converge without any distributed lock.

use crate::models::JobStatus;
use crate::search::SearchService;
use crate::store::JobStore;
use crate::sync::error::SyncResult;
use crate::sync::events::JobEvent;
use std::sync::Arc;
use uuid::Uuid;

/// Applies job events to the search index.
pub struct SyncWorker {
    store: Arc<dyn JobStore>,
    search: Arc<SearchService>,
}

impl SyncWorker {
    pub fn new(store: Arc<dyn JobStore>, search: Arc<SearchService>) -> Self {
        Self { store, search }
    }

    /// Process one event. Errors propagate so the queue's retry policy
    /// engages; a missing canonical job is a no-op, never an error.
    pub async fn handle_event(&self, event: &JobEvent) -> SyncResult<()> {
        tracing::debug!(
            job_id = %event.job_id(),
            kind = event.kind(),
            "Processing job event"
        );

        match event {
            JobEvent::Created { job_id } | JobEvent::Updated { job_id } => {
                self.refresh_from_canonical(job_id).await
            }
            JobEvent::StatusChanged { job_id, new_status } => {
                if new_status.is_searchable() {
                    self.refresh_from_canonical(job_id).await
                } else {
                    self.search.delete_job(job_id).await?;
                    Ok(())
                }
            }
            JobEvent::Expired { job_id } => {
                self.search.delete_job(job_id).await?;
                Ok(())
            }
        }
    }

    /// Re-read the canonical record and make the index agree with it.
    ///
    /// The current status decides between upsert and delete, so a stale
    /// redelivered `created` after a hide still converges to absence.
    async fn refresh_from_canonical(&self, job_id: &Uuid) -> SyncResult<()> {
        match self.store.get_full_job_by_id(job_id).await? {
            Some(job) if job.status == JobStatus::Active => {
                self.search.upsert_job(&job).await?;
                Ok(())
            }
            Some(job) => {
                tracing::debug!(
                    job_id = %job_id,
                    status = %job.status,
                    "Canonical job not active, removing from index"
                );
                self.search.delete_job(job_id).await?;
                Ok(())
            }
            None => {
                tracing::debug!(job_id = %job_id, "Canonical job missing, event is a no-op");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalJob;
    use crate::search::{SearchConfig, SearchRequest};
    use crate::store::InMemoryJobStore;
    use tempfile::TempDir;

    async fn setup() -> (Arc<InMemoryJobStore>, Arc<SearchService>, SyncWorker, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let search = Arc::new(SearchService::new(config).await.unwrap());
        let store = Arc::new(InMemoryJobStore::new());
        let worker = SyncWorker::new(store.clone(), search.clone());
        (store, search, worker, temp_dir)
    }

    async fn total_for(search: &SearchService, keyword: &str) -> usize {
        search
            .search(&SearchRequest::new().with_keyword(keyword))
            .await
            .unwrap()
            .total
    }

    #[tokio::test]
    async fn test_created_event_indexes_job() {
        let (store, search, worker, _guard) = setup().await;

        let job = CanonicalJob::new(Uuid::new_v4(), "Rust Developer");
        store.put(job.clone());

        worker
            .handle_event(&JobEvent::Created { job_id: job.id })
            .await
            .unwrap();

        assert_eq!(total_for(&search, "rust").await, 1);
    }

    #[tokio::test]
    async fn test_created_event_for_missing_job_is_noop() {
        let (_store, search, worker, _guard) = setup().await;

        worker
            .handle_event(&JobEvent::Created { job_id: Uuid::new_v4() })
            .await
            .unwrap();

        assert_eq!(search.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_status_changed_to_hidden_deletes() {
        let (store, search, worker, _guard) = setup().await;

        let mut job = CanonicalJob::new(Uuid::new_v4(), "QA Engineer");
        store.put(job.clone());
        worker
            .handle_event(&JobEvent::Created { job_id: job.id })
            .await
            .unwrap();
        assert_eq!(total_for(&search, "qa").await, 1);

        job.status = JobStatus::Hidden;
        store.put(job.clone());
        worker
            .handle_event(&JobEvent::StatusChanged {
                job_id: job.id,
                new_status: JobStatus::Hidden,
            })
            .await
            .unwrap();

        assert_eq!(total_for(&search, "qa").await, 0);
    }

    #[tokio::test]
    async fn test_expired_event_deletes_unconditionally() {
        let (store, search, worker, _guard) = setup().await;

        let job = CanonicalJob::new(Uuid::new_v4(), "Data Engineer");
        store.put(job.clone());
        worker
            .handle_event(&JobEvent::Created { job_id: job.id })
            .await
            .unwrap();

        worker
            .handle_event(&JobEvent::Expired { job_id: job.id })
            .await
            .unwrap();

        assert_eq!(total_for(&search, "data").await, 0);
    }

    #[tokio::test]
    async fn test_delete_of_absent_document_is_not_an_error() {
        let (_store, _search, worker, _guard) = setup().await;

        worker
            .handle_event(&JobEvent::Expired { job_id: Uuid::new_v4() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stale_redelivery_converges_to_canonical_state() {
        let (store, search, worker, _guard) = setup().await;

        let mut job = CanonicalJob::new(Uuid::new_v4(), "Frontend Developer");
        store.put(job.clone());
        worker
            .handle_event(&JobEvent::Created { job_id: job.id })
            .await
            .unwrap();

        // Job is hidden in the canonical store, then a stale `created`
        // event is redelivered; the handler re-reads current state
        job.status = JobStatus::Hidden;
        store.put(job.clone());
        worker
            .handle_event(&JobEvent::Created { job_id: job.id })
            .await
            .unwrap();

        assert_eq!(total_for(&search, "frontend").await, 0);
    }
}

//! Main search service implementation

use crate::models::CanonicalJob;
use crate::search::config::SearchConfig;
use crate::search::document::JobDocument;
use crate::search::error::{SearchError, SearchResult};
use crate::search::index::{IndexManager, IndexStats};
use crate::search::projection::project;
use crate::search::query::{QueryBuilder, SearchRequest, SearchSort};
use crate::search::suggest::SuggestionEngine;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tantivy::collector::{Count, TopDocs};
use tantivy::schema::Value;
use tantivy::TantivyDocument;
use uuid::Uuid;

/// A single scored hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHit {
    /// The job document fields, flattened into the hit
    #[serde(flatten)]
    pub document: JobDocument,

    /// Relevance score
    pub score: f32,

    /// Distance from the request's geo center, when one was given
    pub distance_km: Option<f64>,
}

/// Search response with results and pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total matching documents. The geo radius post-filter applies to this
    /// count as well as to the returned page.
    pub total: usize,

    /// Echoed pagination
    pub page: usize,
    pub limit: usize,

    /// The requested page of hits
    pub results: Vec<JobHit>,
}

/// The search engine facade: one explicit handle injected everywhere,
/// never an ambient global.
pub struct SearchService {
    index_manager: Arc<IndexManager>,
    suggestion_engine: SuggestionEngine,
    config: SearchConfig,
}

impl SearchService {
    /// Ensure the index exists and open the service over it.
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        let index_manager = Arc::new(IndexManager::ensure_index(config.clone()).await?);
        let suggestion_engine = SuggestionEngine::new(index_manager.clone(), config.suggest_limit);

        Ok(Self {
            index_manager,
            suggestion_engine,
            config,
        })
    }

    pub fn index_manager(&self) -> &Arc<IndexManager> {
        &self.index_manager
    }

    /// Execute a search request: engine query, geo post-filter, sort, page.
    pub async fn search(&self, request: &SearchRequest) -> SearchResult<SearchResponse> {
        if request.sort == SearchSort::Distance && request.geo.is_none() {
            return Err(SearchError::QueryBuildFailed(
                "distance sort requires a geo center".to_string(),
            ));
        }

        let query_builder = QueryBuilder::new(
            self.index_manager.schema().clone(),
            self.index_manager.index().clone(),
        );
        let query = query_builder.build(request)?;

        let searcher = self.index_manager.reader().searcher();
        let schema = self.index_manager.schema().clone();
        let max_results = self.config.max_results;

        // The engine call runs on the blocking pool under the request timeout
        let handle = tokio::task::spawn_blocking(move || -> SearchResult<(Vec<(f32, JobDocument)>, usize)> {
            let payload_field = schema
                .get_field("payload")
                .map_err(|_| SearchError::SchemaError("payload field missing".to_string()))?;

            let collector = TopDocs::with_limit(max_results);
            let top_docs = searcher
                .search(&*query, &collector)
                .map_err(|e| SearchError::SearchFailed(format!("Search execution failed: {}", e)))?;

            let total = searcher
                .search(&*query, &Count)
                .map_err(|e| SearchError::SearchFailed(format!("Count failed: {}", e)))?;

            let mut candidates = Vec::with_capacity(top_docs.len());
            for (score, doc_address) in top_docs {
                let doc: TantivyDocument = searcher.doc(doc_address).map_err(|e| {
                    SearchError::SearchFailed(format!("Failed to retrieve doc: {}", e))
                })?;
                let payload = doc
                    .get_first(payload_field)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                match serde_json::from_str::<JobDocument>(payload) {
                    Ok(document) => candidates.push((score, document)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping hit with unreadable payload");
                    }
                }
            }

            Ok((candidates, total))
        });

        let timeout = Duration::from_millis(self.config.request_timeout_ms);
        let (candidates, engine_total) = tokio::time::timeout(timeout, handle)
            .await
            .map_err(|_| SearchError::Timeout(self.config.request_timeout_ms))?
            .map_err(|e| SearchError::SearchFailed(format!("Search task failed: {}", e)))??;

        let mut hits: Vec<JobHit> = candidates
            .into_iter()
            .map(|(score, document)| {
                let distance_km = match (request.geo.as_ref(), document.geo.as_ref()) {
                    (Some(center), Some(point)) => Some(point.distance_km(center)),
                    _ => None,
                };
                JobHit {
                    document,
                    score,
                    distance_km,
                }
            })
            .collect();

        // Geo radius is a post-filter: candidates are dropped after scoring,
        // so the relevance order of the remainder is untouched
        let mut total = engine_total;
        if let (Some(_), Some(radius_km)) = (request.geo.as_ref(), request.radius_km) {
            hits.retain(|hit| matches!(hit.distance_km, Some(d) if d <= radius_km));
            total = hits.len();
        }

        Self::sort_hits(&mut hits, request.sort);

        let offset = request.offset();
        let results: Vec<JobHit> = hits
            .into_iter()
            .skip(offset)
            .take(request.limit.max(1))
            .collect();

        tracing::debug!(
            total = total,
            page = request.page,
            returned = results.len(),
            "Search executed"
        );

        Ok(SearchResponse {
            total,
            page: request.page,
            limit: request.limit,
            results,
        })
    }

    fn sort_hits(hits: &mut [JobHit], sort: SearchSort) {
        match sort {
            SearchSort::Newest => {
                hits.sort_by(|a, b| b.document.created_at.cmp(&a.document.created_at));
            }
            SearchSort::SalaryDesc => {
                hits.sort_by(|a, b| {
                    cmp_f64_desc(a.document.salary_max, b.document.salary_max)
                });
            }
            SearchSort::SalaryAsc => {
                hits.sort_by(|a, b| cmp_f64_asc(a.document.salary_min, b.document.salary_min));
            }
            SearchSort::DeadlineAsc => {
                hits.sort_by(|a, b| {
                    match (a.document.deadline, b.document.deadline) {
                        (Some(da), Some(db)) => da
                            .cmp(&db)
                            .then_with(|| b.document.created_at.cmp(&a.document.created_at)),
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => b.document.created_at.cmp(&a.document.created_at),
                    }
                });
            }
            SearchSort::Distance => {
                hits.sort_by(|a, b| cmp_f64_asc(a.distance_km, b.distance_km));
            }
        }
    }

    /// Completion suggestions for a text prefix, at most `suggest_limit`.
    pub async fn suggest(&self, prefix: &str) -> SearchResult<Vec<String>> {
        self.suggestion_engine.suggest(prefix)
    }

    /// Project and upsert a single canonical job. A job whose status is not
    /// searchable is removed instead, so the index never holds hidden jobs.
    pub async fn upsert_job(&self, job: &CanonicalJob) -> SearchResult<()> {
        if !job.status.is_searchable() {
            return self.delete_job(&job.id).await;
        }
        let document = project(job);
        self.index_manager.upsert_document(&document).await
    }

    /// Project and upsert a batch under a single commit. Non-searchable jobs
    /// are dropped from the batch.
    pub async fn upsert_jobs(&self, jobs: &[CanonicalJob]) -> SearchResult<usize> {
        let documents: Vec<JobDocument> = jobs
            .iter()
            .filter(|job| job.status.is_searchable())
            .map(project)
            .collect();
        self.index_manager.upsert_documents(&documents).await
    }

    /// Remove a job from the index. Idempotent.
    pub async fn delete_job(&self, id: &Uuid) -> SearchResult<()> {
        self.index_manager.delete_document(&id.to_string()).await
    }

    /// Rebuild the index from a full canonical snapshot. The operator-run
    /// reconciliation path; safe against a live index.
    pub async fn rebuild(&self, jobs: &[CanonicalJob]) -> SearchResult<usize> {
        self.index_manager.clear_index().await?;
        let searchable: Vec<CanonicalJob> = jobs
            .iter()
            .filter(|job| job.status.is_searchable())
            .cloned()
            .collect();
        let indexed = self.upsert_jobs(&searchable).await?;
        tracing::info!(indexed = indexed, skipped = jobs.len() - searchable.len(), "Index rebuilt");
        Ok(indexed)
    }

    pub async fn stats(&self) -> SearchResult<IndexStats> {
        self.index_manager.get_stats().await
    }

    pub async fn commit(&self) -> SearchResult<()> {
        self.index_manager.commit().await
    }

    pub async fn clear_index(&self) -> SearchResult<()> {
        self.index_manager.clear_index().await
    }
}

fn cmp_f64_asc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_f64_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

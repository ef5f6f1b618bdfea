//! Search index lifecycle management

use crate::search::analysis::register_tokenizers;
use crate::search::config::SearchConfig;
use crate::search::document::{build_job_schema, JobDocument, SearchDocument};
use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::Count;
use tantivy::schema::Schema;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};
use tokio::sync::RwLock;

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Index size in bytes
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,
}

/// Manages the Tantivy index holding job documents.
///
/// Construction is the `ensure_index` operation: idempotent open-or-create
/// with the job schema and tokenizer chain in place. Safe to run repeatedly,
/// including against a live index.
pub struct IndexManager {
    /// The Tantivy index
    index: Index,

    /// The schema
    schema: Schema,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader
    reader: IndexReader,

    /// Configuration
    config: SearchConfig,
}

impl IndexManager {
    /// Idempotently ensure the index exists and open handles to it.
    pub async fn ensure_index(config: SearchConfig) -> SearchResult<Self> {
        // Tantivy rejects writer heaps under 3MB; fail with context instead
        if config.writer_heap_size < 3_000_000 {
            return Err(SearchError::InvalidConfiguration(format!(
                "writer_heap_size {} is below the 3MB minimum",
                config.writer_heap_size
            )));
        }

        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            SearchError::IndexInitFailed(format!("Failed to create index directory: {}", e))
        })?;

        let schema = build_job_schema();

        let index = if Self::index_exists(&config.index_path) {
            Index::open_in_dir(&config.index_path).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to open existing index: {}", e))
            })?
        } else {
            Index::create_in_dir(&config.index_path, schema.clone()).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to create new index: {}", e))
            })?
        };

        // Tokenizers are process state, not index state; register on every open
        register_tokenizers(&index);

        let writer = index
            .writer(config.writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(if config.realtime_indexing {
                ReloadPolicy::OnCommitWithDelay
            } else {
                ReloadPolicy::Manual
            })
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        tracing::info!(
            index_path = %config.index_path.display(),
            "Search index ready"
        );

        Ok(Self {
            index,
            schema,
            writer: Arc::new(RwLock::new(writer)),
            reader,
            config,
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    /// Create-or-replace a job document, keyed by its id term.
    pub async fn upsert_document(&self, document: &JobDocument) -> SearchResult<()> {
        let tantivy_doc = document.to_tantivy_doc(&self.schema);

        let mut writer = self.writer.write().await;

        if let Ok(id_field) = self.schema.get_field("id") {
            let term = tantivy::Term::from_field_text(id_field, &document.document_id());
            writer.delete_term(term);
        }

        writer
            .add_document(tantivy_doc)
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to add document: {}", e)))?;

        if self.config.realtime_indexing {
            writer.commit().map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to commit document: {}", e))
            })?;
            self.reload_reader()?;
        }

        tracing::debug!(job_id = %document.id, "Job document upserted");
        Ok(())
    }

    /// Upsert a batch of documents under a single commit.
    pub async fn upsert_documents(&self, documents: &[JobDocument]) -> SearchResult<usize> {
        let mut writer = self.writer.write().await;
        let mut indexed = 0;

        for document in documents {
            let tantivy_doc = document.to_tantivy_doc(&self.schema);

            if let Ok(id_field) = self.schema.get_field("id") {
                let term = tantivy::Term::from_field_text(id_field, &document.document_id());
                writer.delete_term(term);
            }

            writer.add_document(tantivy_doc).map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to add document {}: {}", indexed, e))
            })?;

            indexed += 1;
        }

        writer
            .commit()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit batch: {}", e)))?;
        self.reload_reader()?;

        Ok(indexed)
    }

    /// Delete a document by job id. Deleting a missing document is a no-op.
    pub async fn delete_document(&self, document_id: &str) -> SearchResult<()> {
        let mut writer = self.writer.write().await;

        if let Ok(id_field) = self.schema.get_field("id") {
            let term = tantivy::Term::from_field_text(id_field, document_id);
            writer.delete_term(term);

            if self.config.realtime_indexing {
                writer.commit().map_err(|e| {
                    SearchError::DeletionFailed(format!("Failed to commit deletion: {}", e))
                })?;
                self.reload_reader()?;
            }
        }

        tracing::debug!(job_id = %document_id, "Job document deleted");
        Ok(())
    }

    /// Block until the reader sees the last commit. Commits become
    /// searchable immediately instead of after the watcher's delay.
    fn reload_reader(&self) -> SearchResult<()> {
        self.reader
            .reload()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to reload reader: {}", e)))
    }

    /// Commit pending changes
    pub async fn commit(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer
            .commit()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit: {}", e)))?;
        self.reload_reader()?;
        Ok(())
    }

    /// Clear the entire index
    pub async fn clear_index(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer
            .delete_all_documents()
            .map_err(|e| SearchError::DeletionFailed(format!("Failed to clear index: {}", e)))?;
        writer
            .commit()
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit clear: {}", e)))?;
        self.reload_reader()?;
        Ok(())
    }

    /// Get index statistics
    pub async fn get_stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        let total_documents = searcher
            .search(&tantivy::query::AllQuery, &Count)
            .map_err(|e| SearchError::SearchFailed(format!("Failed to count documents: {}", e)))?
            as u64;

        let num_segments = searcher.segment_readers().len();

        let index_size_bytes = std::fs::read_dir(&self.config.index_path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents,
            index_size_bytes,
            num_segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_index_creates() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let manager = IndexManager::ensure_index(config).await;
        assert!(manager.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_index_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let first = IndexManager::ensure_index(config.clone()).await.unwrap();
        drop(first);
        let second = IndexManager::ensure_index(config).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_tiny_writer_heap_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            writer_heap_size: 1024,
            ..Default::default()
        };

        let result = IndexManager::ensure_index(config).await;
        assert!(matches!(result.err(), Some(SearchError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_empty_index_stats() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let manager = IndexManager::ensure_index(config).await.unwrap();
        let stats = manager.get_stats().await.unwrap();
        assert_eq!(stats.total_documents, 0);
    }
}

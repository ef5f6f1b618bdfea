//! Search indexing and query pipeline for the jobboard platform.
//!
//! The crate embeds a tantivy index and keeps it eventually consistent with
//! the canonical job store through an asynchronous event pipeline:
//!
//! - [`models`] holds the canonical job representation and its tolerant
//!   deserialization rules.
//! - [`store`] is the read-only seam to the canonical system of record.
//! - [`search`] owns the index schema, text analysis, query construction,
//!   geo post-filtering and the suggestion engine.
//! - [`sync`] delivers job mutation events to the index with bounded retry
//!   and dead-lettering.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use jobboard_search::{Config, InMemoryJobStore, SearchService, SyncWorker};
//!
//! # async fn wire() -> jobboard_search::error::Result<()> {
//! let config = Config::load().map_err(jobboard_search::error::AppError::from)?;
//! let store = Arc::new(InMemoryJobStore::new());
//! let search = Arc::new(SearchService::new(config.search).await?);
//! let worker = SyncWorker::new(store, search.clone());
//! # let _ = worker;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{CanonicalJob, JobStatus};
pub use search::{
    GeoPoint, IndexStats, JobHit, SearchConfig, SearchConfigBuilder, SearchRequest,
    SearchResponse, SearchService, SearchSort, SuggestionEngine,
};
pub use store::{InMemoryJobStore, JobStore};
pub use sync::{
    BackoffStrategy, DeadLetter, EventEnvelope, EventPublisher, InMemoryEventQueue, JobEvent,
    RetryPolicy, SyncWorker,
};

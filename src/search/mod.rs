//! Full-text job search powered by Tantivy
//!
//! This module owns the derived search side of the job board:
//!
//! - **Projection**: pure canonical-job -> search-document transformation
//! - **Index management**: idempotent schema/tokenizer bootstrap, upserts,
//!   idempotent deletes
//! - **Query building**: relevance-boosted keyword clauses, exact filters,
//!   interval-overlap salary ranges, geo radius post-filtering
//! - **Completion**: prefix suggestions from the suggest term dictionary
//!
//! The index is derived state. Every document in it is rebuildable from the
//! canonical store, and nothing here is ever the source of truth.
//!
//! # Example
//!
//! ```no_run
//! use jobboard_search::models::CanonicalJob;
//! use jobboard_search::search::{SearchConfig, SearchRequest, SearchService};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SearchService::new(SearchConfig::default()).await?;
//!
//!     let job = CanonicalJob::new(Uuid::new_v4(), "Senior Backend Engineer");
//!     service.upsert_job(&job).await?;
//!
//!     let request = SearchRequest::new()
//!         .with_keyword("backend")
//!         .with_limit(20);
//!     let response = service.search(&request).await?;
//!     println!("Found {} jobs", response.total);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
mod config;
mod document;
mod error;
mod geo;
mod index;
mod projection;
mod query;
mod suggest;
mod service;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{build_job_schema, JobDocument, SearchDocument};
pub use error::{SearchError, SearchResult};
pub use geo::GeoPoint;
pub use index::{IndexManager, IndexStats};
pub use projection::project;
pub use query::{QueryBuilder, SearchRequest, SearchSort};
pub use suggest::SuggestionEngine;
pub use service::{JobHit, SearchResponse, SearchService};

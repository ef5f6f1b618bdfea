//! Asynchronous index synchronization
//!
//! Job mutations reach the search index through an event pipeline:
//!
//! ```text
//! relational mutation -> JobEvent -> queue -> SyncWorker
//!                                               |
//!                     canonical re-read <-------+
//!                                               |
//!                                 upsert/delete v index
//! ```
//!
//! Indexing is an eventually-consistent side effect. Nothing in this module
//! may ever roll back a canonical write; a failed event retries with backoff
//! and eventually dead-letters, never blocks the write path.

pub mod error;
pub mod events;
pub mod queue;
pub mod worker;

pub use error::{SyncError, SyncResult};
pub use events::{EventEnvelope, JobEvent};
pub use queue::{BackoffStrategy, DeadLetter, EventPublisher, InMemoryEventQueue, RetryPolicy};
pub use worker::SyncWorker;

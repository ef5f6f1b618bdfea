//! In-process event queue with bounded retry and dead-lettering
//!
//! The production broker is an external collaborator; this crate only
//! requires at-least-once delivery, bounded retry with backoff, and a dead
//! letter for exhausted events. [`InMemoryEventQueue`] provides exactly that
//! contract in-process, for tests and embedded deployments, with the retry
//! policy injected rather than hard-coded.

use crate::sync::error::{SyncError, SyncResult};
use crate::sync::events::{EventEnvelope, JobEvent};
use crate::sync::worker::SyncWorker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::sleep;

/// Backoff curve between delivery attempts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackoffStrategy {
    Fixed,
    Linear,
    Exponential,
}

/// Injected retry policy: attempts bound plus backoff curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total delivery attempts before dead-lettering
    pub max_attempts: u32,

    /// Backoff curve between attempts
    pub backoff: BackoffStrategy,

    /// Base delay in milliseconds
    pub base_delay_ms: u64,

    /// Upper bound on any single delay
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffStrategy::Exponential,
            base_delay_ms: 500,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (attempt is 0-based: the first retry
    /// waits `delay_for(0)`).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = match self.backoff {
            BackoffStrategy::Fixed => self.base_delay_ms,
            BackoffStrategy::Linear => self.base_delay_ms.saturating_mul(attempt as u64 + 1),
            BackoffStrategy::Exponential => self
                .base_delay_ms
                .saturating_mul(2_u64.saturating_pow(attempt)),
        };
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// A terminally-failed event, held for operator inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    pub envelope: EventEnvelope<JobEvent>,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Producer-side contract: one enqueued event per state-relevant mutation.
/// Duplicate enqueues are tolerated; processing is idempotent.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: JobEvent) -> SyncResult<()>;
}

/// In-process queue delivering events to a [`SyncWorker`] with bounded
/// retries. Events for different job ids may be processed by independent
/// consumers; no ordering is guaranteed across ids and only best-effort
/// ordering within one.
pub struct InMemoryEventQueue {
    tx: mpsc::UnboundedSender<EventEnvelope<JobEvent>>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<EventEnvelope<JobEvent>>>>,
    policy: RetryPolicy,
    dead_letters: Arc<RwLock<Vec<DeadLetter>>>,
}

impl InMemoryEventQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            policy,
            dead_letters: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Terminally-failed events, oldest first.
    pub async fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.read().await.clone()
    }

    /// Consume events until the channel closes. Intended to run as a
    /// long-lived task; multiple calls are not supported (the receiver is
    /// taken by the first caller).
    pub async fn run(&self, worker: Arc<SyncWorker>) -> SyncResult<()> {
        let mut rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| SyncError::Queue("consumer already running".to_string()))?;

        while let Some(envelope) = rx.recv().await {
            self.deliver(envelope, &worker).await;
        }
        Ok(())
    }

    /// Drain everything currently queued. Test and shutdown helper; the
    /// same delivery path as [`run`], without parking on the channel.
    pub async fn process_pending(&self, worker: &SyncWorker) -> SyncResult<usize> {
        let mut guard = self.rx.lock().await;
        let rx = guard
            .as_mut()
            .ok_or_else(|| SyncError::Queue("consumer already running".to_string()))?;

        let mut processed = 0;
        while let Ok(envelope) = rx.try_recv() {
            self.deliver(envelope, worker).await;
            processed += 1;
        }
        Ok(processed)
    }

    /// Deliver one envelope with bounded retries, then dead-letter.
    async fn deliver(&self, mut envelope: EventEnvelope<JobEvent>, worker: &SyncWorker) {
        loop {
            envelope.attempt += 1;

            match worker.handle_event(&envelope.payload).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(
                        event_id = %envelope.event_id,
                        job_id = %envelope.payload.job_id(),
                        kind = envelope.payload.kind(),
                        attempt = envelope.attempt,
                        error = %e,
                        "Event delivery attempt failed"
                    );

                    let exhausted = envelope.attempt >= self.policy.max_attempts;
                    if exhausted || !e.is_retryable() {
                        tracing::error!(
                            event_id = %envelope.event_id,
                            job_id = %envelope.payload.job_id(),
                            attempts = envelope.attempt,
                            "Event moved to dead letter"
                        );
                        self.dead_letters.write().await.push(DeadLetter {
                            envelope,
                            error: e.to_string(),
                            failed_at: Utc::now(),
                        });
                        return;
                    }

                    sleep(self.policy.delay_for(envelope.attempt - 1)).await;
                }
            }
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventQueue {
    async fn publish(&self, event: JobEvent) -> SyncResult<()> {
        self.tx
            .send(EventEnvelope::new(event))
            .map_err(|e| SyncError::Queue(format!("enqueue failed: {}", e)))
    }
}

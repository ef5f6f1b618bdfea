//! Job lifecycle events carried through the queue

use crate::models::JobStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job mutation the index must react to.
///
/// Events carry identity and intent only; the worker always re-reads the
/// canonical record, so the payload never needs to carry job fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// Job created
    Created { job_id: Uuid },

    /// Job fields updated
    Updated { job_id: Uuid },

    /// Lifecycle status changed
    StatusChanged { job_id: Uuid, new_status: JobStatus },

    /// Job expired
    Expired { job_id: Uuid },
}

impl JobEvent {
    /// Get the job ID from any event
    pub fn job_id(&self) -> Uuid {
        match self {
            JobEvent::Created { job_id }
            | JobEvent::Updated { job_id }
            | JobEvent::StatusChanged { job_id, .. }
            | JobEvent::Expired { job_id } => *job_id,
        }
    }

    /// Get the event kind as a string
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::Created { .. } => "created",
            JobEvent::Updated { .. } => "updated",
            JobEvent::StatusChanged { .. } => "status_changed",
            JobEvent::Expired { .. } => "expired",
        }
    }
}

/// Envelope wrapping an event with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Unique event ID
    pub event_id: Uuid,

    /// When the mutation occurred
    pub occurred_at: DateTime<Utc>,

    /// Delivery attempts made so far
    pub attempt: u32,

    /// The event payload
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            attempt: 0,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_job_id() {
        let id = Uuid::new_v4();
        let event = JobEvent::StatusChanged {
            job_id: id,
            new_status: JobStatus::Hidden,
        };
        assert_eq!(event.job_id(), id);
        assert_eq!(event.kind(), "status_changed");
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = JobEvent::Expired { job_id: Uuid::new_v4() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"expired""#));

        let back: JobEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_envelope_starts_at_attempt_zero() {
        let envelope = EventEnvelope::new(JobEvent::Created { job_id: Uuid::new_v4() });
        assert_eq!(envelope.attempt, 0);
    }
}

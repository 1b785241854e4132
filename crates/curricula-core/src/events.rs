//! Audit events.
//!
//! The engine overwrites subjects in place and keeps no history of its own.
//! Each applied mutation can instead be appended to an external, append-only
//! event log; nothing is ever updated or deleted there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mutation::Mutation;

/// One applied mutation as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEvent {
  pub event_id:    Uuid,
  pub student_id:  Uuid,
  pub mutation:    Mutation,
  /// Human-readable summary, the same text sent to the notification sink.
  pub summary:     String,
  /// `false` if the mutation was only applied locally.
  pub synced:      bool,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::PlanStore::append_event`].
/// `event_id` and `recorded_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewPlanEvent {
  pub student_id: Uuid,
  pub mutation:   Mutation,
  pub summary:    String,
  pub synced:     bool,
}

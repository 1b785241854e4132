//! The `PlanStore` trait: the persistence adapter the engine talks to.
//!
//! The trait is implemented by storage backends (e.g.
//! `curricula-store-sqlite`). The service layer depends on this abstraction,
//! not on any concrete backend, and decides what an adapter failure means
//! (see `SyncPolicy` in `curricula-service`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  events::{NewPlanEvent, PlanEvent},
  plan::CurricularPlan,
  subject::{Subject, SubjectDraft},
};

/// A subject row as created by [`PlanStore::create_subject_record`].
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSubject {
  pub record_id:  Uuid,
  pub student_id: Uuid,
  pub semester:   u32,
  pub subject:    Subject,
}

/// Abstraction over a plan persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PlanStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// Load the stored plan for `student_id`. Returns `None` if the student has
  /// never had a plan saved.
  fn load_plan(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Option<CurricularPlan>, Self::Error>> + Send + '_;

  /// Replace the stored plan for `student_id` with `plan`.
  ///
  /// Returns the plan as persisted: subjects that had no record id, or only a
  /// locally generated one, come back with a store-assigned
  /// [`RecordId::Synced`](crate::subject::RecordId::Synced) id.
  fn save_plan<'a>(
    &'a self,
    student_id: Uuid,
    plan: &'a CurricularPlan,
  ) -> impl Future<Output = Result<CurricularPlan, Self::Error>> + Send + 'a;

  /// Persist a single new subject at the end of semester `semester`.
  ///
  /// The semester row must already exist.
  fn create_subject_record<'a>(
    &'a self,
    student_id: Uuid,
    semester: u32,
    draft: &'a SubjectDraft,
  ) -> impl Future<Output = Result<PersistedSubject, Self::Error>> + Send + 'a;

  // ── Audit log: append-only ──────────────────────────────────────────

  /// Record an applied mutation. The id and timestamp are set by the store.
  fn append_event(
    &self,
    event: NewPlanEvent,
  ) -> impl Future<Output = Result<PlanEvent, Self::Error>> + Send + '_;

  /// All events for `student_id`, oldest first.
  fn list_events(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PlanEvent>, Self::Error>> + Send + '_;
}

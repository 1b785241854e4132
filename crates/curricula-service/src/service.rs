//! [`PlanService`]: serialized, persisted access to students' plans.
//!
//! The core engine is pure; this layer adds what a multi-client server needs
//! around it:
//!
//! - one async mutex per student, so mutations on the same plan never
//!   interleave while different students proceed in parallel;
//! - loading and saving through a [`PlanStore`], with adapter failures
//!   handled according to the configured [`SyncPolicy`];
//! - an audit event and a notification for every applied mutation.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use curricula_core::{
  events::{NewPlanEvent, PlanEvent},
  identity::{IdSource, TimestampIds},
  mutation::{self, Applied, Effect, Mutation},
  notify::{Notification, NotificationSink},
  plan::CurricularPlan,
  prerequisites::{self, PrerequisiteIssue},
  progress::{self, ProgressSummary},
  store::PlanStore,
  subject::{RecordId, SubjectCode},
};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  ServiceError,
  error::Result,
  etag::{compute_etag, etag_matches},
  policy::SyncPolicy,
  sink::TracingSink,
};

// ─── Views ───────────────────────────────────────────────────────────────────

/// A consistent read of one student's plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSnapshot {
  pub plan:     CurricularPlan,
  pub progress: ProgressSummary,
  /// `false` while local changes are waiting for a successful save.
  pub synced:   bool,
  pub etag:     String,
}

impl PlanSnapshot {
  fn of(plan: CurricularPlan, synced: bool) -> Result<Self> {
    let progress = progress::compute(&plan);
    let etag = compute_etag(&plan)?;
    Ok(Self { plan, progress, synced, etag })
  }
}

/// The result of [`PlanService::mutate`].
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
  pub effect:   Effect,
  pub message:  String,
  #[serde(flatten)]
  pub snapshot: PlanSnapshot,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// The in-memory working copy of one student's plan.
#[derive(Default)]
struct PlanSlot {
  /// `None` until first loaded from the store.
  plan:  Option<CurricularPlan>,
  /// Local changes not yet saved.
  dirty: bool,
}

pub struct PlanService<S> {
  store:  S,
  policy: SyncPolicy,
  sink:   Arc<dyn NotificationSink>,
  ids:    Arc<dyn IdSource>,
  /// Every student touched since startup keeps a slot and its cached plan for
  /// the life of the process. Slots are never evicted: a dirty slot holds the
  /// only copy of unsynced changes, and plans are small.
  slots:  Mutex<HashMap<Uuid, Arc<AsyncMutex<PlanSlot>>>>,
}

impl<S: PlanStore> PlanService<S> {
  /// A service that logs notifications through `tracing` and mints
  /// timestamp-based fallback ids.
  pub fn new(store: S, policy: SyncPolicy) -> Self {
    Self {
      store,
      policy,
      sink: Arc::new(TracingSink),
      ids: Arc::new(TimestampIds::default()),
      slots: Mutex::new(HashMap::new()),
    }
  }

  pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
    self.sink = sink;
    self
  }

  pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
    self.ids = ids;
    self
  }

  pub fn policy(&self) -> SyncPolicy { self.policy }

  pub fn store(&self) -> &S { &self.store }

  // ── Slots ─────────────────────────────────────────────────────────────

  fn slot(&self, student_id: Uuid) -> Arc<AsyncMutex<PlanSlot>> {
    // A poisoned map is still structurally sound; keep serving.
    let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
    slots.entry(student_id).or_default().clone()
  }

  /// Return the slot's plan, loading it from the store on first use.
  ///
  /// Load failures are always errors: without a local copy there is nothing
  /// to fall back on, and starting from an empty plan would overwrite the
  /// stored one on the next save.
  async fn loaded<'a>(
    &self,
    student_id: Uuid,
    slot: &'a mut PlanSlot,
  ) -> Result<&'a CurricularPlan> {
    if slot.plan.is_none() {
      let stored = self
        .store
        .load_plan(student_id)
        .await
        .map_err(|e| ServiceError::Store { operation: "load_plan", source: Box::new(e) })?;
      debug!(%student_id, found = stored.is_some(), "loaded plan");
      slot.plan = Some(stored.unwrap_or_else(|| CurricularPlan::new(student_id)));
      slot.dirty = false;
    }
    Ok(slot.plan.get_or_insert_with(|| CurricularPlan::new(student_id)))
  }

  /// Apply the sync policy to an adapter failure.
  fn adapter_failure<E>(&self, student_id: Uuid, operation: &'static str, err: E) -> Result<()>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match self.policy {
      SyncPolicy::Strict => Err(ServiceError::Sync { operation, source: Box::new(err) }),
      SyncPolicy::Eventual => {
        warn!(%student_id, operation, error = %err, "persistence failed; continuing with local plan");
        Ok(())
      }
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn snapshot(&self, student_id: Uuid) -> Result<PlanSnapshot> {
    let slot = self.slot(student_id);
    let mut slot = slot.lock().await;
    let plan = self.loaded(student_id, &mut slot).await?.clone();
    PlanSnapshot::of(plan, !slot.dirty)
  }

  pub async fn progress(&self, student_id: Uuid) -> Result<ProgressSummary> {
    Ok(self.snapshot(student_id).await?.progress)
  }

  /// Run the opt-in prerequisite check over the current plan.
  pub async fn prerequisite_issues(&self, student_id: Uuid) -> Result<Vec<PrerequisiteIssue>> {
    let snapshot = self.snapshot(student_id).await?;
    Ok(prerequisites::validate(&snapshot.plan))
  }

  pub async fn events(&self, student_id: Uuid) -> Result<Vec<PlanEvent>> {
    self
      .store
      .list_events(student_id)
      .await
      .map_err(|e| ServiceError::Store { operation: "list_events", source: Box::new(e) })
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Apply `mutation` to the student's plan and persist it.
  ///
  /// When `if_match` is given, the mutation only proceeds if it matches the
  /// current plan's ETag. On any error the working plan is left as it was.
  pub async fn mutate(
    &self,
    student_id: Uuid,
    mutation: Mutation,
    if_match: Option<&str>,
  ) -> Result<MutationOutcome> {
    let slot = self.slot(student_id);
    let mut slot = slot.lock().await;
    let current = self.loaded(student_id, &mut slot).await?;

    if let Some(expected) = if_match
      && !etag_matches(&compute_etag(current)?, expected)
    {
      return Err(ServiceError::PreconditionFailed(student_id));
    }

    let Applied { mut plan, effect } = mutation::apply(current, &mutation)?;

    if !effect.changes_plan() {
      debug!(%student_id, op = mutation.kind(), "mutation left plan unchanged");
      let message = effect.to_string();
      let snapshot = PlanSnapshot::of(plan, !slot.dirty)?;
      return Ok(MutationOutcome { effect, message, snapshot });
    }

    let mut needs_save = true;
    if let (Mutation::AddSubject { semester, draft }, Effect::SubjectAdded { code, .. }) =
      (&mutation, &effect)
    {
      // A dirty slot means the stored plan is behind, and its semester
      // numbers may not match ours. Only the full save below may write it.
      let record_id = if slot.dirty {
        RecordId::Local(self.ids.next_local_id())
      } else {
        match self
          .store
          .create_subject_record(student_id, *semester, draft)
          .await
        {
          Ok(persisted) => {
            // The store appended the row where the engine appended the
            // subject, so no full save is needed.
            needs_save = false;
            RecordId::Synced(persisted.record_id)
          }
          Err(e) => {
            self.adapter_failure(student_id, "create_subject_record", e)?;
            RecordId::Local(self.ids.next_local_id())
          }
        }
      };
      set_record_id(&mut plan, code, record_id);
    }

    let mut synced = true;
    if needs_save {
      match self.store.save_plan(student_id, &plan).await {
        Ok(saved) => plan = saved,
        Err(e) => {
          self.adapter_failure(student_id, "save_plan", e)?;
          synced = false;
        }
      }
    }

    slot.plan = Some(plan.clone());
    slot.dirty = !synced;

    let message = effect.to_string();
    info!(%student_id, op = mutation.kind(), synced, "{message}");

    if let Err(e) = self
      .store
      .append_event(NewPlanEvent {
        student_id,
        mutation,
        summary: message.clone(),
        synced,
      })
      .await
    {
      warn!(%student_id, error = %e, "could not record audit event");
    }

    self.sink.notify(&Notification {
      student_id,
      effect: effect.clone(),
      message: message.clone(),
      synced,
    });

    let snapshot = PlanSnapshot::of(plan, synced)?;
    Ok(MutationOutcome { effect, message, snapshot })
  }

  /// Save a plan that has local-only changes. Returns `true` if anything was
  /// written. Failures are reported regardless of the sync policy.
  pub async fn sync(&self, student_id: Uuid) -> Result<bool> {
    let slot = self.slot(student_id);
    let mut slot = slot.lock().await;
    if !slot.dirty {
      return Ok(false);
    }
    let plan = self.loaded(student_id, &mut slot).await?.clone();
    let saved = self
      .store
      .save_plan(student_id, &plan)
      .await
      .map_err(|e| ServiceError::Sync { operation: "save_plan", source: Box::new(e) })?;
    info!(%student_id, "local changes synced");
    slot.plan = Some(saved);
    slot.dirty = false;
    Ok(true)
  }
}

fn set_record_id(plan: &mut CurricularPlan, code: &SubjectCode, record_id: RecordId) {
  if let Some(subject) = plan.subjects_mut().find(|s| &s.code == code) {
    subject.record_id = Some(record_id);
  }
}

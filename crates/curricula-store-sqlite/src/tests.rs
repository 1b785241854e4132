//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use curricula_core::{
  events::NewPlanEvent,
  mutation::{Mutation, apply},
  plan::CurricularPlan,
  semester::SemesterDraft,
  store::PlanStore,
  subject::{RecordId, SubjectDraft, SubjectState},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn run(plan: CurricularPlan, m: Mutation) -> CurricularPlan { apply(&plan, &m).unwrap().plan }

fn approved(code: &str, credits: i64, grade: f64) -> SubjectDraft {
  let mut draft = SubjectDraft::new(code, "Asignatura aprobada", credits);
  draft.state = SubjectState::Approved;
  draft.grade = Some(grade);
  draft
}

/// Three semesters, four subjects, one with prerequisites and dates.
fn sample_plan(student_id: Uuid) -> CurricularPlan {
  let mut plan = CurricularPlan::new(student_id);
  plan = run(plan, Mutation::CreateSemester {
    draft: SemesterDraft {
      period:     Some("2024-1".into()),
      start_date: NaiveDate::from_ymd_opt(2024, 3, 4),
      end_date:   NaiveDate::from_ymd_opt(2024, 7, 12),
    },
  });
  plan = run(plan, Mutation::CreateSemester { draft: SemesterDraft::with_period("2024-2") });
  plan = run(plan, Mutation::CreateSemester { draft: SemesterDraft::default() });

  plan = run(plan, Mutation::AddSubject { semester: 1, draft: approved("DCCB-00106", 6, 6.1) });
  plan = run(plan, Mutation::AddSubject { semester: 1, draft: approved("DCCB-00107", 4, 5.0) });
  plan = run(plan, Mutation::AddSubject { semester: 2, draft: approved("DCCB-00265", 6, 4.5) });

  let mut in_progress = SubjectDraft::new("ECIN-00307", "Microeconomía", 5);
  in_progress.state = SubjectState::InProgress;
  in_progress.prerequisites = vec!["DCCB-00106".into(), "DCCB-00265".into()];
  run(plan, Mutation::AddSubject { semester: 3, draft: in_progress })
}

fn codes(plan: &CurricularPlan, semester: u32) -> Vec<String> {
  plan
    .semester(semester)
    .unwrap()
    .subjects
    .iter()
    .map(|s| s.code.to_string())
    .collect()
}

// ─── Plans ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_unknown_student_returns_none() {
  let s = store().await;
  assert!(s.load_plan(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_plan_round_trips_as_some() {
  let s = store().await;
  let student = Uuid::new_v4();
  s.save_plan(student, &CurricularPlan::new(student)).await.unwrap();

  let loaded = s.load_plan(student).await.unwrap().unwrap();
  assert!(loaded.semesters.is_empty());
}

#[tokio::test]
async fn save_assigns_store_ids_to_every_subject() {
  let s = store().await;
  let student = Uuid::new_v4();
  let mut plan = sample_plan(student);
  plan.semesters[0].subjects[0].record_id = Some(RecordId::Local("local-1-0".into()));

  let saved = s.save_plan(student, &plan).await.unwrap();

  assert!(saved
    .subjects()
    .all(|subj| matches!(subj.record_id, Some(RecordId::Synced(_)))));
}

#[tokio::test]
async fn save_and_load_preserves_order_and_fields() {
  let s = store().await;
  let student = Uuid::new_v4();
  let saved = s.save_plan(student, &sample_plan(student)).await.unwrap();

  let loaded = s.load_plan(student).await.unwrap().unwrap();

  assert_eq!(loaded, saved);
  assert_eq!(loaded.semester_numbers(), [1, 2, 3]);
  assert_eq!(codes(&loaded, 1), ["DCCB-00106", "DCCB-00107"]);
  let first = loaded.semester(1).unwrap();
  assert_eq!(first.period.as_deref(), Some("2024-1"));
  assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2024, 3, 4));
  let ecin = &loaded.semester(3).unwrap().subjects[0];
  assert_eq!(ecin.state, SubjectState::InProgress);
  assert_eq!(ecin.prerequisites.len(), 2);
  assert!(ecin.grade.is_none());
}

#[tokio::test]
async fn resave_keeps_existing_ids_and_replaces_rows() {
  let s = store().await;
  let student = Uuid::new_v4();
  let saved = s.save_plan(student, &sample_plan(student)).await.unwrap();
  let original_id = saved.semester(3).unwrap().subjects[0].record_id.clone();

  let next = run(saved, Mutation::DeleteSemester { number: 2 });
  let resaved = s.save_plan(student, &next).await.unwrap();
  let loaded = s.load_plan(student).await.unwrap().unwrap();

  assert_eq!(loaded, resaved);
  assert_eq!(loaded.semester_numbers(), [1, 2]);
  assert_eq!(codes(&loaded, 2), ["ECIN-00307"]);
  assert_eq!(loaded.semester(2).unwrap().subjects[0].record_id, original_id);
}

#[tokio::test]
async fn plans_are_isolated_per_student() {
  let s = store().await;
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  s.save_plan(alice, &sample_plan(alice)).await.unwrap();
  s.save_plan(bob, &sample_plan(bob)).await.unwrap();

  s.save_plan(bob, &CurricularPlan::new(bob)).await.unwrap();

  assert_eq!(s.load_plan(alice).await.unwrap().unwrap().subject_count(), 4);
  assert_eq!(s.load_plan(bob).await.unwrap().unwrap().subject_count(), 0);
}

#[tokio::test]
async fn save_rejects_plan_with_gaps() {
  let s = store().await;
  let student = Uuid::new_v4();
  let mut plan = sample_plan(student);
  plan.semesters[1].number = 5;

  let err = s.save_plan(student, &plan).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(curricula_core::Error::InvariantViolation(_))));
  assert!(s.load_plan(student).await.unwrap().is_none());
}

// ─── Subject records ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_subject_record_appends_to_semester() {
  let s = store().await;
  let student = Uuid::new_v4();
  s.save_plan(student, &sample_plan(student)).await.unwrap();

  let persisted = s
    .create_subject_record(student, 1, &SubjectDraft::new("ecin-00110", "Estadística", 5))
    .await
    .unwrap();

  assert_eq!(persisted.semester, 1);
  assert_eq!(persisted.subject.code.as_str(), "ECIN-00110");
  assert_eq!(persisted.subject.record_id, Some(RecordId::Synced(persisted.record_id)));

  let loaded = s.load_plan(student).await.unwrap().unwrap();
  assert_eq!(codes(&loaded, 1), ["DCCB-00106", "DCCB-00107", "ECIN-00110"]);
}

#[tokio::test]
async fn create_subject_record_in_unknown_semester_errors() {
  let s = store().await;
  let student = Uuid::new_v4();
  s.save_plan(student, &sample_plan(student)).await.unwrap();

  let err = s
    .create_subject_record(student, 9, &SubjectDraft::new("X-1", "Nada", 1))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::SemesterNotFound { semester: 9, .. }));
}

#[tokio::test]
async fn create_subject_record_rejects_duplicate_code() {
  let s = store().await;
  let student = Uuid::new_v4();
  s.save_plan(student, &sample_plan(student)).await.unwrap();

  let err = s
    .create_subject_record(student, 2, &SubjectDraft::new("dccb-00106", "Otra", 3))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Database(_)));
}

#[tokio::test]
async fn create_subject_record_validates_draft() {
  let s = store().await;
  let student = Uuid::new_v4();
  s.save_plan(student, &sample_plan(student)).await.unwrap();

  let err = s
    .create_subject_record(student, 1, &SubjectDraft::new("X-1", "", 1))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(curricula_core::Error::Validation(_))));
}

// ─── Audit log ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_are_listed_in_append_order() {
  let s = store().await;
  let student = Uuid::new_v4();
  let other = Uuid::new_v4();

  let first = s
    .append_event(NewPlanEvent {
      student_id: student,
      mutation:   Mutation::CreateSemester { draft: SemesterDraft::default() },
      summary:    "Semester 1 created".into(),
      synced:     true,
    })
    .await
    .unwrap();
  s.append_event(NewPlanEvent {
    student_id: other,
    mutation:   Mutation::DeleteSemester { number: 1 },
    summary:    "Semester 1 deleted".into(),
    synced:     true,
  })
  .await
  .unwrap();
  s.append_event(NewPlanEvent {
    student_id: student,
    mutation:   Mutation::DeleteSubject { code: "A-1".into() },
    summary:    "Subject A-1 removed from semester 1".into(),
    synced:     false,
  })
  .await
  .unwrap();

  let events = s.list_events(student).await.unwrap();
  assert_eq!(events.len(), 2);
  assert_eq!(events[0], first);
  assert!(matches!(events[1].mutation, Mutation::DeleteSubject { .. }));
  assert!(!events[1].synced);
}

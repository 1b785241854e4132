//! The mutation protocol: every structural change a plan can undergo.
//!
//! [`apply`] is a pure state transition. It works on a copy of the plan and
//! either returns the next plan together with a description of what changed,
//! or returns an error and leaves the caller's plan exactly as it was.
//! Persistence, notification and locking live in higher layers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  plan::CurricularPlan,
  semester::SemesterDraft,
  subject::{Subject, SubjectCode, SubjectDraft, SubjectPatch},
};

// ─── Mutation ────────────────────────────────────────────────────────────────

/// A requested change to a plan. Codes are raw input; [`apply`] normalizes
/// them before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
  AddSubject {
    semester: u32,
    draft:    SubjectDraft,
  },
  EditSubject {
    code:  String,
    patch: SubjectPatch,
  },
  DeleteSubject {
    code: String,
  },
  /// The drag-and-drop primitive. `index` is clamped to the target length.
  MoveSubject {
    code:  String,
    from:  u32,
    to:    u32,
    index: usize,
  },
  CreateSemester {
    #[serde(default)]
    draft: SemesterDraft,
  },
  DeleteSemester {
    number: u32,
  },
}

impl Mutation {
  /// The discriminant string stored with audit events.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::AddSubject { .. } => "add_subject",
      Self::EditSubject { .. } => "edit_subject",
      Self::DeleteSubject { .. } => "delete_subject",
      Self::MoveSubject { .. } => "move_subject",
      Self::CreateSemester { .. } => "create_semester",
      Self::DeleteSemester { .. } => "delete_semester",
    }
  }
}

// ─── Effect ──────────────────────────────────────────────────────────────────

/// What an applied mutation actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
  SubjectAdded { code: SubjectCode, semester: u32 },
  SubjectEdited { code: SubjectCode, semester: u32 },
  SubjectDeleted { code: SubjectCode, semester: u32 },
  SubjectMoved { code: SubjectCode, from: u32, to: u32, index: usize },
  SemesterCreated { number: u32 },
  /// `renumbered` counts the later semesters whose number moved down by one.
  SemesterDeleted { number: u32, renumbered: usize },
  /// A move within a single semester. Reordering is cosmetic and is not
  /// treated as a change.
  Unchanged,
}

impl Effect {
  pub fn changes_plan(&self) -> bool { !matches!(self, Self::Unchanged) }
}

impl fmt::Display for Effect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::SubjectAdded { code, semester } => {
        write!(f, "Subject {code} added to semester {semester}")
      }
      Self::SubjectEdited { code, .. } => write!(f, "Subject {code} updated"),
      Self::SubjectDeleted { code, semester } => {
        write!(f, "Subject {code} removed from semester {semester}")
      }
      Self::SubjectMoved { code, from, to, .. } => {
        write!(f, "Subject {code} moved from semester {from} to semester {to}")
      }
      Self::SemesterCreated { number } => write!(f, "Semester {number} created"),
      Self::SemesterDeleted { number, renumbered: 0 } => {
        write!(f, "Semester {number} deleted")
      }
      Self::SemesterDeleted { number, .. } => {
        write!(f, "Semester {number} deleted and later semesters renumbered")
      }
      Self::Unchanged => f.write_str("No changes"),
    }
  }
}

/// The outcome of a successful [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
  pub plan:   CurricularPlan,
  pub effect: Effect,
}

// ─── Application ─────────────────────────────────────────────────────────────

/// Apply `mutation` to a copy of `plan`.
pub fn apply(plan: &CurricularPlan, mutation: &Mutation) -> Result<Applied> {
  let mut next = plan.clone();
  let effect = match mutation {
    Mutation::AddSubject { semester, draft } => add_subject(&mut next, *semester, draft)?,
    Mutation::EditSubject { code, patch } => edit_subject(&mut next, code, patch)?,
    Mutation::DeleteSubject { code } => delete_subject(&mut next, code)?,
    Mutation::MoveSubject { code, from, to, index } => {
      move_subject(&mut next, code, *from, *to, *index)?
    }
    Mutation::CreateSemester { draft } => {
      let number = next.push_semester(draft)?;
      Effect::SemesterCreated { number }
    }
    Mutation::DeleteSemester { number } => delete_semester(&mut next, *number)?,
  };
  Ok(Applied { plan: next, effect })
}

fn add_subject(plan: &mut CurricularPlan, semester: u32, draft: &SubjectDraft) -> Result<Effect> {
  plan.semester_index_or_err(semester)?;
  let subject = Subject::new(draft)?;
  let code = subject.code.clone();
  plan.add_subject_to(semester, subject)?;
  Ok(Effect::SubjectAdded { code, semester })
}

fn edit_subject(plan: &mut CurricularPlan, code: &str, patch: &SubjectPatch) -> Result<Effect> {
  let code = SubjectCode::normalize(code)?;
  let loc = plan
    .locate(&code)
    .ok_or_else(|| Error::SubjectNotFound(code.clone()))?;
  let slot = &mut plan.semesters[loc.semester_index].subjects[loc.position];
  *slot = slot.edited(patch)?;
  Ok(Effect::SubjectEdited { code, semester: loc.semester })
}

fn delete_subject(plan: &mut CurricularPlan, code: &str) -> Result<Effect> {
  let code = SubjectCode::normalize(code)?;
  let loc = plan
    .locate(&code)
    .ok_or_else(|| Error::SubjectNotFound(code.clone()))?;
  plan.semesters[loc.semester_index].subjects.remove(loc.position);
  Ok(Effect::SubjectDeleted { code, semester: loc.semester })
}

fn move_subject(
  plan: &mut CurricularPlan,
  code: &str,
  from: u32,
  to: u32,
  index: usize,
) -> Result<Effect> {
  let code = SubjectCode::normalize(code)?;
  let from_idx = plan.semester_index_or_err(from)?;
  let to_idx = plan.semester_index_or_err(to)?;

  if !plan.semesters[from_idx].contains(&code) {
    return Err(Error::SubjectNotFound(code));
  }
  if from_idx == to_idx {
    return Ok(Effect::Unchanged);
  }

  let subject = plan.semesters[from_idx].remove_subject(&code)?;
  let index = plan.semesters[to_idx].insert_clamped(index, subject);
  Ok(Effect::SubjectMoved { code, from, to, index })
}

fn delete_semester(plan: &mut CurricularPlan, number: u32) -> Result<Effect> {
  let renumbered = plan
    .semesters
    .iter()
    .filter(|s| s.number > number)
    .count();
  plan.remove_semester(number)?;
  Ok(Effect::SemesterDeleted { number, renumbered })
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::subject::SubjectState;

  fn draft(code: &str, credits: i64) -> SubjectDraft { SubjectDraft::new(code, "Asignatura", credits) }

  fn run(plan: &CurricularPlan, m: Mutation) -> CurricularPlan { apply(plan, &m).unwrap().plan }

  fn plan_with_semesters(n: u32) -> CurricularPlan {
    let mut plan = CurricularPlan::new(Uuid::nil());
    for _ in 0..n {
      plan = run(&plan, Mutation::CreateSemester { draft: SemesterDraft::default() });
    }
    plan
  }

  fn add(plan: &CurricularPlan, semester: u32, code: &str) -> CurricularPlan {
    run(plan, Mutation::AddSubject { semester, draft: draft(code, 5) })
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

  // ── AddSubject ─────────────────────────────────────────────────────────

  #[test]
  fn add_subject_normalizes_and_appends() {
    let plan = plan_with_semesters(1);
    let applied = apply(
      &plan,
      &Mutation::AddSubject { semester: 1, draft: draft(" dccb-00106", 6) },
    )
    .unwrap();
    assert_eq!(codes(&applied.plan, 1), ["DCCB-00106"]);
    assert_eq!(applied.effect.to_string(), "Subject DCCB-00106 added to semester 1");
  }

  #[test]
  fn duplicate_add_leaves_plan_unchanged() {
    let plan = add(&plan_with_semesters(2), 2, "DCCB-00106");
    let before = plan.clone();
    let err = apply(
      &plan,
      &Mutation::AddSubject { semester: 1, draft: draft("dccb-00106", 6) },
    )
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateCode(_)));
    assert_eq!(plan, before);
  }

  #[test]
  fn add_to_missing_semester_fails() {
    let plan = plan_with_semesters(1);
    let err = apply(&plan, &Mutation::AddSubject { semester: 2, draft: draft("A-1", 5) })
      .unwrap_err();
    assert!(matches!(err, Error::SemesterNotFound(2)));
  }

  #[test]
  fn add_with_negative_credits_fails_validation() {
    let plan = plan_with_semesters(1);
    let err = apply(&plan, &Mutation::AddSubject { semester: 1, draft: draft("A-1", -3) })
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(plan.subject_count(), 0);
  }

  // ── EditSubject ────────────────────────────────────────────────────────

  #[test]
  fn edit_replaces_fields_and_keeps_membership() {
    let plan = add(&add(&plan_with_semesters(2), 1, "A-1"), 2, "B-2");
    let applied = apply(
      &plan,
      &Mutation::EditSubject {
        code:  "b-2".into(),
        patch: SubjectPatch {
          name:          "Econometría".into(),
          credits:       7,
          state:         SubjectState::Approved,
          grade:         Some(5.5),
          prerequisites: vec!["a-1".into()],
        },
      },
    )
    .unwrap();

    let edited = &applied.plan.semester(2).unwrap().subjects[0];
    assert_eq!(edited.name, "Econometría");
    assert_eq!(edited.credits, 7);
    assert_eq!(edited.state, SubjectState::Approved);
    assert_eq!(edited.prerequisites[0].as_str(), "A-1");
    assert!(matches!(applied.effect, Effect::SubjectEdited { semester: 2, .. }));
  }

  #[test]
  fn edit_missing_subject_is_not_found() {
    let plan = plan_with_semesters(1);
    let err = apply(
      &plan,
      &Mutation::EditSubject {
        code:  "X-9".into(),
        patch: SubjectPatch {
          name:          "Nada".into(),
          credits:       1,
          state:         SubjectState::Pending,
          grade:         None,
          prerequisites: vec![],
        },
      },
    )
    .unwrap_err();
    assert!(err.is_not_found());
  }

  // ── DeleteSubject ──────────────────────────────────────────────────────

  #[test]
  fn delete_subject_removes_it_without_renumbering() {
    let plan = add(&add(&plan_with_semesters(2), 1, "A-1"), 2, "B-2");
    let next = run(&plan, Mutation::DeleteSubject { code: "a-1".into() });
    assert!(codes(&next, 1).is_empty());
    assert_eq!(next.semester_numbers(), [1, 2]);
  }

  #[test]
  fn delete_missing_subject_is_not_found() {
    let plan = plan_with_semesters(1);
    let err = apply(&plan, &Mutation::DeleteSubject { code: "A-1".into() }).unwrap_err();
    assert!(matches!(err, Error::SubjectNotFound(_)));
  }

  // ── MoveSubject ────────────────────────────────────────────────────────

  #[test]
  fn move_inserts_at_target_index() {
    let mut plan = plan_with_semesters(2);
    plan = add(&plan, 1, "A-1");
    plan = add(&plan, 2, "B-2");
    plan = add(&plan, 2, "C-3");

    let applied = apply(
      &plan,
      &Mutation::MoveSubject { code: "a-1".into(), from: 1, to: 2, index: 1 },
    )
    .unwrap();

    assert!(codes(&applied.plan, 1).is_empty());
    assert_eq!(codes(&applied.plan, 2), ["B-2", "A-1", "C-3"]);
    assert_eq!(applied.plan.subject_count(), plan.subject_count());
  }

  #[test]
  fn move_clamps_index_past_end() {
    let plan = add(&add(&plan_with_semesters(2), 1, "A-1"), 2, "B-2");
    let applied = apply(
      &plan,
      &Mutation::MoveSubject { code: "A-1".into(), from: 1, to: 2, index: 42 },
    )
    .unwrap();
    assert_eq!(codes(&applied.plan, 2), ["B-2", "A-1"]);
    assert!(matches!(applied.effect, Effect::SubjectMoved { index: 1, .. }));
  }

  #[test]
  fn move_within_same_semester_is_a_noop() {
    let plan = add(&add(&plan_with_semesters(1), 1, "A-1"), 1, "B-2");
    let applied = apply(
      &plan,
      &Mutation::MoveSubject { code: "B-2".into(), from: 1, to: 1, index: 0 },
    )
    .unwrap();
    assert_eq!(applied.effect, Effect::Unchanged);
    assert_eq!(applied.plan, plan);
  }

  #[test]
  fn move_from_wrong_semester_is_not_found() {
    let plan = add(&plan_with_semesters(3), 1, "A-1");
    let err = apply(
      &plan,
      &Mutation::MoveSubject { code: "A-1".into(), from: 2, to: 3, index: 0 },
    )
    .unwrap_err();
    assert!(matches!(err, Error::SubjectNotFound(_)));
  }

  #[test]
  fn move_to_missing_semester_fails() {
    let plan = add(&plan_with_semesters(1), 1, "A-1");
    let err = apply(
      &plan,
      &Mutation::MoveSubject { code: "A-1".into(), from: 1, to: 5, index: 0 },
    )
    .unwrap_err();
    assert!(matches!(err, Error::SemesterNotFound(5)));
  }

  // ── Semesters ──────────────────────────────────────────────────────────

  #[test]
  fn delete_middle_semester_shifts_later_subjects_down() {
    let mut plan = plan_with_semesters(3);
    plan = add(&plan, 1, "A-1");
    plan = add(&plan, 2, "B-2");
    plan = add(&plan, 3, "C-3");

    let applied = apply(&plan, &Mutation::DeleteSemester { number: 2 }).unwrap();

    assert_eq!(applied.plan.semester_numbers(), [1, 2]);
    assert_eq!(codes(&applied.plan, 1), ["A-1"]);
    assert_eq!(codes(&applied.plan, 2), ["C-3"]);
    assert_eq!(applied.plan.semester(1), plan.semester(1));
    assert_eq!(
      applied.effect.to_string(),
      "Semester 2 deleted and later semesters renumbered"
    );
  }

  #[test]
  fn delete_last_semester_renumbers_nothing() {
    let plan = plan_with_semesters(2);
    let applied = apply(&plan, &Mutation::DeleteSemester { number: 2 }).unwrap();
    assert_eq!(applied.effect, Effect::SemesterDeleted { number: 2, renumbered: 0 });
    assert_eq!(applied.effect.to_string(), "Semester 2 deleted");
  }

  #[test]
  fn delete_missing_semester_fails() {
    let plan = plan_with_semesters(2);
    assert!(matches!(
      apply(&plan, &Mutation::DeleteSemester { number: 3 }),
      Err(Error::SemesterNotFound(3))
    ));
  }

  #[test]
  fn create_after_delete_reuses_next_number() {
    let plan = plan_with_semesters(3);
    let plan = run(&plan, Mutation::DeleteSemester { number: 1 });
    let applied = apply(
      &plan,
      &Mutation::CreateSemester { draft: SemesterDraft::with_period("2025-2") },
    )
    .unwrap();
    assert_eq!(applied.effect, Effect::SemesterCreated { number: 3 });
    assert_eq!(applied.plan.semester(3).unwrap().period.as_deref(), Some("2025-2"));
  }

  // ── Sequence properties ────────────────────────────────────────────────

  /// A deterministic script of mixed operations, some of which fail.
  fn script() -> Vec<Mutation> {
    let mut ops = Vec::new();
    for _ in 0..5 {
      ops.push(Mutation::CreateSemester { draft: SemesterDraft::default() });
    }
    for i in 0..12u32 {
      ops.push(Mutation::AddSubject {
        semester: i % 6 + 1,
        draft:    draft(&format!("s-{}", i % 9), i64::from(i % 4) + 1),
      });
    }
    for (i, n) in [3u32, 1, 4, 9, 2].into_iter().enumerate() {
      ops.push(Mutation::DeleteSemester { number: n });
      ops.push(Mutation::CreateSemester { draft: SemesterDraft::default() });
      ops.push(Mutation::MoveSubject {
        code:  format!("S-{i}"),
        from:  n,
        to:    (n % 3) + 1,
        index: i,
      });
    }
    ops
  }

  #[test]
  fn invariants_hold_after_any_operation_sequence() {
    let mut plan = CurricularPlan::new(Uuid::nil());
    for m in script() {
      let before = plan.clone();
      match apply(&plan, &m) {
        Ok(applied) => {
          if let Mutation::MoveSubject { .. } = m {
            assert_eq!(applied.plan.subject_count(), before.subject_count());
          }
          plan = applied.plan;
        }
        Err(_) => assert_eq!(plan, before),
      }
      plan.check_invariants().unwrap();
      let expected: Vec<u32> = (1..=plan.semesters.len() as u32).collect();
      assert_eq!(plan.semester_numbers(), expected);
    }
  }

  #[test]
  fn mutations_round_trip_through_json() {
    let m = Mutation::MoveSubject { code: "A-1".into(), from: 1, to: 2, index: 0 };
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["op"], m.kind());
    let back: Mutation = serde_json::from_value(json).unwrap();
    assert_eq!(back, m);
  }
}

//! The curricular plan: one student's ordered collection of semesters.
//!
//! Two invariants hold for every plan the engine produces:
//!
//! - semester numbers are exactly `1..=N`, stored in ascending order;
//! - subject codes are unique across the whole plan, not just per semester.
//!
//! Plans that come from outside (a store, a request body) can be checked with
//! [`CurricularPlan::check_invariants`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  semester::{Semester, SemesterDraft},
  subject::{Subject, SubjectCode},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurricularPlan {
  pub student_id: Uuid,
  pub semesters:  Vec<Semester>,
}

/// Where a subject lives inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectLocation {
  /// Index into [`CurricularPlan::semesters`].
  pub semester_index: usize,
  pub semester:       u32,
  /// Index into that semester's subject list.
  pub position:       usize,
}

impl CurricularPlan {
  /// An empty plan with no semesters.
  pub fn new(student_id: Uuid) -> Self { Self { student_id, semesters: Vec::new() } }

  /// Build a plan from already-numbered semesters, rejecting anything that
  /// breaks the plan invariants.
  pub fn from_semesters(student_id: Uuid, semesters: Vec<Semester>) -> Result<Self> {
    let plan = Self { student_id, semesters };
    plan.check_invariants()?;
    Ok(plan)
  }

  // ── Reads ──────────────────────────────────────────────────────────────

  pub fn semester(&self, number: u32) -> Option<&Semester> {
    self.semester_index(number).map(|i| &self.semesters[i])
  }

  fn semester_index(&self, number: u32) -> Option<usize> {
    self.semesters.iter().position(|s| s.number == number)
  }

  pub(crate) fn semester_index_or_err(&self, number: u32) -> Result<usize> {
    self
      .semester_index(number)
      .ok_or(Error::SemesterNotFound(number))
  }

  pub fn semester_numbers(&self) -> Vec<u32> { self.semesters.iter().map(|s| s.number).collect() }

  /// Highest semester number, or 0 for an empty plan.
  pub fn max_semester(&self) -> u32 {
    self.semesters.iter().map(|s| s.number).max().unwrap_or(0)
  }

  pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
    self.semesters.iter().flat_map(|s| s.subjects.iter())
  }

  pub fn subjects_mut(&mut self) -> impl Iterator<Item = &mut Subject> {
    self.semesters.iter_mut().flat_map(|s| s.subjects.iter_mut())
  }

  pub fn subject_count(&self) -> usize { self.semesters.iter().map(|s| s.subjects.len()).sum() }

  /// Scan every semester for `code`; first match wins.
  pub fn locate(&self, code: &SubjectCode) -> Option<SubjectLocation> {
    self
      .semesters
      .iter()
      .enumerate()
      .find_map(|(semester_index, sem)| {
        sem.position_of(code).map(|position| SubjectLocation {
          semester_index,
          semester: sem.number,
          position,
        })
      })
  }

  pub fn find_subject(&self, code: &SubjectCode) -> Option<&Subject> {
    self
      .locate(code)
      .map(|loc| &self.semesters[loc.semester_index].subjects[loc.position])
  }

  pub fn contains_code(&self, code: &SubjectCode) -> bool { self.locate(code).is_some() }

  // ── Structural changes ─────────────────────────────────────────────────

  /// Append `subject` to semester `number`.
  ///
  /// Fails with [`Error::SemesterNotFound`] or [`Error::DuplicateCode`]; the
  /// plan is untouched on failure.
  pub fn add_subject_to(&mut self, number: u32, subject: Subject) -> Result<()> {
    let idx = self.semester_index_or_err(number)?;
    if self.contains_code(&subject.code) {
      return Err(Error::DuplicateCode(subject.code));
    }
    self.semesters[idx].subjects.push(subject);
    Ok(())
  }

  /// Create a semester numbered `max + 1` and append it. Returns its number.
  pub fn push_semester(&mut self, draft: &SemesterDraft) -> Result<u32> {
    let next = self.max_semester() + 1;
    let semester = Semester::new(next, draft)?;
    self.semesters.push(semester);
    Ok(next)
  }

  /// Remove semester `number` and close the gap: every later semester is
  /// decremented by one, earlier ones keep their numbers.
  pub fn remove_semester(&mut self, number: u32) -> Result<Semester> {
    let idx = self.semester_index_or_err(number)?;
    let removed = self.semesters.remove(idx);
    // Sorted and dense, so everything from `idx` on had a number > `number`.
    for later in &mut self.semesters[idx..] {
      later.number -= 1;
    }
    Ok(removed)
  }

  // ── Invariants ─────────────────────────────────────────────────────────

  /// Verify dense ascending numbering and plan-wide code uniqueness.
  pub fn check_invariants(&self) -> Result<()> {
    for (i, sem) in self.semesters.iter().enumerate() {
      let expected = u32::try_from(i + 1)
        .map_err(|_| Error::InvariantViolation("too many semesters".into()))?;
      if sem.number != expected {
        return Err(Error::InvariantViolation(format!(
          "semester at position {i} is numbered {} (expected {expected})",
          sem.number
        )));
      }
    }

    let mut seen = HashSet::new();
    for subject in self.subjects() {
      if !seen.insert(&subject.code) {
        return Err(Error::InvariantViolation(format!(
          "subject code {} appears more than once",
          subject.code
        )));
      }
    }
    Ok(())
  }
}

//! Progress aggregation: summary metrics derived from a plan.
//!
//! Never stored and never patched incrementally: [`compute`] is re-run over
//! the whole plan after every mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{
  plan::CurricularPlan,
  subject::{SubjectCode, SubjectState},
};

/// The computed read model for a plan's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
  pub total_credits:          u64,
  pub approved_credits:       u64,
  /// `total_credits - approved_credits`.
  pub pending_credits:        u64,
  /// `approved / total` as a rounded percentage; 0 for a plan with no credits.
  pub completion_percent:     u32,
  /// Highest semester number present; 0 for a plan with no semesters.
  pub current_semester:       u32,
  /// Mean grade over approved subjects that have a recorded grade. Approved
  /// subjects without a grade are left out of both sums; 0 when none remain.
  pub weighted_average_grade: f64,
  pub subject_count:          usize,
  /// Number of subjects in each state. Every state is present, possibly 0.
  pub by_state:               BTreeMap<SubjectState, usize>,
  /// Pending or in-progress subjects that carry a grade, in plan order.
  /// Reported, never rejected.
  #[serde(default)]
  pub unconventional_grades:  Vec<SubjectCode>,
}

/// Derive a [`ProgressSummary`] from `plan` in a single pass.
pub fn compute(plan: &CurricularPlan) -> ProgressSummary {
  let mut total_credits = 0u64;
  let mut approved_credits = 0u64;
  let mut grade_sum = 0.0f64;
  let mut graded = 0usize;
  let mut by_state: BTreeMap<SubjectState, usize> =
    SubjectState::iter().map(|s| (s, 0)).collect();
  let mut unconventional_grades = Vec::new();

  for subject in plan.subjects() {
    let credits = u64::from(subject.credits);
    total_credits += credits;
    *by_state.entry(subject.state).or_default() += 1;
    if !subject.grade_is_conventional() {
      unconventional_grades.push(subject.code.clone());
    }

    if subject.state == SubjectState::Approved {
      approved_credits += credits;
      if let Some(grade) = subject.grade {
        grade_sum += grade;
        graded += 1;
      }
    }
  }

  let completion_percent = if total_credits == 0 {
    0
  } else {
    (approved_credits as f64 / total_credits as f64 * 100.0).round() as u32
  };

  let weighted_average_grade = if graded == 0 { 0.0 } else { grade_sum / graded as f64 };

  ProgressSummary {
    total_credits,
    approved_credits,
    pending_credits: total_credits - approved_credits,
    completion_percent,
    current_semester: plan.max_semester(),
    weighted_average_grade,
    subject_count: plan.subject_count(),
    by_state,
    unconventional_grades,
  }
}

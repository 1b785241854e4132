//! Opt-in prerequisite checking.
//!
//! Prerequisites are plain data on each subject. Nothing in the mutation
//! protocol consults them; callers that care run [`validate`] over a plan and
//! decide what to do with the issues it reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{plan::CurricularPlan, subject::SubjectCode};

/// A single problem with a subject's declared prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum PrerequisiteIssue {
  /// The prerequisite code does not appear anywhere in the plan.
  Missing {
    subject:      SubjectCode,
    prerequisite: SubjectCode,
  },
  /// The prerequisite is scheduled in the same or a later semester.
  NotEarlier {
    subject:               SubjectCode,
    prerequisite:          SubjectCode,
    subject_semester:      u32,
    prerequisite_semester: u32,
  },
  SelfReference {
    subject: SubjectCode,
  },
}

/// Report every prerequisite issue in `plan`, in plan order.
pub fn validate(plan: &CurricularPlan) -> Vec<PrerequisiteIssue> {
  let scheduled: HashMap<&SubjectCode, u32> = plan
    .semesters
    .iter()
    .flat_map(|sem| sem.subjects.iter().map(move |s| (&s.code, sem.number)))
    .collect();

  let mut issues = Vec::new();
  for sem in &plan.semesters {
    for subject in &sem.subjects {
      for prerequisite in &subject.prerequisites {
        if prerequisite == &subject.code {
          issues.push(PrerequisiteIssue::SelfReference { subject: subject.code.clone() });
          continue;
        }
        match scheduled.get(prerequisite) {
          None => issues.push(PrerequisiteIssue::Missing {
            subject:      subject.code.clone(),
            prerequisite: prerequisite.clone(),
          }),
          Some(&at) if at >= sem.number => issues.push(PrerequisiteIssue::NotEarlier {
            subject:               subject.code.clone(),
            prerequisite:          prerequisite.clone(),
            subject_semester:      sem.number,
            prerequisite_semester: at,
          }),
          Some(_) => {}
        }
      }
    }
  }
  issues
}

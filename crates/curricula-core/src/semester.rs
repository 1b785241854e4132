//! Semester: an ordered group of subjects identified by a sequential number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  subject::{Subject, SubjectCode},
};

/// One numbered semester of a plan. Subject order is display order only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
  pub number:     u32,
  /// Free-form period label, e.g. `"2024-1"`.
  pub period:     Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub subjects:   Vec<Subject>,
}

impl Semester {
  /// Build an empty semester. Numbers start at 1.
  pub fn new(number: u32, draft: &SemesterDraft) -> Result<Self> {
    if number == 0 {
      return Err(Error::Validation("semester numbers start at 1".into()));
    }
    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date)
      && end < start
    {
      return Err(Error::Validation(format!(
        "semester ends ({end}) before it starts ({start})"
      )));
    }
    let period = draft
      .period
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_owned);

    Ok(Self {
      number,
      period,
      start_date: draft.start_date,
      end_date: draft.end_date,
      subjects: Vec::new(),
    })
  }

  /// Position of `code` in this semester's display order.
  pub fn position_of(&self, code: &SubjectCode) -> Option<usize> {
    self.subjects.iter().position(|s| &s.code == code)
  }

  pub fn contains(&self, code: &SubjectCode) -> bool { self.position_of(code).is_some() }

  /// Remove and return the subject with `code`.
  pub fn remove_subject(&mut self, code: &SubjectCode) -> Result<Subject> {
    let idx = self
      .position_of(code)
      .ok_or_else(|| Error::SubjectNotFound(code.clone()))?;
    Ok(self.subjects.remove(idx))
  }

  /// Insert at `index`, clamped to `[0, len]`. Returns the index used.
  pub(crate) fn insert_clamped(&mut self, index: usize, subject: Subject) -> usize {
    let idx = index.min(self.subjects.len());
    self.subjects.insert(idx, subject);
    idx
  }
}

/// Unvalidated input for creating a semester. The number is never supplied
/// by callers; the plan assigns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterDraft {
  #[serde(default)]
  pub period:     Option<String>,
  #[serde(default)]
  pub start_date: Option<NaiveDate>,
  #[serde(default)]
  pub end_date:   Option<NaiveDate>,
}

impl SemesterDraft {
  pub fn with_period(period: impl Into<String>) -> Self {
    Self { period: Some(period.into()), ..Default::default() }
  }
}

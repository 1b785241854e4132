//! Subject: the atomic unit of a curricular plan (one course).
//!
//! Subjects are identified by their normalized [`SubjectCode`], which is
//! unique across the whole plan. Everything else about a subject may be
//! replaced wholesale by an edit.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Code ────────────────────────────────────────────────────────────────────

/// A normalized (trimmed, uppercased) subject code such as `DCCB-00106`.
///
/// The only way to build one is through [`SubjectCode::normalize`], so two
/// codes compare equal exactly when their normalized forms match.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectCode(String);

impl SubjectCode {
  /// Trim and uppercase `raw`. Fails if nothing is left.
  pub fn normalize(raw: &str) -> Result<Self> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
      return Err(Error::Validation("subject code must not be empty".into()));
    }
    Ok(Self(code))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubjectCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for SubjectCode {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::normalize(&raw) }
}

impl From<SubjectCode> for String {
  fn from(code: SubjectCode) -> Self { code.0 }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Where a subject is in its lifecycle for this student.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubjectState {
  #[default]
  Pending,
  InProgress,
  Approved,
  Failed,
}

impl SubjectState {
  /// Whether subjects in this state conventionally carry a final grade.
  pub fn carries_grade(self) -> bool { matches!(self, Self::Approved | Self::Failed) }
}

// ─── Record identity ─────────────────────────────────────────────────────────

/// The persistence identity of a subject record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordId {
  /// Assigned by the persistence adapter.
  Synced(Uuid),
  /// Generated locally while the adapter was unavailable. Not guaranteed to
  /// be unique across clients; replaced on the next successful save.
  Local(String),
}

impl RecordId {
  pub fn is_synced(&self) -> bool { matches!(self, Self::Synced(_)) }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// One course entry in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  /// `None` until the subject has been persisted (or given a local id).
  pub record_id:     Option<RecordId>,
  pub code:          SubjectCode,
  pub name:          String,
  pub credits:       u32,
  pub state:         SubjectState,
  pub grade:         Option<f64>,
  /// Declarative only; see [`crate::prerequisites`].
  pub prerequisites: Vec<SubjectCode>,
}

impl Subject {
  /// Validate `draft` and build a subject from it. The code is normalized.
  pub fn new(draft: &SubjectDraft) -> Result<Self> {
    let code = SubjectCode::normalize(&draft.code)?;
    let fields = EditableFields::validate(
      &draft.name,
      draft.credits,
      draft.state,
      draft.grade,
      &draft.prerequisites,
    )?;
    Ok(fields.into_subject(code, None))
  }

  /// Return a copy with every editable field replaced by `patch`. The code
  /// and the record id are kept.
  pub fn edited(&self, patch: &SubjectPatch) -> Result<Self> {
    let fields = EditableFields::validate(
      &patch.name,
      patch.credits,
      patch.state,
      patch.grade,
      &patch.prerequisites,
    )?;
    Ok(fields.into_subject(self.code.clone(), self.record_id.clone()))
  }

  /// `false` when a pending or in-progress subject carries a grade. This is
  /// reported, never rejected.
  pub fn grade_is_conventional(&self) -> bool {
    self.state.carries_grade() || self.grade.is_none()
  }
}

/// The validated, editable part of a subject.
struct EditableFields {
  name:          String,
  credits:       u32,
  state:         SubjectState,
  grade:         Option<f64>,
  prerequisites: Vec<SubjectCode>,
}

impl EditableFields {
  fn validate(
    name: &str,
    credits: i64,
    state: SubjectState,
    grade: Option<f64>,
    prerequisites: &[String],
  ) -> Result<Self> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::Validation("subject name must not be empty".into()));
    }
    if credits < 0 {
      return Err(Error::Validation(format!(
        "credits must not be negative (got {credits})"
      )));
    }
    let credits = u32::try_from(credits)
      .map_err(|_| Error::Validation(format!("credits out of range: {credits}")))?;
    if let Some(g) = grade
      && !(g.is_finite() && g >= 0.0)
    {
      return Err(Error::Validation(format!("invalid grade: {g}")));
    }
    let prerequisites = prerequisites
      .iter()
      .map(|p| SubjectCode::normalize(p))
      .collect::<Result<Vec<_>>>()?;

    Ok(Self { name: name.to_owned(), credits, state, grade, prerequisites })
  }

  fn into_subject(self, code: SubjectCode, record_id: Option<RecordId>) -> Subject {
    Subject {
      record_id,
      code,
      name: self.name,
      credits: self.credits,
      state: self.state,
      grade: self.grade,
      prerequisites: self.prerequisites,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Unvalidated input for creating a subject.
///
/// `credits` is signed so that negative input can be represented and
/// rejected with a [`Error::Validation`] instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDraft {
  pub code:          String,
  pub name:          String,
  pub credits:       i64,
  #[serde(default)]
  pub state:         SubjectState,
  #[serde(default)]
  pub grade:         Option<f64>,
  #[serde(default)]
  pub prerequisites: Vec<String>,
}

impl SubjectDraft {
  /// Convenience constructor: pending, ungraded, no prerequisites.
  pub fn new(code: impl Into<String>, name: impl Into<String>, credits: i64) -> Self {
    Self {
      code: code.into(),
      name: name.into(),
      credits,
      state: SubjectState::default(),
      grade: None,
      prerequisites: Vec::new(),
    }
  }
}

/// Replacement values for every editable field of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectPatch {
  pub name:          String,
  pub credits:       i64,
  #[serde(default)]
  pub state:         SubjectState,
  #[serde(default)]
  pub grade:         Option<f64>,
  #[serde(default)]
  pub prerequisites: Vec<String>,
}

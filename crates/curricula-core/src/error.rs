//! Error types for `curricula-core`.

use thiserror::Error;

use crate::subject::SubjectCode;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input: empty code or name, negative credits, bad number.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("subject code {0} already exists in this plan")]
  DuplicateCode(SubjectCode),

  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectCode),

  #[error("semester not found: {0}")]
  SemesterNotFound(u32),

  /// A plan read from outside the engine does not satisfy the plan
  /// invariants (dense numbering, ascending order, unique codes).
  #[error("plan invariant violated: {0}")]
  InvariantViolation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` for both the subject and the semester flavour of "not found".
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::SubjectNotFound(_) | Self::SemesterNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `curricula-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] curricula_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A column held a value that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  /// `create_subject_record` targeted a semester that is not stored.
  #[error("semester {semester} not stored for student {student_id}")]
  SemesterNotFound { student_id: uuid::Uuid, semester: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

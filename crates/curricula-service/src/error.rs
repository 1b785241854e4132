//! Error type for `curricula-service`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
  /// The mutation itself was rejected: validation, duplicate code, not found.
  /// The plan is unchanged.
  #[error(transparent)]
  Engine(#[from] curricula_core::Error),

  /// The caller's `If-Match` tag no longer matches the plan.
  #[error("plan for student {0} has changed since it was read")]
  PreconditionFailed(Uuid),

  /// A persistence call failed and the policy does not allow local-only
  /// commits (or the caller asked for an explicit sync).
  #[error("sync failed during {operation}: {source}")]
  Sync {
    operation: &'static str,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },

  /// A read from the store failed. There is no local fallback for reads.
  #[error("store error during {operation}: {source}")]
  Store {
    operation: &'static str,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

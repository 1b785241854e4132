//! What a persistence failure means for a mutation.

use serde::{Deserialize, Serialize};

/// How the service reacts when the persistence adapter fails mid-mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
  /// Fail the mutation; the in-memory plan is left as it was.
  Strict,
  /// Log the failure, commit the mutation in memory only and mark the plan
  /// as unsynced until the next successful save.
  #[default]
  Eventual,
}

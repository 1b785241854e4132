//! Local identity source, used when the persistence adapter cannot assign a
//! record id.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Produces fallback record ids. They need only be unique within this
/// process; they are replaced by store ids on the next successful save.
pub trait IdSource: Send + Sync {
  fn next_local_id(&self) -> String;
}

/// `local-<unix millis>-<sequence>`. The sequence keeps ids distinct when
/// several are minted within the same millisecond.
#[derive(Debug, Default)]
pub struct TimestampIds {
  seq: AtomicU64,
}

impl IdSource for TimestampIds {
  fn next_local_id(&self) -> String {
    let seq = self.seq.fetch_add(1, Ordering::Relaxed);
    format!("local-{}-{seq}", Utc::now().timestamp_millis())
  }
}

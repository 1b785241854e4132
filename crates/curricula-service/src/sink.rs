//! A notification sink that writes to the `tracing` log.

use curricula_core::notify::{Notification, NotificationSink};

/// Emits each notification as an `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
  fn notify(&self, n: &Notification) {
    tracing::info!(student_id = %n.student_id, synced = n.synced, "{}", n.message);
  }
}

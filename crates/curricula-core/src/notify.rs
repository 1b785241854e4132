//! Notification sink: a fire-and-forget side channel for mutation summaries.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mutation::Effect;

/// What is reported after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub student_id: Uuid,
  pub effect:     Effect,
  /// e.g. "Semester 3 deleted and later semesters renumbered".
  pub message:    String,
  pub synced:     bool,
}

/// Receives a [`Notification`] after every successful mutation. No
/// acknowledgement is expected and failures must not reach the caller.
pub trait NotificationSink: Send + Sync {
  fn notify(&self, notification: &Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
  fn notify(&self, notification: &Notification) { (**self).notify(notification) }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
  fn notify(&self, _: &Notification) {}
}

/// Keeps every notification in memory. Useful in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
  received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
  pub fn messages(&self) -> Vec<String> {
    self
      .received
      .lock()
      .map(|r| r.iter().map(|n| n.message.clone()).collect())
      .unwrap_or_default()
  }

  pub fn notifications(&self) -> Vec<Notification> {
    self.received.lock().map(|r| r.clone()).unwrap_or_default()
  }
}

impl NotificationSink for RecordingSink {
  fn notify(&self, notification: &Notification) {
    if let Ok(mut received) = self.received.lock() {
      received.push(notification.clone());
    }
  }
}

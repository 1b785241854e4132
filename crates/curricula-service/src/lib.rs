//! Per-student, persisted access to curricular plans.
//!
//! Wraps the pure engine in `curricula-core` with per-plan serialization, a
//! [`SyncPolicy`] for persistence failures, an audit log and notifications.
//! Transport concerns are the caller's responsibility.

pub mod error;
pub mod etag;
pub mod policy;
pub mod service;
pub mod sink;

pub use error::{Result, ServiceError};
pub use policy::SyncPolicy;
pub use service::{MutationOutcome, PlanService, PlanSnapshot};
pub use sink::TracingSink;

//! JSON REST API for curricular plans.
//!
//! Exposes an axum [`Router`] backed by a [`PlanService`] over any
//! [`PlanStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! Mutating routes accept an optional `If-Match` header carrying the plan's
//! `ETag`; a stale tag is answered with `412 Precondition Failed`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", curricula_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod plan;
pub mod semesters;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use curricula_core::store::PlanStore;
use curricula_service::PlanService;

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<PlanService<S>>) -> Router<()>
where
  S: PlanStore + 'static,
{
  Router::new()
    // Plan
    .route("/students/{id}/plan", get(plan::get_plan::<S>))
    .route("/students/{id}/plan/progress", get(plan::progress::<S>))
    .route("/students/{id}/plan/prerequisites", get(plan::prerequisites::<S>))
    .route("/students/{id}/plan/events", get(plan::events::<S>))
    .route("/students/{id}/plan/mutations", post(plan::mutate::<S>))
    .route("/students/{id}/plan/sync", post(plan::sync::<S>))
    // Semesters
    .route("/students/{id}/plan/semesters", post(semesters::create::<S>))
    .route(
      "/students/{id}/plan/semesters/{number}",
      axum::routing::delete(semesters::delete::<S>),
    )
    .route(
      "/students/{id}/plan/semesters/{number}/subjects",
      post(semesters::add_subject::<S>),
    )
    // Subjects
    .route(
      "/students/{id}/plan/subjects/{code}",
      put(subjects::edit::<S>).delete(subjects::delete::<S>),
    )
    .route("/students/{id}/plan/subjects/{code}/move", post(subjects::move_to::<S>))
    .with_state(service)
}

//! Handlers for whole-plan endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students/{id}/plan` | Plan and progress, `ETag` header |
//! | `GET`  | `/students/{id}/plan/progress` | |
//! | `GET`  | `/students/{id}/plan/prerequisites` | Warnings only |
//! | `GET`  | `/students/{id}/plan/events` | Oldest first |
//! | `POST` | `/students/{id}/plan/mutations` | Body: any mutation, tagged by `op` |
//! | `POST` | `/students/{id}/plan/sync` | Flush local-only changes |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use curricula_core::{
  events::PlanEvent,
  mutation::{Effect, Mutation},
  prerequisites::PrerequisiteIssue,
  progress::ProgressSummary,
  store::PlanStore,
};
use curricula_service::{MutationOutcome, PlanService};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// The `If-Match` header, if present.
pub(crate) fn if_match(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
  headers
    .get(header::IF_MATCH)
    .map(|v| {
      v.to_str()
        .map_err(|_| ApiError::BadRequest("If-Match header is not valid ASCII".into()))
    })
    .transpose()
}

/// Run `mutation` and render the outcome. Creations answer `201 Created`.
pub(crate) async fn respond_to<S: PlanStore + 'static>(
  service: &PlanService<S>,
  student_id: Uuid,
  mutation: Mutation,
  headers: &HeaderMap,
) -> Result<Response, ApiError> {
  let outcome = service
    .mutate(student_id, mutation, if_match(headers)?)
    .await?;
  Ok(outcome_response(outcome))
}

fn outcome_response(outcome: MutationOutcome) -> Response {
  let status = match outcome.effect {
    Effect::SubjectAdded { .. } | Effect::SemesterCreated { .. } => StatusCode::CREATED,
    _ => StatusCode::OK,
  };
  let etag = outcome.snapshot.etag.clone();
  (status, [(header::ETAG, etag)], Json(outcome)).into_response()
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /students/{id}/plan`
pub async fn get_plan<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
) -> Result<Response, ApiError> {
  let snapshot = service.snapshot(student_id).await?;
  let etag = snapshot.etag.clone();
  Ok(([(header::ETAG, etag)], Json(snapshot)).into_response())
}

/// `GET /students/{id}/plan/progress`
pub async fn progress<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<ProgressSummary>, ApiError> {
  Ok(Json(service.progress(student_id).await?))
}

/// `GET /students/{id}/plan/prerequisites`
pub async fn prerequisites<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<PrerequisiteIssue>>, ApiError> {
  Ok(Json(service.prerequisite_issues(student_id).await?))
}

/// `GET /students/{id}/plan/events`
pub async fn events<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<PlanEvent>>, ApiError> {
  Ok(Json(service.events(student_id).await?))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /students/{id}/plan/mutations` with body `{"op":"delete_semester","number":2}`
pub async fn mutate<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
  headers: HeaderMap,
  Json(mutation): Json<Mutation>,
) -> Result<Response, ApiError> {
  respond_to(&service, student_id, mutation, &headers).await
}

/// `POST /students/{id}/plan/sync`
pub async fn sync<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let written = service.sync(student_id).await?;
  Ok(Json(json!({ "written": written })))
}

//! Handlers for `/students/{id}/plan/subjects/{code}` endpoints.
//!
//! Codes in the path are matched case-insensitively.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
  response::Response,
};
use curricula_core::{mutation::Mutation, store::PlanStore, subject::SubjectPatch};
use curricula_service::PlanService;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, plan::respond_to};

/// `PUT /students/{id}/plan/subjects/{code}`: replaces the editable fields.
pub async fn edit<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path((student_id, code)): Path<(Uuid, String)>,
  headers: HeaderMap,
  Json(patch): Json<SubjectPatch>,
) -> Result<Response, ApiError> {
  respond_to(&service, student_id, Mutation::EditSubject { code, patch }, &headers).await
}

/// `DELETE /students/{id}/plan/subjects/{code}`
pub async fn delete<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path((student_id, code)): Path<(Uuid, String)>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  respond_to(&service, student_id, Mutation::DeleteSubject { code }, &headers).await
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub from:  u32,
  pub to:    u32,
  /// Clamped to the target semester's length; omitted means "append".
  #[serde(default = "append")]
  pub index: usize,
}

fn append() -> usize { usize::MAX }

/// `POST /students/{id}/plan/subjects/{code}/move` with body `{"from":1,"to":2,"index":0}`
pub async fn move_to<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path((student_id, code)): Path<(Uuid, String)>,
  headers: HeaderMap,
  Json(body): Json<MoveBody>,
) -> Result<Response, ApiError> {
  let MoveBody { from, to, index } = body;
  respond_to(&service, student_id, Mutation::MoveSubject { code, from, to, index }, &headers)
    .await
}

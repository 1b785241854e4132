//! Handlers for `/students/{id}/plan/semesters` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/semesters` | Body: optional `{"period":"2025-1"}`; number is assigned |
//! | `DELETE` | `/semesters/{number}` | Later semesters are renumbered |
//! | `POST`   | `/semesters/{number}/subjects` | Body: a subject draft |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
  response::Response,
};
use curricula_core::{
  mutation::Mutation, semester::SemesterDraft, store::PlanStore, subject::SubjectDraft,
};
use curricula_service::PlanService;
use uuid::Uuid;

use crate::{error::ApiError, plan::respond_to};

/// `POST /students/{id}/plan/semesters`
pub async fn create<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path(student_id): Path<Uuid>,
  headers: HeaderMap,
  draft: Option<Json<SemesterDraft>>,
) -> Result<Response, ApiError> {
  let draft = draft.map(|Json(d)| d).unwrap_or_default();
  respond_to(&service, student_id, Mutation::CreateSemester { draft }, &headers).await
}

/// `DELETE /students/{id}/plan/semesters/{number}`
pub async fn delete<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path((student_id, number)): Path<(Uuid, u32)>,
  headers: HeaderMap,
) -> Result<Response, ApiError> {
  respond_to(&service, student_id, Mutation::DeleteSemester { number }, &headers).await
}

/// `POST /students/{id}/plan/semesters/{number}/subjects`
pub async fn add_subject<S: PlanStore + 'static>(
  State(service): State<Arc<PlanService<S>>>,
  Path((student_id, semester)): Path<(Uuid, u32)>,
  headers: HeaderMap,
  Json(draft): Json<SubjectDraft>,
) -> Result<Response, ApiError> {
  respond_to(&service, student_id, Mutation::AddSubject { semester, draft }, &headers).await
}

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{candidate, design_review};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::candidate::*;
use crate::state::AppState;
use crate::workflow::documents::{document_paths, remove_unreferenced_blobs};

/// Find a candidate by ID or return 404.
async fn find_candidate<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<candidate::Model, AppError> {
    candidate::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Candidates",
    operation_id = "createCandidate",
    summary = "Register a candidate",
    request_body = CreateCandidateRequest,
    responses(
        (status = 201, description = "Candidate created", body = CandidateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_candidate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCandidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_candidate(&payload.name, &payload.designation)?;

    let now = Utc::now();
    let model = candidate::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        designation: Set(payload.designation.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(candidate_id = model.id, "Candidate created");
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Candidates",
    operation_id = "listCandidates",
    summary = "List candidates",
    description = "Returns all candidates, newest first.",
    responses(
        (status = 200, description = "All candidates", body = Vec<CandidateResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let candidates = candidate::Entity::find()
        .order_by_desc(candidate::Column::CreatedAt)
        .order_by_desc(candidate::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Candidates",
    operation_id = "getCandidate",
    summary = "Get a candidate by ID",
    params(("id" = i32, Path, description = "Candidate ID")),
    responses(
        (status = 200, description = "Candidate", body = CandidateResponse),
        (status = 404, description = "Candidate not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CandidateResponse>, AppError> {
    let model = find_candidate(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Candidates",
    operation_id = "deleteCandidate",
    summary = "Delete a candidate",
    description = "Deletes the candidate and, by cascade, all of their design reviews. Their \
        stored files are removed.",
    params(("id" = i32, Path, description = "Candidate ID")),
    responses(
        (status = 204, description = "Candidate deleted"),
        (status = 404, description = "Candidate not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let model = find_candidate(&state.db, id).await?;

    let review_ids: Vec<i32> = design_review::Entity::find()
        .select_only()
        .column(design_review::Column::Id)
        .filter(design_review::Column::CandidateId.eq(model.id))
        .into_tuple()
        .all(&state.db)
        .await?;
    let paths = document_paths(&state.db, review_ids.iter().copied()).await?;

    candidate::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;
    let removed = remove_unreferenced_blobs(&state.db, &*state.blobs, paths).await?;

    info!(
        candidate_id = id,
        reviews = review_ids.len(),
        blobs_removed = removed,
        "Candidate deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

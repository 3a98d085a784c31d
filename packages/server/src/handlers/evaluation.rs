use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::design_review_score;
use crate::error::{AppError, ErrorBody};
use crate::models::evaluation::*;
use crate::models::review::TransitionResponse;
use crate::queue::enqueue_review_job;
use crate::state::AppState;
use crate::workflow::find_review;
use crate::workflow::transitions::{self, TransitionOutcome};

async fn finish_transition(state: &AppState, outcome: TransitionOutcome) -> TransitionResponse {
    let job_enqueued = outcome.job.is_some();
    if let Some(job) = &outcome.job {
        enqueue_review_job(state, job).await;
    }
    TransitionResponse {
        review_id: outcome.review.id,
        previous_status: outcome.previous_status,
        status: outcome.review.status,
        job_enqueued,
    }
}

#[utoipa::path(
    post,
    path = "/{id}/evaluate/",
    tag = "Evaluation",
    operation_id = "triggerEvaluation",
    summary = "Queue an evaluation",
    description = "Re-runs evaluation for a fully answered review. Accepted while the review is \
        `QuestionsGenerated`, `InProgress`, `Reviewed` or `Error`. A job already in flight is \
        superseded and its outcome ignored.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 200, description = "Evaluation queued", body = TransitionResponse),
        (status = 400, description = "Not all questions answered (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Review cannot be evaluated in its status (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn trigger_evaluation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TransitionResponse>, AppError> {
    let outcome = transitions::trigger_evaluation(&state.db, id).await?;
    Ok(Json(finish_transition(&state, outcome).await))
}

#[utoipa::path(
    post,
    path = "/{id}/retry/",
    tag = "Evaluation",
    operation_id = "retryReview",
    summary = "Retry a failed review",
    description = "Moves a review out of `Error`. Without questions it returns to `Pending` and \
        generation is queued; fully answered it returns to `InProgress` and evaluation is \
        queued; otherwise it returns to `QuestionsGenerated`.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 200, description = "Review retried", body = TransitionResponse),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Review is not in Error (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn retry_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TransitionResponse>, AppError> {
    let outcome = transitions::retry_review(&state.db, id).await?;
    Ok(Json(finish_transition(&state, outcome).await))
}

#[utoipa::path(
    get,
    path = "/{id}/evaluation/",
    tag = "Evaluation",
    operation_id = "getEvaluation",
    summary = "Get the evaluation of a review",
    description = "Returns the stored score, or `{\"evaluated\": false, \"status\": ...}` when \
        the review has not been evaluated.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 200, description = "Evaluation or current status", body = EvaluationResponse),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let review = find_review(&state.db, id).await?;

    let score = design_review_score::Entity::find()
        .filter(design_review_score::Column::ReviewId.eq(review.id))
        .one(&state.db)
        .await?;

    let response = match score {
        Some(score) => EvaluationResponse::Evaluated(EvaluatedResponse {
            evaluated: true,
            review_id: review.id,
            status: review.status,
            overall_score: review.overall_score,
            score: score.into(),
        }),
        None => EvaluationResponse::NotEvaluated(NotEvaluatedResponse {
            evaluated: false,
            status: review.status,
        }),
    };
    Ok(Json(response))
}

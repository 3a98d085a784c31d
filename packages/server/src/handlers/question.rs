use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::probing_question;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::question::*;
use crate::queue::enqueue_review_job;
use crate::state::AppState;
use crate::workflow::answers::{AnswerOutcome, answer_counts, submit_answers, submit_single_answer};
use crate::workflow::find_review;

async fn finish_answer(state: &AppState, outcome: AnswerOutcome) -> AnswerResponse {
    let evaluation_triggered = outcome.evaluation_job.is_some();
    if let Some(job) = &outcome.evaluation_job {
        enqueue_review_job(state, job).await;
    }

    AnswerResponse {
        review_id: outcome.review.id,
        status: outcome.review.status,
        answered_count: outcome.answered_count,
        total_count: outcome.total_count,
        evaluation_triggered,
        answered: outcome
            .answered
            .into_iter()
            .map(QuestionResponse::from)
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/{id}/questions/",
    tag = "Questions",
    operation_id = "listReviewQuestions",
    summary = "List the questions of a review",
    description = "Returns generated questions in generation order with answer progress. \
        Empty while the review is still `Pending`.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 200, description = "Questions", body = QuestionListResponse),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_questions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionListResponse>, AppError> {
    let review = find_review(&state.db, id).await?;

    let questions = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review.id))
        .order_by_asc(probing_question::Column::Position)
        .order_by_asc(probing_question::Column::Id)
        .all(&state.db)
        .await?;
    let (total_count, answered_count) = answer_counts(&state.db, review.id).await?;

    Ok(Json(QuestionListResponse {
        review_id: review.id,
        status: review.status,
        answered_count,
        total_count,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/questions/answer/",
    tag = "Questions",
    operation_id = "answerReviewQuestions",
    summary = "Answer several questions of a review",
    description = "Writes every answer or none. Each `question_id` must belong to the review; \
        offending ids are listed in `details`. Answering the last open question moves the \
        review to `InProgress` and queues its evaluation once.",
    params(("id" = i32, Path, description = "Design review ID")),
    request_body = BatchAnswerRequest,
    responses(
        (status = 200, description = "Answers stored", body = AnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(count = payload.answers.len()))]
pub async fn answer_questions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<BatchAnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    validate_batch_answers(&payload)?;

    let outcome = submit_answers(&state.db, id, &payload.answers).await?;
    info!(
        review_id = id,
        answered_count = outcome.answered_count,
        total_count = outcome.total_count,
        "Answers stored"
    );

    Ok(Json(finish_answer(&state, outcome).await))
}

#[utoipa::path(
    post,
    path = "/{id}/answer/",
    tag = "Questions",
    operation_id = "answerQuestion",
    summary = "Answer one question",
    description = "Stores the answer, replacing any earlier one. An empty answer counts as answered.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = SingleAnswerRequest,
    responses(
        (status = 200, description = "Answer stored", body = AnswerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn answer_question(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SingleAnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    validate_answer(&payload.answer)?;

    let outcome = submit_single_answer(&state.db, id, payload.answer).await?;
    info!(
        question_id = id,
        review_id = outcome.review.id,
        answered_count = outcome.answered_count,
        "Answer stored"
    );

    Ok(Json(finish_answer(&state, outcome).await))
}

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{design_document, design_review, design_review_score, probing_question};
use crate::error::{AppError, ErrorBody};
use crate::models::evaluation::ScoreResponse;
use crate::models::question::QuestionResponse;
use crate::models::review::*;
use crate::queue::enqueue_review_job;
use crate::state::AppState;
use crate::workflow::documents::{document_paths, remove_unreferenced_blobs};
use crate::workflow::find_review;
use crate::workflow::intake::{IntakeForm, UploadedFile, submit_review};

pub fn intake_body_limit(limit: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(limit)
}

/// Load documents, questions and score for a review response.
pub(crate) async fn build_review_response<C: ConnectionTrait>(
    db: &C,
    review: design_review::Model,
) -> Result<ReviewResponse, AppError> {
    let documents = design_document::Entity::find()
        .filter(design_document::Column::ReviewId.eq(review.id))
        .order_by_asc(design_document::Column::Id)
        .all(db)
        .await?;

    let questions = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review.id))
        .order_by_asc(probing_question::Column::Position)
        .order_by_asc(probing_question::Column::Id)
        .all(db)
        .await?;

    let score = design_review_score::Entity::find()
        .filter(design_review_score::Column::ReviewId.eq(review.id))
        .one(db)
        .await?;

    Ok(ReviewResponse::new(
        review,
        documents.into_iter().map(DocumentResponse::from).collect(),
        questions.into_iter().map(QuestionResponse::from).collect(),
        score.map(ScoreResponse::from),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Design Reviews",
    operation_id = "submitDesignReview",
    summary = "Submit a design review",
    description = "Creates a design review from the six narrative text fields and any number of \
        `files` parts, then queues question generation. The candidate is either an existing \
        `candidate_id` or a new `candidate_name` plus `candidate_designation`. \
        Each file is stored independently: the `files` report lists which were stored and why \
        others failed. Files are stored under their name, so a later upload with the same name \
        replaces the bytes (the recorded `content_hash` detects this).",
    request_body(content_type = "multipart/form-data", description = "Narrative fields, candidate and design documents"),
    responses(
        (status = 201, description = "Review created", body = IntakeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Candidate not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn submit_design_review(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = IntakeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "files" {
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
            form.push_file(UploadedFile {
                file_name,
                data: data.to_vec(),
            });
        } else if IntakeForm::is_text_field(&name) {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
            form.set_text(&name, text);
        }
    }

    let request = form.into_request()?;
    let result = submit_review(&state.db, &*state.blobs, request).await?;

    enqueue_review_job(&state, &result.job).await;

    let review = build_review_response(&state.db, result.review).await?;
    Ok((
        StatusCode::CREATED,
        Json(IntakeResponse {
            review,
            files: result.files,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Design Reviews",
    operation_id = "getDesignReview",
    summary = "Get a design review",
    description = "Returns the review with its documents, questions in generation order and score.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 200, description = "Design review", body = ReviewResponse),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_design_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = find_review(&state.db, id).await?;
    Ok(Json(build_review_response(&state.db, review).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Design Reviews",
    operation_id = "deleteDesignReview",
    summary = "Delete a design review",
    description = "Deletes the review with its documents, questions and score, and removes the \
        stored files. A job still in flight for this review is dropped when its outcome arrives.",
    params(("id" = i32, Path, description = "Design review ID")),
    responses(
        (status = 204, description = "Design review deleted"),
        (status = 404, description = "Design review not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_design_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let review = find_review(&state.db, id).await?;

    let paths = document_paths(&state.db, [review.id]).await?;
    design_review::Entity::delete_by_id(review.id)
        .exec(&state.db)
        .await?;
    let removed = remove_unreferenced_blobs(&state.db, &*state.blobs, paths).await?;

    info!(review_id = id, blobs_removed = removed, "Design review deleted");
    Ok(StatusCode::NO_CONTENT)
}

use std::collections::HashMap;

use chrono::Utc;
use common::review_job::{ReviewJob, new_job_id};
use common::{ReviewStatus, detect_completion};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::entity::{design_review, probing_question};
use crate::error::AppError;
use crate::models::question::AnswerItem;

use super::{lock_review, snapshot, transition};

/// State of a review after an answer write.
pub struct AnswerOutcome {
    pub review: design_review::Model,
    pub answered: Vec<probing_question::Model>,
    pub total_count: u64,
    pub answered_count: u64,
    /// Set when this write completed the review. Enqueue after return.
    pub evaluation_job: Option<ReviewJob>,
}

/// Count questions and answered questions of a review.
pub async fn answer_counts<C: ConnectionTrait>(
    db: &C,
    review_id: i32,
) -> Result<(u64, u64), AppError> {
    let total = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review_id))
        .count(db)
        .await?;
    let answered = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review_id))
        .filter(probing_question::Column::Answer.is_not_null())
        .count(db)
        .await?;
    Ok((total, answered))
}

/// Write all answers of a batch in one transaction, or none of them.
///
/// Every question id must belong to `review_id`; otherwise the request
/// fails listing each offending id.
#[instrument(skip(db, answers), fields(count = answers.len()))]
pub async fn submit_answers(
    db: &DatabaseConnection,
    review_id: i32,
    answers: &[AnswerItem],
) -> Result<AnswerOutcome, AppError> {
    let txn = db.begin().await?;

    let review = lock_review(&txn, review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Design review not found".into()))?;

    let ids: Vec<i32> = answers.iter().map(|a| a.question_id).collect();
    let found: HashMap<i32, probing_question::Model> = probing_question::Entity::find()
        .filter(probing_question::Column::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let details: Vec<String> = answers
        .iter()
        .filter_map(|a| match found.get(&a.question_id) {
            None => Some(format!("Question {} not found", a.question_id)),
            Some(q) if q.review_id != review_id => Some(format!(
                "Question {} does not belong to review {review_id}",
                a.question_id
            )),
            Some(_) => None,
        })
        .collect();

    if !details.is_empty() {
        return Err(AppError::ValidationDetails {
            message: "Some question ids are not part of this review".into(),
            details,
        });
    }

    let now = Utc::now();
    let mut answered = Vec::with_capacity(answers.len());
    for item in answers {
        let update = probing_question::ActiveModel {
            id: Set(item.question_id),
            answer: Set(Some(item.answer.clone())),
            updated_at: Set(now),
            ..Default::default()
        };
        answered.push(update.update(&txn).await?);
    }

    let outcome = after_answer_write(&txn, review, answered).await?;
    txn.commit().await?;

    Ok(outcome)
}

/// Write one answer. An empty string counts as answered.
#[instrument(skip(db, answer))]
pub async fn submit_single_answer(
    db: &DatabaseConnection,
    question_id: i32,
    answer: String,
) -> Result<AnswerOutcome, AppError> {
    let txn = db.begin().await?;

    let question = probing_question::Entity::find_by_id(question_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

    // Review first, then question: the same lock order as the batch path.
    let review = lock_review(&txn, question.review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Design review not found".into()))?;

    let updated = probing_question::ActiveModel {
        id: Set(question.id),
        answer: Set(Some(answer)),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .update(&txn)
    .await?;

    let outcome = after_answer_write(&txn, review, vec![updated]).await?;
    txn.commit().await?;

    Ok(outcome)
}

/// Run completion detection on a locked review and advance it on the completion edge.
///
/// Only a review in `QuestionsGenerated` advances, so answers arriving while
/// it is `InProgress` or `Reviewed` never queue a second evaluation.
async fn after_answer_write<C: ConnectionTrait>(
    txn: &C,
    review: design_review::Model,
    answered: Vec<probing_question::Model>,
) -> Result<AnswerOutcome, AppError> {
    let (total_count, answered_count) = answer_counts(txn, review.id).await?;
    let completion = detect_completion(total_count, answered_count);

    if !(completion.advance_status && review.status == ReviewStatus::QuestionsGenerated) {
        return Ok(AnswerOutcome {
            review,
            answered,
            total_count,
            answered_count,
            evaluation_job: None,
        });
    }

    let job_id = new_job_id();
    let mut update = transition(&review, ReviewStatus::InProgress, Utc::now())?;
    update.active_job_id = Set(Some(job_id.clone()));
    let review = update.update(txn).await?;

    let job = snapshot::evaluation_job(txn, &review, job_id).await?;

    info!(
        review_id = review.id,
        job_id = %job.job_id,
        total_count,
        "All questions answered, evaluation queued"
    );

    Ok(AnswerOutcome {
        review,
        answered,
        total_count,
        answered_count,
        evaluation_job: Some(job),
    })
}

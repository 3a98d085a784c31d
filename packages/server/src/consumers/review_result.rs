use std::sync::Arc;

use chrono::Utc;
use common::review_outcome::{
    EvaluationScores, GeneratedQuestion, OutcomeKind, ReviewOutcome, validate_questions,
};
use common::{DocumentStatus, ReviewErrorCode, ReviewStatus, ScoreStatus};
use mq::{BroccoliError, BrokerMessage, Mq};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{error, info, instrument};

use super::mark_review_error;
use crate::entity::{design_document, design_review, design_review_score, probing_question};
use crate::workflow::{lock_review, transition};

/// What applying an outcome did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The outcome was persisted.
    Applied,
    /// The outcome was dropped without writes.
    Ignored(&'static str),
    /// The outcome was invalid and the review was marked `Error`.
    Rejected,
}

/// Consume worker outcomes from the result queue.
pub async fn consume_review_outcomes(db: DatabaseConnection, mq: Arc<Mq>, queue_name: String) {
    info!(queue = %queue_name, "Starting review outcome consumer");

    let result = mq
        .process_messages(
            &queue_name,
            None, // single-threaded for sequential DB writes
            None,
            move |message: BrokerMessage<ReviewOutcome>| {
                let db = db.clone();
                async move {
                    let outcome = message.payload;
                    let review_id = outcome.review_id;
                    let job_id = outcome.job_id.clone();

                    if let Err(e) = apply_outcome(&db, outcome).await {
                        error!(
                            review_id,
                            job_id = %job_id,
                            error = %e,
                            "Failed to apply review outcome"
                        );
                        return Err(BroccoliError::Job(e.to_string()));
                    }
                    Ok(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Review outcome consumer stopped unexpectedly");
    }
}

/// Apply one worker outcome atomically under the review row lock.
///
/// Outcomes for deleted reviews, for a job id other than the review's
/// `active_job_id`, or for a review that already moved on are ignored.
#[instrument(
    skip_all,
    fields(review_id = outcome.review_id, job_id = %outcome.job_id, kind = outcome.kind.as_str())
)]
pub async fn apply_outcome(
    db: &DatabaseConnection,
    outcome: ReviewOutcome,
) -> anyhow::Result<Applied> {
    let txn = db.begin().await?;

    let Some(review) = lock_review(&txn, outcome.review_id).await? else {
        info!("Review no longer exists, dropping outcome");
        txn.rollback().await?;
        return Ok(Applied::Ignored("review deleted"));
    };

    if review.active_job_id.as_deref() != Some(outcome.job_id.as_str()) {
        info!(
            active_job_id = ?review.active_job_id,
            "Outcome is for a superseded job, skipping"
        );
        txn.rollback().await?;
        return Ok(Applied::Ignored("stale job"));
    }

    let applied = match outcome.kind {
        OutcomeKind::QuestionsGenerated { questions } => {
            apply_questions(&txn, review, questions).await?
        }
        OutcomeKind::Evaluated { scores, .. } => apply_scores(&txn, review, scores).await?,
    };

    txn.commit().await?;
    Ok(applied)
}

async fn apply_questions(
    txn: &DatabaseTransaction,
    review: design_review::Model,
    questions: Vec<GeneratedQuestion>,
) -> anyhow::Result<Applied> {
    if review.status != ReviewStatus::Pending {
        info!(status = %review.status, "Review is not awaiting questions, skipping");
        return Ok(Applied::Ignored("not pending"));
    }

    let existing = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review.id))
        .count(txn)
        .await?;
    if existing > 0 {
        info!(existing, "Review already has questions, skipping");
        return Ok(Applied::Ignored("already has questions"));
    }

    if let Err(e) = validate_questions(&questions) {
        mark_review_error(
            txn,
            &review,
            ReviewErrorCode::OUTCOME_PROCESSING_FAILED,
            &e.to_string(),
        )
        .await?;
        return Ok(Applied::Rejected);
    }

    let now = Utc::now();
    let count = questions.len();
    let rows = questions
        .into_iter()
        .enumerate()
        .map(|(position, q)| probing_question::ActiveModel {
            question: Set(q.question),
            answer: Set(None),
            difficulty: Set(q.difficulty),
            category: Set(q.category),
            position: Set(position as i32),
            review_id: Set(review.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        });
    probing_question::Entity::insert_many(rows)
        .exec_without_returning(txn)
        .await?;

    let mut update = transition(&review, ReviewStatus::QuestionsGenerated, now)?;
    update.active_job_id = Set(None);
    update.update(txn).await?;

    let analyzed = design_document::Entity::update_many()
        .col_expr(
            design_document::Column::Status,
            Expr::value(DocumentStatus::Analyzed),
        )
        .col_expr(design_document::Column::UpdatedAt, Expr::value(now))
        .filter(design_document::Column::ReviewId.eq(review.id))
        .filter(design_document::Column::Status.eq(DocumentStatus::Pending))
        .exec(txn)
        .await?;

    info!(
        questions = count,
        documents_analyzed = analyzed.rows_affected,
        "Stored generated questions"
    );

    Ok(Applied::Applied)
}

async fn apply_scores(
    txn: &DatabaseTransaction,
    review: design_review::Model,
    scores: EvaluationScores,
) -> anyhow::Result<Applied> {
    if review.status != ReviewStatus::InProgress {
        info!(status = %review.status, "Review is not awaiting evaluation, skipping");
        return Ok(Applied::Ignored("not in progress"));
    }

    if let Err(e) = scores.validate() {
        mark_review_error(
            txn,
            &review,
            ReviewErrorCode::OUTCOME_PROCESSING_FAILED,
            &e.to_string(),
        )
        .await?;
        return Ok(Applied::Rejected);
    }

    let now = Utc::now();
    let overall_percent = scores.overall_percent();

    let mut update = transition(&review, ReviewStatus::Reviewed, now)?;
    update.overall_score = Set(Some(overall_percent));
    update.active_job_id = Set(None);
    update.error_code = Set(None);
    update.error_message = Set(None);
    update.update(txn).await?;

    let score = design_review_score::ActiveModel {
        technical_depth: Set(scores.technical_depth),
        system_design: Set(scores.system_design),
        tradeoff: Set(scores.tradeoff),
        ownership: Set(scores.ownership),
        overall_score: Set(scores.overall()),
        feedback_summary: Set(scores.feedback_summary.clone()),
        status: Set(ScoreStatus::Completed),
        reviewed_at: Set(Some(now)),
        review_id: Set(review.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    design_review_score::Entity::insert(score)
        .on_conflict(
            OnConflict::column(design_review_score::Column::ReviewId)
                .update_columns([
                    design_review_score::Column::TechnicalDepth,
                    design_review_score::Column::SystemDesign,
                    design_review_score::Column::Tradeoff,
                    design_review_score::Column::Ownership,
                    design_review_score::Column::OverallScore,
                    design_review_score::Column::FeedbackSummary,
                    design_review_score::Column::Status,
                    design_review_score::Column::ReviewedAt,
                    design_review_score::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

    info!(
        overall_score = overall_percent,
        technical_depth = scores.technical_depth,
        system_design = scores.system_design,
        tradeoff = scores.tradeoff,
        ownership = scores.ownership,
        "Stored evaluation"
    );

    Ok(Applied::Applied)
}

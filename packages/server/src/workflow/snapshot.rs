//! Builds the job snapshots handed to the worker.

use common::DocumentStatus;
use common::review_job::{
    CandidateProfile, DocumentRef, ReviewJob, ReviewJobKind, ReviewNarrative, TranscriptEntry,
};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::{candidate, design_document, design_review, probing_question};

pub fn narrative_of(review: &design_review::Model) -> ReviewNarrative {
    ReviewNarrative {
        problem_description: review.problem_description.clone(),
        proposed_architecture: review.proposed_architecture.clone(),
        design_tradeoffs: review.design_tradeoffs.clone(),
        scalability: review.scalability.clone(),
        security_measures: review.security_measures.clone(),
        maintainability: review.maintainability.clone(),
    }
}

/// Documents the worker should attach, in upload order. Failed ones are left out.
pub async fn document_refs<C: ConnectionTrait>(
    db: &C,
    review_id: i32,
) -> Result<Vec<DocumentRef>, DbErr> {
    let documents = design_document::Entity::find()
        .filter(design_document::Column::ReviewId.eq(review_id))
        .filter(design_document::Column::Status.ne(DocumentStatus::Error))
        .order_by_asc(design_document::Column::Id)
        .all(db)
        .await?;

    Ok(documents
        .into_iter()
        .map(|d| DocumentRef {
            document_id: d.id,
            path: d.path,
            media_type: d.media_type,
            content_hash: d.content_hash,
        })
        .collect())
}

/// Questions with their current answers in generation order.
pub async fn transcript<C: ConnectionTrait>(
    db: &C,
    review_id: i32,
) -> Result<Vec<TranscriptEntry>, DbErr> {
    let questions = probing_question::Entity::find()
        .filter(probing_question::Column::ReviewId.eq(review_id))
        .order_by_asc(probing_question::Column::Position)
        .order_by_asc(probing_question::Column::Id)
        .all(db)
        .await?;

    Ok(questions
        .into_iter()
        .map(|q| TranscriptEntry {
            question_id: q.id,
            question: q.question,
            answer: q.answer,
        })
        .collect())
}

pub async fn generation_job<C: ConnectionTrait>(
    db: &C,
    review: &design_review::Model,
    job_id: String,
) -> Result<ReviewJob, DbErr> {
    let documents = document_refs(db, review.id).await?;
    Ok(ReviewJob::with_id(
        job_id,
        review.id,
        narrative_of(review),
        documents,
        ReviewJobKind::GenerateQuestions,
    ))
}

pub async fn evaluation_job<C: ConnectionTrait>(
    db: &C,
    review: &design_review::Model,
    job_id: String,
) -> Result<ReviewJob, DbErr> {
    let candidate = candidate::Entity::find_by_id(review.candidate_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "Candidate {} of review {}",
                review.candidate_id, review.id
            ))
        })?;

    let documents = document_refs(db, review.id).await?;
    let transcript = transcript(db, review.id).await?;

    Ok(ReviewJob::with_id(
        job_id,
        review.id,
        narrative_of(review),
        documents,
        ReviewJobKind::Evaluate {
            candidate: CandidateProfile {
                name: candidate.name,
                designation: candidate.designation,
            },
            transcript,
        },
    ))
}

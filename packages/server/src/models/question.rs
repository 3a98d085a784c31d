use common::ReviewStatus;
use common::review_outcome::QuestionCategory;
use serde::{Deserialize, Serialize};

use crate::entity::probing_question;
use crate::error::AppError;

use super::shared::duplicate_ids;

/// Longest accepted answer, in Unicode characters.
pub const MAX_ANSWER_LEN: usize = 5000;

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "How does the ingest path behave when the queue is unavailable?")]
    pub question: String,
    /// `null` until answered.
    #[schema(example = "Producers buffer locally for up to five minutes.")]
    pub answer: Option<String>,
    /// 1 (basic) to 10 (expert).
    #[schema(example = 7)]
    pub difficulty: i32,
    pub category: QuestionCategory,
    #[schema(example = 0)]
    pub position: i32,
}

impl From<probing_question::Model> for QuestionResponse {
    fn from(m: probing_question::Model) -> Self {
        Self {
            id: m.id,
            question: m.question,
            answer: m.answer,
            difficulty: m.difficulty,
            category: m.category,
            position: m.position,
        }
    }
}

/// Questions of a review with answer progress.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionListResponse {
    #[schema(example = 7)]
    pub review_id: i32,
    pub status: ReviewStatus,
    #[schema(example = 3)]
    pub answered_count: u64,
    #[schema(example = 6)]
    pub total_count: u64,
    pub questions: Vec<QuestionResponse>,
}

/// One answer in a batch submission.
#[derive(Clone, Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerItem {
    #[schema(example = 12)]
    pub question_id: i32,
    /// Omitted answers are stored as an empty string, which counts as answered.
    #[serde(default)]
    #[schema(example = "Producers buffer locally for up to five minutes.")]
    pub answer: String,
}

/// Request body for answering several questions of one review.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BatchAnswerRequest {
    pub answers: Vec<AnswerItem>,
}

/// Request body for answering a single question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SingleAnswerRequest {
    /// Omitted answers are stored as an empty string, which counts as answered.
    #[serde(default)]
    #[schema(example = "We shard by tenant id.")]
    pub answer: String,
}

/// Result of an answer write.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnswerResponse {
    #[schema(example = 7)]
    pub review_id: i32,
    /// Review status after the write.
    pub status: ReviewStatus,
    #[schema(example = 6)]
    pub answered_count: u64,
    #[schema(example = 6)]
    pub total_count: u64,
    /// True when this write completed the review and queued its evaluation.
    #[schema(example = true)]
    pub evaluation_triggered: bool,
    /// The questions written by this request.
    pub answered: Vec<QuestionResponse>,
}

pub fn validate_answer(answer: &str) -> Result<(), AppError> {
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(AppError::Validation(format!(
            "Answer must be at most {MAX_ANSWER_LEN} characters"
        )));
    }
    Ok(())
}

/// Check a batch body before touching the database, reporting every problem found.
pub fn validate_batch_answers(payload: &BatchAnswerRequest) -> Result<(), AppError> {
    if payload.answers.is_empty() {
        return Err(AppError::Validation("Answers must not be empty".into()));
    }

    let mut details: Vec<String> = duplicate_ids(payload.answers.iter().map(|a| a.question_id))
        .into_iter()
        .map(|id| format!("Question {id} appears more than once"))
        .collect();

    for item in &payload.answers {
        if item.answer.chars().count() > MAX_ANSWER_LEN {
            details.push(format!(
                "Answer for question {} exceeds {MAX_ANSWER_LEN} characters",
                item.question_id
            ));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationDetails {
            message: "Invalid answers".into(),
            details,
        })
    }
}

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::mq::Message;

/// Allowed difficulty for a generated question.
pub const DIFFICULTY_RANGE: RangeInclusive<i32> = 1..=10;
/// Allowed value for each evaluation sub-score.
pub const SUB_SCORE_RANGE: RangeInclusive<i32> = 1..=5;
/// How many questions a generation run must produce.
pub const QUESTION_COUNT_RANGE: RangeInclusive<usize> = 5..=10;

/// Topic a probing question targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum QuestionCategory {
    /// Component boundaries and overall structure.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Architecture"))]
    Architecture,
    /// Growth in load and data volume.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Scalability"))]
    Scalability,
    /// Access control and data protection.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Security"))]
    Security,
    /// Latency and throughput.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Performance"))]
    Performance,
    /// Choice and application of established patterns.
    #[serde(rename = "Design Patterns")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Design Patterns"))]
    DesignPatterns,
    /// How data moves and is stored between components.
    #[serde(rename = "Data Flow")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Data Flow"))]
    DataFlow,
    /// Interfaces with external systems and services.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Integration"))]
    Integration,
    /// Release and operation in production.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Deployment"))]
    Deployment,
}

impl QuestionCategory {
    pub const ALL: &'static [QuestionCategory] = &[
        Self::Architecture,
        Self::Scalability,
        Self::Security,
        Self::Performance,
        Self::DesignPatterns,
        Self::DataFlow,
        Self::Integration,
        Self::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "Architecture",
            Self::Scalability => "Scalability",
            Self::Security => "Security",
            Self::Performance => "Performance",
            Self::DesignPatterns => "Design Patterns",
            Self::DataFlow => "Data Flow",
            Self::Integration => "Integration",
            Self::Deployment => "Deployment",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured generator output failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Generator output is not valid JSON for {target}: {reason}")]
    Malformed { target: &'static str, reason: String },

    #[error("Expected {min}-{max} questions, got {actual}")]
    QuestionCount {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' is out of range: {value}")]
    OutOfRange { field: String, value: i32 },

    #[error("Field '{field}' must not be empty")]
    Empty { field: String },
}

/// One question proposed by the generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub difficulty: i32,
    pub category: QuestionCategory,
}

impl GeneratedQuestion {
    fn validate(&self, index: usize) -> Result<(), SchemaError> {
        if self.question.trim().is_empty() {
            return Err(SchemaError::Empty {
                field: format!("questions[{index}].question"),
            });
        }
        if !DIFFICULTY_RANGE.contains(&self.difficulty) {
            return Err(SchemaError::OutOfRange {
                field: format!("questions[{index}].difficulty"),
                value: self.difficulty,
            });
        }
        Ok(())
    }
}

/// Validate a full generation batch.
pub fn validate_questions(questions: &[GeneratedQuestion]) -> Result<(), SchemaError> {
    if !QUESTION_COUNT_RANGE.contains(&questions.len()) {
        return Err(SchemaError::QuestionCount {
            min: *QUESTION_COUNT_RANGE.start(),
            max: *QUESTION_COUNT_RANGE.end(),
            actual: questions.len(),
        });
    }
    questions
        .iter()
        .enumerate()
        .try_for_each(|(i, q)| q.validate(i))
}

/// Rubric scores returned by the evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub technical_depth: i32,
    pub system_design: i32,
    pub tradeoff: i32,
    pub ownership: i32,
    pub feedback_summary: String,
}

impl EvaluationScores {
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (field, value) in [
            ("technical_depth", self.technical_depth),
            ("system_design", self.system_design),
            ("tradeoff", self.tradeoff),
            ("ownership", self.ownership),
        ] {
            if !SUB_SCORE_RANGE.contains(&value) {
                return Err(SchemaError::OutOfRange {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if self.feedback_summary.trim().is_empty() {
            return Err(SchemaError::Empty {
                field: "feedback_summary".to_string(),
            });
        }
        Ok(())
    }

    /// Unweighted mean of the four sub-scores (1.0-5.0).
    pub fn overall(&self) -> f64 {
        f64::from(self.technical_depth + self.system_design + self.tradeoff + self.ownership) / 4.0
    }

    /// Overall score scaled to 0-100 for the review row.
    pub fn overall_percent(&self) -> i32 {
        (self.overall() * 20.0).round() as i32
    }
}

/// What the worker produced for a job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    QuestionsGenerated { questions: Vec<GeneratedQuestion> },
    Evaluated { scores: EvaluationScores, overall: f64 },
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuestionsGenerated { .. } => "questions_generated",
            Self::Evaluated { .. } => "evaluated",
        }
    }
}

/// Result published by the worker after a successful job attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// Job this outcome answers. Compared against the review's `active_job_id`.
    pub job_id: String,
    pub review_id: i32,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

impl ReviewOutcome {
    pub fn questions_generated(
        job_id: impl Into<String>,
        review_id: i32,
        questions: Vec<GeneratedQuestion>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            review_id,
            kind: OutcomeKind::QuestionsGenerated { questions },
        }
    }

    pub fn evaluated(job_id: impl Into<String>, review_id: i32, scores: EvaluationScores) -> Self {
        let overall = scores.overall();
        Self {
            job_id: job_id.into(),
            review_id,
            kind: OutcomeKind::Evaluated { scores, overall },
        }
    }
}

impl Message for ReviewOutcome {
    fn message_type() -> &'static str {
        "review_outcome"
    }

    fn message_id(&self) -> &str {
        &self.job_id
    }

    fn review_id(&self) -> Option<i32> {
        Some(self.review_id)
    }
}

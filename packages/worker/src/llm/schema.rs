//! Response schemas sent to the generator and typed decoding of what comes back.

use common::review_outcome::{
    EvaluationScores, GeneratedQuestion, QuestionCategory, SchemaError, validate_questions,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Schema for a question generation response: `{"Questions": [...]}`.
pub fn questions_schema() -> Value {
    let categories: Vec<&str> = QuestionCategory::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "OBJECT",
        "required": ["Questions"],
        "properties": {
            "Questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "required": ["question", "difficulty", "category"],
                    "properties": {
                        "question": {"type": "STRING"},
                        "difficulty": {"type": "INTEGER"},
                        "category": {"type": "STRING", "enum": categories}
                    }
                }
            }
        }
    })
}

/// Schema for an evaluation response wrapped in `designReviewScore`.
pub fn evaluation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "required": ["designReviewScore"],
        "properties": {
            "designReviewScore": {
                "type": "OBJECT",
                "required": [
                    "technicalDepth",
                    "systemDesign",
                    "tradeoff",
                    "ownership",
                    "detailedFeedbackSummary"
                ],
                "properties": {
                    "technicalDepth": {"type": "INTEGER"},
                    "systemDesign": {"type": "INTEGER"},
                    "tradeoff": {"type": "INTEGER"},
                    "ownership": {"type": "INTEGER"},
                    "detailedFeedbackSummary": {"type": "STRING"}
                }
            }
        }
    })
}

#[derive(Deserialize)]
struct QuestionsEnvelope {
    #[serde(rename = "Questions", alias = "questions")]
    questions: Vec<GeneratedQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScores {
    technical_depth: i32,
    system_design: i32,
    tradeoff: i32,
    ownership: i32,
    detailed_feedback_summary: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEvaluation {
    Wrapped {
        #[serde(rename = "designReviewScore")]
        design_review_score: RawScores,
    },
    Bare(RawScores),
}

/// Decode and validate a question generation response.
pub fn decode_questions(value: Value) -> Result<Vec<GeneratedQuestion>, SchemaError> {
    let envelope: QuestionsEnvelope =
        serde_json::from_value(value).map_err(|e| SchemaError::Malformed {
            target: "questions",
            reason: e.to_string(),
        })?;
    validate_questions(&envelope.questions)?;
    Ok(envelope.questions)
}

/// Decode and validate an evaluation response, with or without the wrapper object.
pub fn decode_scores(value: Value) -> Result<EvaluationScores, SchemaError> {
    let raw: RawEvaluation = serde_json::from_value(value).map_err(|e| SchemaError::Malformed {
        target: "evaluation",
        reason: e.to_string(),
    })?;
    let raw = match raw {
        RawEvaluation::Wrapped {
            design_review_score,
        } => design_review_score,
        RawEvaluation::Bare(raw) => raw,
    };

    let scores = EvaluationScores {
        technical_depth: raw.technical_depth,
        system_design: raw.system_design,
        tradeoff: raw.tradeoff,
        ownership: raw.ownership,
        feedback_summary: raw.detailed_feedback_summary,
    };
    scores.validate()?;
    Ok(scores)
}

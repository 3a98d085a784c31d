use common::review_job::ReviewJob;
use common::review_outcome::ReviewOutcome;
use tracing::{info, instrument, warn};

use super::{JobContext, load_attachments};
use crate::error::Result;
use crate::llm::schema::{decode_questions, questions_schema};
use crate::llm::{ContentPart, GenerationRequest};
use crate::prompts::{QUESTION_GENERATOR_PERSONA, generation_instruction, render_narrative};

/// Ask the generator for probing questions about the submitted design.
#[instrument(skip_all, fields(review_id = job.review_id, job_id = %job.job_id))]
pub async fn handle_generate(ctx: &JobContext, job: &ReviewJob) -> Result<ReviewOutcome> {
    info!(documents = job.documents.len(), "Generating probing questions");

    let mut parts = vec![ContentPart::Text(render_narrative(&job.narrative))];
    parts.extend(load_attachments(ctx.store.as_ref(), &job.documents).await?);
    parts.push(ContentPart::Text(generation_instruction(job.review_id)));

    let raw = ctx
        .generate(GenerationRequest {
            system_instruction: QUESTION_GENERATOR_PERSONA.to_string(),
            parts,
            response_schema: questions_schema(),
        })
        .await?;

    let questions = decode_questions(raw).inspect_err(|e| {
        warn!(error = %e, "Generator output failed validation");
    })?;

    info!(count = questions.len(), "Questions generated");
    Ok(ReviewOutcome::questions_generated(
        job.job_id.clone(),
        job.review_id,
        questions,
    ))
}

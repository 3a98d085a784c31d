use common::review_job::{CandidateProfile, ReviewJob, TranscriptEntry};
use common::review_outcome::ReviewOutcome;
use tracing::{info, instrument, warn};

use super::{JobContext, load_attachments};
use crate::error::Result;
use crate::llm::schema::{decode_scores, evaluation_schema};
use crate::llm::{ContentPart, GenerationRequest};
use crate::prompts::{EVALUATOR_PERSONA, render_candidate, render_narrative, render_transcript};

/// Score the candidate's design and answers against the four rubrics.
#[instrument(skip_all, fields(review_id = job.review_id, job_id = %job.job_id))]
pub async fn handle_evaluate(
    ctx: &JobContext,
    job: &ReviewJob,
    candidate: &CandidateProfile,
    transcript: &[TranscriptEntry],
) -> Result<ReviewOutcome> {
    info!(
        questions = transcript.len(),
        documents = job.documents.len(),
        "Evaluating review"
    );

    let mut parts = load_attachments(ctx.store.as_ref(), &job.documents).await?;
    parts.push(ContentPart::Text(format!(
        "{}\n{}\nProbing Questions and Answers\n{}",
        render_candidate(candidate),
        render_narrative(&job.narrative),
        render_transcript(transcript)
    )));

    let raw = ctx
        .generate(GenerationRequest {
            system_instruction: EVALUATOR_PERSONA.to_string(),
            parts,
            response_schema: evaluation_schema(),
        })
        .await?;

    let scores = decode_scores(raw).inspect_err(|e| {
        warn!(error = %e, "Evaluator output failed validation");
    })?;

    info!(
        technical_depth = scores.technical_depth,
        system_design = scores.system_design,
        tradeoff = scores.tradeoff,
        ownership = scores.ownership,
        overall = scores.overall(),
        "Evaluation complete"
    );
    Ok(ReviewOutcome::evaluated(
        job.job_id.clone(),
        job.review_id,
        scores,
    ))
}

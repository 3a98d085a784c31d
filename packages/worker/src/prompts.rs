use std::fmt::Write;

use common::review_job::{CandidateProfile, ReviewNarrative, TranscriptEntry};
use common::review_outcome::{DIFFICULTY_RANGE, QUESTION_COUNT_RANGE, QuestionCategory};

pub const NO_ANSWER: &str = "No answer provided";

pub const QUESTION_GENERATOR_PERSONA: &str = "\
You are a seasoned software architect running a design review. The presenter is a \
technical lead or senior developer describing the architecture of a new system, feature \
or service.

For the design in front of you:
- Understand the components, their responsibilities and how they interact.
- Ask probing questions grounded in established patterns and the trade-offs they imply.
- Look for gaps, risks and anti-patterns in scalability, maintainability, security, data \
flow, fault tolerance and integration.
- Check alignment with SOLID, domain-driven design, cloud-native practice and modularity \
where they apply.

Every question must be specific to the submitted design. Typical angles: failure handling \
and retries, consistency strategy (eventual vs. strong), versioning and observability, \
third-party dependencies and how they are abstracted, scaling and deployment strategy, \
authentication, authorization and data protection, and the alternatives that were \
rejected.";

pub const EVALUATOR_PERSONA: &str = "\
You are a senior software architect rigorously evaluating a candidate's architectural \
design and their reasoning under technical scrutiny. The candidate submitted a design \
review document and answered probing follow-up questions. Analyze the approach critically, \
judge how deep and practical the answers are, score without bias and give actionable \
feedback.

Score each dimension as an integer from 1 to 5.

technicalDepth: understanding of technical concepts and their application to real \
constraints (consistency, caching, async communication, failure handling, service \
contracts). 5 = architect-level mastery that anticipates edge cases. 3 = solid but \
generic. 1 = buzzwords without practical application.

systemDesign: structure, modularity and scalability of the system. Are responsibilities \
split cleanly, are boundaries (APIs, services, data domains) explicit, are deployment and \
operations considered? 5 = clean, extensible, production-ready decomposition. 3 = good \
structure with unclear interactions. 1 = monolithic or naive.

tradeoff: ability to identify, weigh and communicate trade-offs around consistency, \
latency, cost and complexity. 5 = balances competing priorities with solid justification. \
3 = recognizes trade-offs but reasons shallowly. 1 = choices with no downside discussed.

ownership: accountability for the design and openness to critique. 5 = mature, proactive \
about risks and willing to revise. 3 = accepts some flaws without initiative. 1 = \
defensive or unaware of weaknesses.

Finish with detailedFeedbackSummary: a candid paragraph covering strengths, gaps and \
concrete next steps.";

/// Render the six narrative sections, blank ones as "Not provided".
pub fn render_narrative(narrative: &ReviewNarrative) -> String {
    let mut out = String::new();
    for (label, value) in narrative.sections() {
        let _ = writeln!(out, "{label}: {value}");
    }
    out
}

/// Render the question/answer transcript in generation order, numbered from 1.
pub fn render_transcript(transcript: &[TranscriptEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in transcript.iter().enumerate() {
        let n = i + 1;
        let answer = entry.answer.as_deref().unwrap_or(NO_ANSWER);
        let _ = writeln!(out, "Question {n}: {}", entry.question);
        let _ = writeln!(out, "Answer {n}: {answer}");
        out.push('\n');
    }
    out
}

pub fn render_candidate(candidate: &CandidateProfile) -> String {
    format!(
        "Candidate: {}\nDesignation: {}\n",
        candidate.name, candidate.designation
    )
}

/// The generation ask appended after the narrative and attachments.
pub fn generation_instruction(review_id: i32) -> String {
    let categories: Vec<&str> = QuestionCategory::ALL.iter().map(|c| c.as_str()).collect();
    format!(
        "Analyze the design submitted for review {review_id}. Generate between {} and {} \
         technical design review questions. Rate each question's difficulty from {} (basic) \
         to {} (expert) and assign exactly one category from: {}.",
        QUESTION_COUNT_RANGE.start(),
        QUESTION_COUNT_RANGE.end(),
        DIFFICULTY_RANGE.start(),
        DIFFICULTY_RANGE.end(),
        categories.join(", ")
    )
}

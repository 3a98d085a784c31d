use serde::Serialize;

/// Decision produced after an answer write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Every question has an answer, so the review can leave `QuestionsGenerated`.
    pub advance_status: bool,
    /// The answer count just reached the question count exactly.
    pub trigger_evaluation: bool,
}

/// Decide whether a review is complete given its question and answer counts.
///
/// A review with no questions is never evaluable.
pub fn detect_completion(total: u64, answered: u64) -> Completion {
    Completion {
        advance_status: total > 0 && answered >= total,
        trigger_evaluation: total > 0 && answered == total,
    }
}

/// Shorthand for `detect_completion(total, answered).advance_status`.
pub fn is_complete(total: u64, answered: u64) -> bool {
    detect_completion(total, answered).advance_status
}

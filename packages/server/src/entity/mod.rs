pub mod candidate;
pub mod design_document;
pub mod design_review;
pub mod design_review_score;
pub mod probing_question;

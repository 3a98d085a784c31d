pub mod candidate;
pub mod evaluation;
pub mod question;
pub mod review;
pub mod shared;

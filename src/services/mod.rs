//! Service layer for question maintenance.
//!
//! Submission, editing and moderation sit outside the read-only sampling
//! core. Services can be used by the CLI or any other interface.

pub mod questions;

pub use questions::QuestionService;

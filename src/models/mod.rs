//! Data models for brainbase.

mod category;
mod question;

pub use category::Category;
pub use question::{
    NewQuestion, Question, QuestionStatus, QuestionUpdate, Requester, MIN_QUESTION_LENGTH,
};

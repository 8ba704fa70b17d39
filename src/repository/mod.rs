//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking.
//! Only the SQLite backend is supported.

pub mod context;
pub mod models;
pub mod pool;
pub mod question;
pub mod store;
pub mod util;

pub use context::DbContext;
pub use models::{NewQuestionRecord, QuestionRecord};
pub use pool::{DbPool, DieselError};
pub use question::QuestionRepository;
pub use store::{QuestionStore, StoreResult};

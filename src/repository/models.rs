//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.

use diesel::prelude::*;

use crate::models::{Category, NewQuestion, Question};
use crate::schema;

/// Question record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::questions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionRecord {
    pub id: i32,
    pub package: Option<String>,
    pub tour: Option<String>,
    pub number: Option<i16>,
    pub question_type: String,
    pub question: String,
    pub answer: String,
    pub pass_criteria: Option<String>,
    pub authors: Option<String>,
    pub sources: Option<String>,
    pub comments: Option<String>,
    pub is_condemned: bool,
    pub is_published: bool,
    pub user_id: Option<i32>,
}

/// New question for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::questions)]
pub struct NewQuestionRecord<'a> {
    pub package: Option<&'a str>,
    pub tour: Option<&'a str>,
    pub number: Option<i16>,
    pub question_type: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub pass_criteria: Option<&'a str>,
    pub authors: Option<&'a str>,
    pub sources: Option<&'a str>,
    pub comments: Option<&'a str>,
    pub is_condemned: bool,
    pub is_published: bool,
    pub user_id: Option<i32>,
}

impl<'a> NewQuestionRecord<'a> {
    /// Build an insertable row; submissions are never published on creation.
    pub fn from_submission(question: &'a NewQuestion, user_id: Option<i32>) -> Self {
        Self {
            package: question.package.as_deref(),
            tour: question.tour.as_deref(),
            number: question.number,
            question_type: question.category.code(),
            question: &question.question,
            answer: &question.answer,
            pass_criteria: question.pass_criteria.as_deref(),
            authors: question.authors.as_deref(),
            sources: question.sources.as_deref(),
            comments: question.comments.as_deref(),
            is_condemned: false,
            is_published: false,
            user_id,
        }
    }
}

/// Convert a database record to a domain model.
impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Question {
            id: record.id,
            package: record.package,
            tour: record.tour,
            number: record.number,
            category: Category::from_code(&record.question_type)
                .unwrap_or(Category::WhatWhereWhen),
            question: record.question,
            answer: record.answer,
            pass_criteria: record.pass_criteria,
            authors: record.authors,
            sources: record.sources,
            comments: record.comments,
            is_condemned: record.is_condemned,
            is_published: record.is_published,
            user_id: record.user_id,
        }
    }
}

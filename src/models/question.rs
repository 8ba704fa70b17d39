//! Question record and the payloads used to create and modify it.

use serde::{Deserialize, Serialize};

use super::Category;

/// Minimum length of a question text accepted at creation.
pub const MIN_QUESTION_LENGTH: usize = 30;

/// A single quiz question.
///
/// Public sampling and search only ever see eligible questions, see
/// [`Question::is_eligible`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i32,
    /// Tournament package the question belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour: Option<String>,
    /// Number within the tour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i16>,
    #[serde(rename = "question_type")]
    pub category: Category,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Unsuitable for release (broken encoding, dead image links, ...).
    #[serde(skip)]
    pub is_condemned: bool,
    /// Cleared for public distribution by an administrator.
    #[serde(skip)]
    pub is_published: bool,
    #[serde(skip)]
    pub user_id: Option<i32>,
}

impl Question {
    pub fn is_eligible(&self) -> bool {
        !self.is_condemned && self.is_published
    }
}

/// Payload for submitting a new question.
///
/// New questions always start unpublished; publishing is a separate
/// administrator action.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub tour: Option<String>,
    #[serde(default)]
    pub number: Option<i16>,
    #[serde(rename = "question_type", default = "default_category")]
    pub category: Category,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub pass_criteria: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub sources: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

fn default_category() -> Category {
    Category::WhatWhereWhen
}

impl NewQuestion {
    pub fn new(category: Category, question: &str, answer: &str) -> Self {
        Self {
            package: None,
            tour: None,
            number: None,
            category,
            question: question.to_string(),
            answer: answer.to_string(),
            pass_criteria: None,
            authors: None,
            sources: None,
            comments: None,
        }
    }

    pub fn with_package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    /// Check field constraints before the record reaches the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.chars().count() < MIN_QUESTION_LENGTH {
            return Err(format!(
                "question text must be at least {} characters",
                MIN_QUESTION_LENGTH
            ));
        }
        if self.answer.trim().is_empty() {
            return Err("answer cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Partial modification of a question.
///
/// `None` leaves a field untouched. For nullable fields an empty string
/// clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionUpdate {
    pub package: Option<String>,
    pub tour: Option<String>,
    pub number: Option<i16>,
    #[serde(rename = "question_type")]
    pub category: Option<Category>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub pass_criteria: Option<String>,
    pub authors: Option<String>,
    pub sources: Option<String>,
    pub comments: Option<String>,
}

impl QuestionUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref text) = self.question {
            if text.chars().count() < MIN_QUESTION_LENGTH {
                return Err(format!(
                    "question text must be at least {} characters",
                    MIN_QUESTION_LENGTH
                ));
            }
        }
        if self.answer.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err("answer cannot be empty".to_string());
        }
        Ok(())
    }

    /// Apply onto an existing question.
    pub fn apply(&self, question: &mut Question) {
        fn nullable(value: &Option<String>, target: &mut Option<String>) {
            if let Some(v) = value {
                *target = if v.is_empty() { None } else { Some(v.clone()) };
            }
        }

        nullable(&self.package, &mut question.package);
        nullable(&self.tour, &mut question.tour);
        nullable(&self.pass_criteria, &mut question.pass_criteria);
        nullable(&self.authors, &mut question.authors);
        nullable(&self.sources, &mut question.sources);
        nullable(&self.comments, &mut question.comments);
        if let Some(number) = self.number {
            question.number = Some(number);
        }
        if let Some(category) = self.category {
            question.category = category;
        }
        if let Some(ref text) = self.question {
            question.question = text.clone();
        }
        if let Some(ref answer) = self.answer {
            question.answer = answer.clone();
        }
    }
}

/// Moderation flags, settable by administrators only.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QuestionStatus {
    pub is_condemned: Option<bool>,
    pub is_published: Option<bool>,
}

/// The user on whose behalf a modification is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i32,
    pub is_superuser: bool,
}

impl Requester {
    /// Owners and administrators may edit or delete a question.
    pub fn can_modify(&self, question: &Question) -> bool {
        self.is_superuser || question.user_id == Some(self.user_id)
    }
}

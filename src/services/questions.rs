//! Submission, editing and moderation of questions.

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::models::{NewQuestion, Question, QuestionStatus, QuestionUpdate, Requester};
use crate::repository::QuestionRepository;

/// Question maintenance with ownership checks.
///
/// Authentication happens elsewhere; callers pass the already
/// authenticated [`Requester`].
#[derive(Clone)]
pub struct QuestionService {
    repo: QuestionRepository,
}

impl QuestionService {
    pub fn new(repo: QuestionRepository) -> Self {
        Self { repo }
    }

    /// Store a new question. It stays unpublished until an administrator
    /// publishes it.
    pub async fn submit(
        &self,
        question: &NewQuestion,
        requester: Option<&Requester>,
    ) -> CoreResult<Question> {
        question.validate().map_err(CoreError::InvalidQuery)?;
        let created = self
            .repo
            .create(question, requester.map(|r| r.user_id))
            .await?;
        info!("Question {} submitted for moderation", created.id);
        Ok(created)
    }

    /// Apply a partial update on behalf of the owner or an administrator.
    pub async fn edit(
        &self,
        id: i32,
        update: &QuestionUpdate,
        requester: &Requester,
    ) -> CoreResult<Question> {
        update.validate().map_err(CoreError::InvalidQuery)?;
        let mut question = self.modifiable(id, requester).await?;
        update.apply(&mut question);
        self.repo.save(&question).await?;
        Ok(question)
    }

    /// Change moderation flags. Administrators only.
    pub async fn set_status(
        &self,
        id: i32,
        status: QuestionStatus,
        requester: &Requester,
    ) -> CoreResult<Question> {
        if !requester.is_superuser {
            return Err(CoreError::Forbidden(
                "only administrators can change moderation status".to_string(),
            ));
        }
        let question = self
            .repo
            .set_status(id, status)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(
            "Question {} status: published={}, condemned={}",
            id, question.is_published, question.is_condemned
        );
        Ok(question)
    }

    /// Delete on behalf of the owner or an administrator.
    pub async fn delete(&self, id: i32, requester: &Requester) -> CoreResult<Question> {
        let question = self.modifiable(id, requester).await?;
        self.repo.delete(id).await?;
        info!("Question {} deleted", id);
        Ok(question)
    }

    async fn modifiable(&self, id: i32, requester: &Requester) -> CoreResult<Question> {
        let question = self.repo.get(id).await?.ok_or_else(|| not_found(id))?;
        if !requester.can_modify(&question) {
            return Err(CoreError::Forbidden(format!(
                "question {} belongs to another user",
                id
            )));
        }
        Ok(question)
    }
}

fn not_found(id: i32) -> CoreError {
    CoreError::NotFound(format!("question {}", id))
}

//! Collaborator contracts for questions, responses, templates and rosters.
//!
//! The engine never touches persistence directly. Controllers hold
//! `Arc<dyn ...>` handles to these traits:
//! - [`QuestionStore`] - sessions and their ordered questions
//! - [`ResponseStore`] - drafts and frozen responses keyed by [`ResponseKey`]
//! - [`TemplateLibrary`] - read-only template catalogue
//! - [`RecipientRoster`] - who may answer, and about whom
//!
//! [`memory`] provides in-process implementations used by the CLI and tests.

mod error;
pub mod memory;

pub use error::{Error, Result};
pub use memory::{MemoryQuestionStore, MemoryResponseStore, StaticRoster};

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::question::{FeedbackSession, Question, TemplateQuestion};
use crate::response::{Response, ResponseKey};
use crate::types::{QuestionId, RecipientId, RespondentId, ResponseId, SessionId, TemplateId};

/// Sessions and their questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Get a session by ID.
    async fn get_session(&self, id: SessionId) -> Result<FeedbackSession>;

    /// Create or replace a session record.
    async fn save_session(&self, session: FeedbackSession) -> Result<()>;

    /// All questions of a session, ordered by `display_order`.
    async fn load_questions(&self, session_id: SessionId) -> Result<Vec<Question>>;

    /// Create or replace a single question.
    async fn save_question(&self, question: Question) -> Result<()>;

    /// Delete a single question.
    async fn delete_question(&self, id: QuestionId) -> Result<()>;

    /// Apply upserts and deletes to a session's questions in one step.
    ///
    /// Fails with [`Error::Conflict`] and changes nothing when the stored
    /// question ids of the session are not exactly `expected`.
    async fn apply_batch(
        &self,
        session_id: SessionId,
        expected: &[QuestionId],
        upserts: Vec<Question>,
        deletes: &[QuestionId],
    ) -> Result<()>;

    /// Delete a session together with all of its questions.
    async fn delete_session(&self, id: SessionId) -> Result<()>;
}

/// Drafts and submitted responses.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn get_response(&self, key: &ResponseKey) -> Result<Option<Response>>;

    /// Every response of one respondent within a session.
    async fn list_for_respondent(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
    ) -> Result<Vec<Response>>;

    /// Every response within a session, including orphans.
    async fn list_for_session(&self, session_id: SessionId) -> Result<Vec<Response>>;

    async fn list_for_question(&self, question_id: QuestionId) -> Result<Vec<Response>>;

    /// Create or replace the draft at the response's key.
    ///
    /// Fails with [`Error::Conflict`] when the stored response is submitted.
    async fn save_response(&self, response: Response) -> Result<()>;

    /// Remove a draft. Submitted responses cannot be deleted.
    async fn delete_response(&self, key: &ResponseKey) -> Result<()>;

    /// Remove every unsubmitted response to a question. Returns how many were removed.
    async fn cancel_drafts(&self, question_id: QuestionId) -> Result<usize>;

    /// Freeze `freeze` and drop `discard` in one step.
    ///
    /// Fails with [`Error::Conflict`] and changes nothing when the
    /// respondent's current drafts are not exactly `freeze` plus `discard`.
    async fn submit_all(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        freeze: &[ResponseId],
        discard: &[ResponseId],
    ) -> Result<()>;

    /// Move a respondent's submitted responses back to drafts. Returns how many moved.
    async fn reopen_all(&self, session_id: SessionId, respondent_id: &RespondentId) -> Result<usize>;
}

/// Read-only catalogue of template questions.
#[async_trait]
pub trait TemplateLibrary: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<TemplateQuestion>>;

    async fn get_template(&self, id: &TemplateId) -> Result<TemplateQuestion> {
        self.list_templates()
            .await?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("template {id}")))
    }
}

/// Session membership and recipient eligibility.
#[async_trait]
pub trait RecipientRoster: Send + Sync {
    /// Recipients `respondent_id` answers `question` about. Empty for
    /// questions without a recipient scope.
    async fn eligible_recipients(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        question: &Question,
    ) -> Result<BTreeSet<RecipientId>>;

    /// Everyone expected to respond in a session.
    async fn respondents(&self, session_id: SessionId) -> Result<BTreeSet<RespondentId>>;
}

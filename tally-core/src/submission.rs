//! Respondent-side answer collection and atomic submission.
//!
//! Per respondent and session the state moves `NOT_STARTED -> IN_PROGRESS ->
//! SUBMITTED`, and back to `IN_PROGRESS` only through [`SubmissionManager::reopen`]
//! while the session is open for edits. All operations for one respondent
//! are serialized; different respondents never contend.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::locks::KeyedLocks;
use crate::question::Question;
use crate::registry::ResponseDetails;
use crate::response::{Response, ResponseKey, SubmissionState};
use crate::storage::{QuestionStore, RecipientRoster, ResponseStore};
use crate::types::{QuestionId, RecipientId, RespondentId, ResponseId, SessionId};
use crate::validation::ValidationResult;

/// A respondent's working copy of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub state: SubmissionState,
    /// Stored responses to current questions, plus unsaved blanks for every
    /// required (question, recipient) pair not answered yet, in question order
    pub responses: Vec<Response>,
}

/// Orchestrates answer collection for respondents.
pub struct SubmissionManager {
    questions: Arc<dyn QuestionStore>,
    responses: Arc<dyn ResponseStore>,
    roster: Arc<dyn RecipientRoster>,
    locks: KeyedLocks<(SessionId, RespondentId)>,
}

impl SubmissionManager {
    /// Create a new submission manager.
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        responses: Arc<dyn ResponseStore>,
        roster: Arc<dyn RecipientRoster>,
    ) -> Self {
        Self {
            questions,
            responses,
            roster,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn submission_state(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
    ) -> Result<SubmissionState> {
        let stored = self.responses.list_for_respondent(session_id, respondent_id).await?;
        Ok(SubmissionState::of(&stored))
    }

    /// Load the respondent's answers, filling in blanks for required questions.
    pub async fn load_draft(&self, session_id: SessionId, respondent_id: &RespondentId) -> Result<Draft> {
        let questions = self.questions.load_questions(session_id).await?;
        let stored = self.responses.list_for_respondent(session_id, respondent_id).await?;
        let state = SubmissionState::of(&stored);
        let mut by_key: BTreeMap<ResponseKey, Response> =
            stored.into_iter().map(|r| (r.key(), r)).collect();

        let mut responses = Vec::new();
        for question in &questions {
            for recipient in self.targets(session_id, respondent_id, question).await? {
                let key = ResponseKey {
                    question_id: question.id,
                    respondent_id: respondent_id.clone(),
                    recipient_id: recipient,
                };
                match by_key.remove(&key) {
                    Some(response) => responses.push(response),
                    None if question.required => responses.push(Response::blank(session_id, key)),
                    None => {}
                }
            }
        }
        Ok(Draft { state, responses })
    }

    /// Validate and store one answer.
    ///
    /// Invalid answers are rejected with field-level violations and nothing
    /// is stored. Storing the same details twice writes once.
    pub async fn update_answer(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        question_id: QuestionId,
        recipient_id: Option<RecipientId>,
        details: ResponseDetails,
    ) -> Result<Response> {
        let _guard = self.locks.lock((session_id, respondent_id.clone())).await;
        let question = self.find(session_id, question_id).await?;
        self.check_recipient(session_id, respondent_id, &question, recipient_id.as_ref())
            .await?;
        question.settings.validate_response(&details).into_result()?;

        let stored = self.responses.list_for_respondent(session_id, respondent_id).await?;
        if SubmissionState::of(&stored) == SubmissionState::Submitted {
            return Err(Error::StructuralConflict(format!(
                "{respondent_id} has already submitted; reopen the submission to edit it"
            )));
        }

        let key = ResponseKey {
            question_id,
            respondent_id: respondent_id.clone(),
            recipient_id,
        };
        let existing = stored.into_iter().find(|r| r.key() == key);
        if let Some(existing) = &existing {
            if existing.is_submitted() {
                return Err(Error::StructuralConflict(format!(
                    "response to question {question_id} is already submitted"
                )));
            }
            if existing.details.as_ref() == Some(&details) {
                return Ok(existing.clone());
            }
        }

        let mut response = existing.unwrap_or_else(|| Response::blank(session_id, key));
        response.details = Some(details);
        response.updated_at = Utc::now();
        self.responses.save_response(response.clone()).await?;
        debug!(question = %question_id, respondent = %respondent_id, "answer saved");
        Ok(response)
    }

    /// Remove a draft answer. Clearing an answer that does not exist is a no-op.
    pub async fn clear_answer(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        question_id: QuestionId,
        recipient_id: Option<RecipientId>,
    ) -> Result<()> {
        let _guard = self.locks.lock((session_id, respondent_id.clone())).await;
        let key = ResponseKey {
            question_id,
            respondent_id: respondent_id.clone(),
            recipient_id,
        };
        match self.responses.get_response(&key).await? {
            None => Ok(()),
            Some(r) if r.is_submitted() => Err(Error::StructuralConflict(format!(
                "response to question {question_id} is already submitted"
            ))),
            Some(_) => {
                self.responses.delete_response(&key).await?;
                debug!(question = %question_id, respondent = %respondent_id, "answer cleared");
                Ok(())
            }
        }
    }

    /// Validate every answer and freeze them all in one step.
    ///
    /// Every required question must be answered for every eligible
    /// recipient, and every answer present must be valid. Rules spanning
    /// recipients run whenever at least one recipient is answered. On any violation
    /// nothing is frozen and all violations are returned, each field
    /// prefixed with `question/<id>` (and `/recipient/<id>` when scoped).
    /// Blank drafts and drafts for removed questions or recipients are
    /// dropped on success.
    pub async fn submit(&self, session_id: SessionId, respondent_id: &RespondentId) -> Result<Vec<Response>> {
        let _guard = self.locks.lock((session_id, respondent_id.clone())).await;
        self.questions.get_session(session_id).await?;
        let questions = self.questions.load_questions(session_id).await?;
        let stored = self.responses.list_for_respondent(session_id, respondent_id).await?;
        if SubmissionState::of(&stored) == SubmissionState::Submitted {
            return Err(Error::StructuralConflict(format!(
                "{respondent_id} has already submitted"
            )));
        }

        let mut drafts: BTreeMap<ResponseKey, Response> = stored
            .into_iter()
            .filter(|r| !r.is_submitted())
            .map(|r| (r.key(), r))
            .collect();
        let mut violations = ValidationResult::ok();
        let mut freeze: Vec<ResponseId> = Vec::new();

        for question in &questions {
            let prefix = format!("question/{}", question.id);
            let targets = self.targets(session_id, respondent_id, question).await?;
            let mut answered: Vec<ResponseDetails> = Vec::new();
            let flagged = violations.len();

            for recipient in &targets {
                let field = match recipient {
                    Some(r) => format!("{prefix}/recipient/{r}"),
                    None => prefix.clone(),
                };
                let key = ResponseKey {
                    question_id: question.id,
                    respondent_id: respondent_id.clone(),
                    recipient_id: recipient.clone(),
                };
                let Some(draft) = drafts.remove(&key) else {
                    if question.required {
                        violations.push(format!("{field}.details"), "an answer is required");
                    }
                    continue;
                };
                match draft.details {
                    Some(details) => {
                        let result = question.settings.validate_response(&details);
                        if result.is_ok() {
                            freeze.push(draft.id);
                            answered.push(details);
                        } else {
                            violations.merge(result.prefixed(&field));
                        }
                    }
                    None if question.required => {
                        violations.push(format!("{field}.details"), "an answer is required");
                    }
                    // Blank optional answer; dropped below
                    None => {
                        drafts.insert(key, draft);
                    }
                }
            }

            // Set rules also cover optional questions answered for only some recipients
            if question.is_recipient_scoped() && !answered.is_empty() && violations.len() == flagged {
                let refs: Vec<&ResponseDetails> = answered.iter().collect();
                violations.merge(
                    question
                        .settings
                        .validate_recipient_set(&refs, targets.len())
                        .prefixed(&prefix),
                );
            }
        }

        if !violations.is_ok() {
            warn!(
                session = %session_id,
                respondent = %respondent_id,
                violations = violations.len(),
                "submission rejected"
            );
            return Err(Error::Validation(violations));
        }

        let discard: Vec<ResponseId> = drafts.values().map(|r| r.id).collect();
        self.responses
            .submit_all(session_id, respondent_id, &freeze, &discard)
            .await?;
        info!(
            session = %session_id,
            respondent = %respondent_id,
            frozen = freeze.len(),
            dropped = discard.len(),
            "submission accepted"
        );

        let stored = self.responses.list_for_respondent(session_id, respondent_id).await?;
        Ok(stored.into_iter().filter(Response::is_submitted).collect())
    }

    /// Move a submitted respondent back to `IN_PROGRESS`.
    ///
    /// Only allowed while the session is open for edits.
    pub async fn reopen(&self, session_id: SessionId, respondent_id: &RespondentId) -> Result<usize> {
        let _guard = self.locks.lock((session_id, respondent_id.clone())).await;
        let session = self.questions.get_session(session_id).await?;
        if !session.open_for_edits {
            return Err(Error::StructuralConflict(format!(
                "session '{}' is not open for edits",
                session.name
            )));
        }
        let reopened = self.responses.reopen_all(session_id, respondent_id).await?;
        info!(session = %session_id, respondent = %respondent_id, reopened, "submission reopened");
        Ok(reopened)
    }

    async fn find(&self, session_id: SessionId, question_id: QuestionId) -> Result<Question> {
        self.questions
            .load_questions(session_id)
            .await?
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| Error::NotFound(format!("question {question_id}")))
    }

    /// One entry per response the question expects from this respondent.
    async fn targets(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        question: &Question,
    ) -> Result<Vec<Option<RecipientId>>> {
        if !question.is_recipient_scoped() {
            return Ok(vec![None]);
        }
        let recipients = self
            .roster
            .eligible_recipients(session_id, respondent_id, question)
            .await?;
        Ok(recipients.into_iter().map(Some).collect())
    }

    async fn check_recipient(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        question: &Question,
        recipient_id: Option<&RecipientId>,
    ) -> Result<()> {
        let result = match (question.is_recipient_scoped(), recipient_id) {
            (false, None) => ValidationResult::ok(),
            (false, Some(_)) => ValidationResult::single(
                "recipientId",
                "this question is not about a recipient",
            ),
            (true, None) => ValidationResult::single(
                "recipientId",
                format!("a recipient is required for {}-scoped questions", question.recipient_scope),
            ),
            (true, Some(recipient)) => {
                let eligible = self
                    .roster
                    .eligible_recipients(session_id, respondent_id, question)
                    .await?;
                let mut result = ValidationResult::ok();
                result.check(
                    eligible.contains(recipient),
                    "recipientId",
                    format!("{recipient} is not an eligible recipient"),
                );
                result
            }
        };
        Ok(result.into_result()?)
    }
}

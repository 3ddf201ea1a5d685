//! Instructor-side editing of a session's ordered question list.
//!
//! Every operation takes the session's lock, reads the current question
//! list, and writes its changes back through one store call. Multi-question
//! changes (add, reorder, delete, duplicate) go through
//! [`QuestionStore::apply_batch`], so readers never observe duplicate or
//! gapped display orders.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::{DraftPolicy, EngineConfig};
use crate::error::{Error, Result};
use crate::locks::KeyedLocks;
use crate::question::{FeedbackSession, Question};
use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::QuestionSettings;
use crate::storage::{self, QuestionStore, ResponseStore, TemplateLibrary};
use crate::types::{QuestionId, SessionId, TemplateId};
use crate::validation::ValidationResult;

/// Orchestrates question CRUD for instructors.
pub struct QuestionEditor {
    questions: Arc<dyn QuestionStore>,
    responses: Arc<dyn ResponseStore>,
    templates: Arc<dyn TemplateLibrary>,
    config: EngineConfig,
    locks: KeyedLocks<SessionId>,
}

impl QuestionEditor {
    /// Create a new editor.
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        responses: Arc<dyn ResponseStore>,
        templates: Arc<dyn TemplateLibrary>,
        config: EngineConfig,
    ) -> Self {
        Self {
            questions,
            responses,
            templates,
            config,
            locks: KeyedLocks::new(),
        }
    }

    /// Create an empty session.
    pub async fn create_session(&self, name: impl Into<String>) -> Result<FeedbackSession> {
        let session = FeedbackSession::new(name);
        self.questions.save_session(session.clone()).await?;
        info!(session = %session.id, "session created");
        Ok(session)
    }

    /// Questions of a session in display order.
    pub async fn list_questions(&self, session_id: SessionId) -> Result<Vec<Question>> {
        Ok(self.questions.load_questions(session_id).await?)
    }

    /// Append a new question, blank or copied from a template.
    ///
    /// The template must be of `question_type`.
    pub async fn add_question(
        &self,
        session_id: SessionId,
        question_type: QuestionType,
        template: Option<&TemplateId>,
    ) -> Result<Question> {
        let _guard = self.locks.lock(session_id).await;
        self.questions.get_session(session_id).await?;
        let current = self.questions.load_questions(session_id).await?;
        let display_order = current.len() as u32;

        let question = match template {
            Some(id) => {
                let template = self.templates.get_template(id).await?;
                if template.question_type() != question_type {
                    return Err(ValidationResult::single(
                        "template",
                        format!(
                            "template '{id}' is a {} question, not {question_type}",
                            template.question_type()
                        ),
                    )
                    .into());
                }
                template.instantiate(session_id, display_order)
            }
            None => Question::new(session_id, question_type, display_order),
        };
        question.validate().into_result()?;

        self.questions
            .apply_batch(session_id, &ids(&current), vec![question.clone()], &[])
            .await?;
        info!(session = %session_id, question = %question.id, %question_type, "question added");
        Ok(question)
    }

    /// Replace a question's settings.
    ///
    /// Invalid settings leave the question unchanged. Changing the type is
    /// rejected once any response to the question exists. Existing drafts
    /// are then handled according to the configured [`DraftPolicy`]; frozen
    /// responses are never touched.
    pub async fn update_question_settings(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        settings: QuestionSettings,
    ) -> Result<Question> {
        let _guard = self.locks.lock(session_id).await;
        let current = self.find(session_id, question_id).await?;

        let type_changed = settings.question_type() != current.question_type();
        let mut updated = Question {
            settings,
            ..current.clone()
        };
        if type_changed && !updated.settings.supports_scope(updated.recipient_scope) {
            updated.recipient_scope = QuestionSettings::default_scope(updated.question_type());
        }
        updated.validate().into_result()?;

        let existing = self.responses.list_for_question(question_id).await?;
        if type_changed && !existing.is_empty() {
            return Err(Error::StructuralConflict(format!(
                "cannot change question {question_id} from {} to {}: {} responses exist; delete and recreate it instead",
                current.question_type(),
                updated.question_type(),
                existing.len()
            )));
        }

        self.questions.save_question(updated.clone()).await?;
        debug!(question = %question_id, "question settings updated");

        let drafts: Vec<_> = existing.into_iter().filter(|r| !r.is_submitted()).collect();
        if drafts.is_empty() {
            return Ok(updated);
        }
        match self.config.drafts {
            DraftPolicy::Revalidate => {
                let mut reset = 0;
                for mut draft in drafts {
                    let Some(details) = &draft.details else { continue };
                    if updated.settings.validate_response(details).is_ok() {
                        continue;
                    }
                    draft.details = None;
                    draft.updated_at = Utc::now();
                    match self.responses.save_response(draft).await {
                        Ok(()) => reset += 1,
                        // Submitted in the meantime; frozen responses stay as they are
                        Err(storage::Error::Conflict(_)) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                if reset > 0 {
                    info!(question = %question_id, reset, "drafts invalidated by settings change");
                }
            }
            DraftPolicy::Discard => {
                let dropped = self.responses.cancel_drafts(question_id).await?;
                info!(question = %question_id, dropped, "drafts discarded after settings change");
            }
            DraftPolicy::Keep => {}
        }
        Ok(updated)
    }

    /// Replace a question's prompt and description. Blank text is rejected.
    pub async fn update_question_text(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        text: impl Into<String>,
        description: Option<String>,
    ) -> Result<Question> {
        let text = text.into();
        let mut result = ValidationResult::ok();
        result.check(!text.trim().is_empty(), "text", "question text must not be blank");
        result.into_result()?;

        let _guard = self.locks.lock(session_id).await;
        let mut question = self.find(session_id, question_id).await?;
        question.text = text;
        question.description = description.filter(|d| !d.trim().is_empty());
        self.questions.save_question(question.clone()).await?;
        debug!(question = %question_id, "question text updated");
        Ok(question)
    }

    pub async fn set_required(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        required: bool,
    ) -> Result<Question> {
        let _guard = self.locks.lock(session_id).await;
        let mut question = self.find(session_id, question_id).await?;
        question.required = required;
        self.questions.save_question(question.clone()).await?;
        debug!(question = %question_id, required, "question requirement updated");
        Ok(question)
    }

    /// Change who a question's responses are about.
    ///
    /// Responses are keyed by recipient, so the scope is fixed once any exist.
    pub async fn set_recipient_scope(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        scope: RecipientScope,
    ) -> Result<Question> {
        let _guard = self.locks.lock(session_id).await;
        let mut question = self.find(session_id, question_id).await?;
        if question.recipient_scope == scope {
            return Ok(question);
        }
        question.recipient_scope = scope;
        question.validate().into_result()?;

        let existing = self.responses.list_for_question(question_id).await?;
        if !existing.is_empty() {
            return Err(Error::StructuralConflict(format!(
                "cannot change recipient scope of question {question_id}: {} responses exist",
                existing.len()
            )));
        }

        self.questions.save_question(question.clone()).await?;
        debug!(question = %question_id, %scope, "recipient scope updated");
        Ok(question)
    }

    /// Move a question to `new_position` (0-based), shifting the ones in between.
    ///
    /// Returns the reordered list. Display orders are renumbered `0..n`.
    pub async fn reorder(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
        new_position: usize,
    ) -> Result<Vec<Question>> {
        let _guard = self.locks.lock(session_id).await;
        let current = self.questions.load_questions(session_id).await?;
        let from = position(&current, question_id)?;
        if new_position >= current.len() {
            return Err(ValidationResult::single(
                "newPosition",
                format!("must be between 0 and {}", current.len() - 1),
            )
            .into());
        }

        let mut reordered = current.clone();
        let moved = reordered.remove(from);
        reordered.insert(new_position, moved);
        let upserts = renumber(&mut reordered);

        self.questions
            .apply_batch(session_id, &ids(&current), upserts, &[])
            .await?;
        debug!(session = %session_id, question = %question_id, from, to = new_position, "question moved");
        Ok(reordered)
    }

    /// Delete a question before the session is published.
    ///
    /// Unsubmitted responses to it are cancelled. Submitted ones stay in the
    /// store for audit and drop out of results with the question.
    pub async fn delete_question(&self, session_id: SessionId, question_id: QuestionId) -> Result<()> {
        let _guard = self.locks.lock(session_id).await;
        let session = self.questions.get_session(session_id).await?;
        if session.published {
            return Err(Error::StructuralConflict(format!(
                "session '{}' is published; its questions can no longer be deleted",
                session.name
            )));
        }

        let current = self.questions.load_questions(session_id).await?;
        let at = position(&current, question_id)?;
        let mut remaining = current.clone();
        remaining.remove(at);
        let upserts = renumber(&mut remaining);

        self.questions
            .apply_batch(session_id, &ids(&current), upserts, &[question_id])
            .await?;
        let cancelled = self.responses.cancel_drafts(question_id).await?;
        info!(session = %session_id, question = %question_id, cancelled, "question deleted");
        Ok(())
    }

    /// Append a copy of a question with a fresh id.
    pub async fn duplicate_question(
        &self,
        session_id: SessionId,
        question_id: QuestionId,
    ) -> Result<Question> {
        let _guard = self.locks.lock(session_id).await;
        let current = self.questions.load_questions(session_id).await?;
        let at = position(&current, question_id)?;
        let copy = current[at].duplicate(current.len() as u32);

        self.questions
            .apply_batch(session_id, &ids(&current), vec![copy.clone()], &[])
            .await?;
        info!(session = %session_id, source = %question_id, question = %copy.id, "question duplicated");
        Ok(copy)
    }

    /// Delete a session and its questions, cancelling all drafts.
    pub async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        let _guard = self.locks.lock(session_id).await;
        let current = self.questions.load_questions(session_id).await?;
        self.questions.delete_session(session_id).await?;
        let mut cancelled = 0;
        for question in &current {
            cancelled += self.responses.cancel_drafts(question.id).await?;
        }
        info!(session = %session_id, questions = current.len(), cancelled, "session deleted");
        Ok(())
    }

    async fn find(&self, session_id: SessionId, question_id: QuestionId) -> Result<Question> {
        self.questions
            .load_questions(session_id)
            .await?
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| not_found(question_id))
    }
}

fn not_found(question_id: QuestionId) -> Error {
    Error::NotFound(format!("question {question_id}"))
}

fn ids(questions: &[Question]) -> Vec<QuestionId> {
    questions.iter().map(|q| q.id).collect()
}

fn position(questions: &[Question], question_id: QuestionId) -> Result<usize> {
    questions
        .iter()
        .position(|q| q.id == question_id)
        .ok_or_else(|| not_found(question_id))
}

/// Assign `0..n` in list order; returns the questions whose order changed.
fn renumber(questions: &mut [Question]) -> Vec<Question> {
    let mut changed = Vec::new();
    for (i, question) in questions.iter_mut().enumerate() {
        let order = i as u32;
        if question.display_order != order {
            question.display_order = order;
            changed.push(question.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{McqDetails, McqSettings, NumericalScaleSettings};
    use crate::question::TemplateQuestion;
    use crate::registry::ResponseDetails;
    use crate::response::{Response, ResponseKey, ResponseStatus};
    use crate::storage::{MemoryQuestionStore, MemoryResponseStore};
    use crate::templates::TemplateCatalog;
    use crate::types::RespondentId;

    struct Fixture {
        editor: QuestionEditor,
        responses: Arc<MemoryResponseStore>,
        questions: Arc<MemoryQuestionStore>,
        session: FeedbackSession,
    }

    async fn fixture_with(config: EngineConfig) -> Fixture {
        let questions = Arc::new(MemoryQuestionStore::new());
        let responses = Arc::new(MemoryResponseStore::new());
        let editor = QuestionEditor::new(
            questions.clone(),
            responses.clone(),
            TemplateCatalog::builtin().unwrap().shared(),
            config,
        );
        let session = editor.create_session("Week 1").await.unwrap();
        Fixture {
            editor,
            responses,
            questions,
            session,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(EngineConfig::default()).await
    }

    fn orders(questions: &[Question]) -> Vec<u32> {
        questions.iter().map(|q| q.display_order).collect()
    }

    fn abc() -> QuestionSettings {
        QuestionSettings::Mcq(McqSettings {
            options: vec!["A".into(), "B".into(), "C".into()],
            allow_other: false,
            weights: None,
        })
    }

    async fn draft(f: &Fixture, question_id: QuestionId, selected: &str) -> Response {
        let mut response = Response::blank(
            f.session.id,
            ResponseKey {
                question_id,
                respondent_id: RespondentId::new(format!("student-{selected}")),
                recipient_id: None,
            },
        );
        response.details = Some(ResponseDetails::Mcq(McqDetails {
            selected: selected.into(),
        }));
        f.responses.save_response(response.clone()).await.unwrap();
        response
    }

    /// Serves templates as-is, without the catalogue's load checks.
    struct UncheckedLibrary(Vec<TemplateQuestion>);

    #[async_trait::async_trait]
    impl TemplateLibrary for UncheckedLibrary {
        async fn list_templates(&self) -> storage::Result<Vec<TemplateQuestion>> {
            Ok(self.0.clone())
        }
    }

    // ===== Add Tests =====

    #[tokio::test]
    async fn add_rejects_template_with_unsupported_scope() {
        let template = TemplateQuestion {
            id: TemplateId::new("scopeless-contribution"),
            text: "How much did everyone do?".into(),
            description: None,
            recipient_scope: Some(RecipientScope::None),
            settings: QuestionSettings::default_for(QuestionType::Contribution),
        };
        let editor = QuestionEditor::new(
            Arc::new(MemoryQuestionStore::new()),
            Arc::new(MemoryResponseStore::new()),
            Arc::new(UncheckedLibrary(vec![template.clone()])),
            EngineConfig::default(),
        );
        let session = editor.create_session("Week 1").await.unwrap();

        let err = editor
            .add_question(session.id, QuestionType::Contribution, Some(&template.id))
            .await
            .unwrap_err();
        assert!(err.violations().unwrap().mentions("recipientScope"));
        assert!(editor.list_questions(session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_assigns_next_display_order() {
        let f = fixture().await;
        let a = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        let b = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);
        assert!(a.validate().is_ok());
    }

    #[tokio::test]
    async fn add_from_template_copies_text_and_settings() {
        let f = fixture().await;
        let id = TemplateId::new("difficulty-scale");
        let q = f
            .editor
            .add_question(f.session.id, QuestionType::NumericalScale, Some(&id))
            .await
            .unwrap();
        assert_eq!(q.text, "How difficult was this assignment?");
        assert_eq!(q.question_type(), QuestionType::NumericalScale);
    }

    #[tokio::test]
    async fn add_from_template_of_other_type_is_rejected() {
        let f = fixture().await;
        let id = TemplateId::new("difficulty-scale");
        let err = f
            .editor
            .add_question(f.session.id, QuestionType::Mcq, Some(&id))
            .await
            .unwrap_err();
        assert!(err.violations().unwrap().mentions("template"));
        assert!(f.editor.list_questions(f.session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_to_unknown_session_is_not_found() {
        let f = fixture().await;
        let err = f
            .editor
            .add_question(SessionId::new(), QuestionType::Mcq, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    // ===== Settings Tests =====

    #[tokio::test]
    async fn invalid_settings_leave_question_unchanged() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::NumericalScale, None).await.unwrap();
        let bad = QuestionSettings::NumericalScale(NumericalScaleSettings {
            min: 5.0,
            max: 1.0,
            step: 1.0,
        });

        let err = f.editor.update_question_settings(f.session.id, q.id, bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let stored = f.editor.list_questions(f.session.id).await.unwrap();
        assert_eq!(stored[0].settings, q.settings);
    }

    #[tokio::test]
    async fn type_change_without_responses_is_allowed() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        let updated = f
            .editor
            .update_question_settings(
                f.session.id,
                q.id,
                QuestionSettings::default_for(QuestionType::Contribution),
            )
            .await
            .unwrap();
        assert_eq!(updated.question_type(), QuestionType::Contribution);
        assert_eq!(updated.recipient_scope, RecipientScope::Peers);
    }

    #[tokio::test]
    async fn type_change_after_responses_is_a_conflict() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        f.editor.update_question_settings(f.session.id, q.id, abc()).await.unwrap();
        draft(&f, q.id, "A").await;

        let err = f
            .editor
            .update_question_settings(f.session.id, q.id, QuestionSettings::default_for(QuestionType::Text))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StructuralConflict(_)));
    }

    #[tokio::test]
    async fn revalidate_resets_only_invalid_drafts() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        f.editor.update_question_settings(f.session.id, q.id, abc()).await.unwrap();
        let keeps = draft(&f, q.id, "A").await;
        let loses = draft(&f, q.id, "C").await;
        let mut frozen = draft(&f, q.id, "B").await;
        f.responses
            .submit_all(f.session.id, &frozen.respondent_id, &[frozen.id], &[])
            .await
            .unwrap();
        frozen.status = ResponseStatus::Submitted;

        let narrower = QuestionSettings::Mcq(McqSettings {
            options: vec!["A".into(), "Z".into()],
            allow_other: false,
            weights: None,
        });
        f.editor.update_question_settings(f.session.id, q.id, narrower).await.unwrap();

        let kept = f.responses.get_response(&keeps.key()).await.unwrap().unwrap();
        assert!(kept.details.is_some());
        let reset = f.responses.get_response(&loses.key()).await.unwrap().unwrap();
        assert!(reset.details.is_none());
        let still_frozen = f.responses.get_response(&frozen.key()).await.unwrap().unwrap();
        assert_eq!(still_frozen.details, frozen.details);
        assert!(still_frozen.is_submitted());
    }

    #[tokio::test]
    async fn discard_policy_drops_drafts() {
        let f = fixture_with(EngineConfig {
            drafts: DraftPolicy::Discard,
            templates: None,
        })
        .await;
        let q = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        f.editor.update_question_settings(f.session.id, q.id, abc()).await.unwrap();
        draft(&f, q.id, "A").await;

        f.editor.update_question_settings(f.session.id, q.id, abc()).await.unwrap();
        assert!(f.responses.list_for_question(q.id).await.unwrap().is_empty());
    }

    // ===== Text, Required and Scope Tests =====

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        let err = f
            .editor
            .update_question_text(f.session.id, q.id, "  ", None)
            .await
            .unwrap_err();
        assert!(err.violations().unwrap().mentions("text"));

        let updated = f
            .editor
            .update_question_text(f.session.id, q.id, "How did it go?", Some("Be honest".into()))
            .await
            .unwrap();
        assert_eq!(updated.text, "How did it go?");
        assert_eq!(updated.description.as_deref(), Some("Be honest"));
    }

    #[tokio::test]
    async fn set_required_toggles_flag() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        let q = f.editor.set_required(f.session.id, q.id, false).await.unwrap();
        assert!(!q.required);
    }

    #[tokio::test]
    async fn unsupported_scope_is_rejected() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Contribution, None).await.unwrap();
        let err = f
            .editor
            .set_recipient_scope(f.session.id, q.id, RecipientScope::None)
            .await
            .unwrap_err();
        assert!(err.violations().unwrap().mentions("recipientScope"));
    }

    #[tokio::test]
    async fn scope_change_after_responses_is_a_conflict() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        draft(&f, q.id, "Option 1").await;
        let err = f
            .editor
            .set_recipient_scope(f.session.id, q.id, RecipientScope::Peers)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StructuralConflict(_)));
    }

    // ===== Order Tests =====

    #[tokio::test]
    async fn reorder_keeps_orders_contiguous() {
        let f = fixture().await;
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap().id);
        }

        let list = f.editor.reorder(f.session.id, ids[3], 0).await.unwrap();
        assert_eq!(list[0].id, ids[3]);
        assert_eq!(orders(&list), vec![0, 1, 2, 3]);

        f.editor.reorder(f.session.id, ids[0], 3).await.unwrap();
        f.editor.reorder(f.session.id, ids[2], 1).await.unwrap();
        let stored = f.editor.list_questions(f.session.id).await.unwrap();
        assert_eq!(orders(&stored), vec![0, 1, 2, 3]);
        assert_eq!(stored[3].id, ids[0]);
    }

    #[tokio::test]
    async fn reorder_out_of_range_is_rejected() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        let err = f.editor.reorder(f.session.id, q.id, 1).await.unwrap_err();
        assert!(err.violations().unwrap().mentions("newPosition"));
    }

    #[tokio::test]
    async fn delete_renumbers_and_cancels_drafts() {
        let f = fixture().await;
        let a = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        let b = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        draft(&f, a.id, "Option 1").await;

        f.editor.delete_question(f.session.id, a.id).await.unwrap();
        let stored = f.editor.list_questions(f.session.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, b.id);
        assert_eq!(stored[0].display_order, 0);
        assert!(f.responses.list_for_question(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn published_session_forbids_delete() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();
        let mut published = f.session.clone();
        published.published = true;
        f.questions.save_session(published).await.unwrap();

        let err = f.editor.delete_question(f.session.id, q.id).await.unwrap_err();
        assert!(matches!(err, Error::StructuralConflict(_)));
    }

    #[tokio::test]
    async fn duplicate_appends_copy() {
        let f = fixture().await;
        let a = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        f.editor.add_question(f.session.id, QuestionType::Text, None).await.unwrap();

        let copy = f.editor.duplicate_question(f.session.id, a.id).await.unwrap();
        assert_ne!(copy.id, a.id);
        assert_eq!(copy.display_order, 2);
        assert_eq!(copy.settings, a.settings);
    }

    #[tokio::test]
    async fn delete_session_cascades() {
        let f = fixture().await;
        let q = f.editor.add_question(f.session.id, QuestionType::Mcq, None).await.unwrap();
        draft(&f, q.id, "Option 1").await;

        f.editor.delete_session(f.session.id).await.unwrap();
        assert!(f.editor.list_questions(f.session.id).await.unwrap().is_empty());
        assert!(f.responses.list_for_question(q.id).await.unwrap().is_empty());
        assert!(matches!(
            f.questions.get_session(f.session.id).await.unwrap_err(),
            storage::Error::NotFound(_)
        ));
    }
}

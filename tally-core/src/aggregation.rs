//! Result aggregation over submitted responses.
//!
//! Only `SUBMITTED` responses whose details still validate against the
//! question's current settings are counted. Responses to deleted questions
//! are never read because aggregation is driven by the current question list.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::kinds::Answer;
use crate::question::Question;
use crate::question_type::QuestionType;
use crate::response::{Response, SubmissionState};
use crate::storage::{QuestionStore, RecipientRoster, ResponseStore};
use crate::summary::Summary;
use crate::types::{QuestionId, RecipientId, RespondentId, SessionId};

/// Summary of one question, with enough context to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub question_type: QuestionType,
    pub text: String,
    pub display_order: u32,
    pub summary: Summary,
}

/// How far respondents on the roster have got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStats {
    pub expected: usize,
    pub submitted: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

/// Reduce the responses to one question into its summary.
///
/// Drafts, responses to other questions, blank responses and responses that
/// fail validation against the current settings are skipped.
pub fn aggregate_question<'a>(
    question: &Question,
    responses: impl IntoIterator<Item = &'a Response>,
) -> Summary {
    let mut skipped = 0usize;
    let answers: Vec<Answer<'_, _>> = responses
        .into_iter()
        .filter(|r| r.question_id == question.id && r.is_submitted())
        .filter_map(|r| {
            let details = r.details.as_ref()?;
            if question.settings.validate_response(details).is_ok() {
                Some(Answer {
                    respondent: &r.respondent_id,
                    recipient: r.recipient_id.as_ref(),
                    details,
                })
            } else {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        debug!(question = %question.id, skipped, "ignoring responses invalid under current settings");
    }
    question.settings.aggregate(&answers)
}

/// Summaries for every question, in display order.
pub fn aggregate_session(questions: &[Question], responses: &[Response]) -> Vec<QuestionResult> {
    questions
        .iter()
        .map(|q| QuestionResult {
            question_id: q.id,
            question_type: q.question_type(),
            text: q.text.clone(),
            display_order: q.display_order,
            summary: aggregate_question(q, responses),
        })
        .collect()
}

/// Reads stores and the roster to produce session results.
pub struct ResultsService {
    questions: Arc<dyn QuestionStore>,
    responses: Arc<dyn ResponseStore>,
    roster: Arc<dyn RecipientRoster>,
}

impl ResultsService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        responses: Arc<dyn ResponseStore>,
        roster: Arc<dyn RecipientRoster>,
    ) -> Self {
        Self {
            questions,
            responses,
            roster,
        }
    }

    /// Results for every question of a session.
    ///
    /// Responses from people no longer on the roster, or about recipients
    /// they are no longer eligible to rate, are left out.
    pub async fn session_results(&self, session_id: SessionId) -> Result<Vec<QuestionResult>> {
        let questions = self.questions.load_questions(session_id).await?;
        let responses = self.current_responses(session_id, &questions).await?;
        debug!(session = %session_id, questions = questions.len(), responses = responses.len(), "aggregating");
        Ok(aggregate_session(&questions, &responses))
    }

    /// Results for a single question.
    pub async fn question_results(&self, session_id: SessionId, question_id: QuestionId) -> Result<QuestionResult> {
        let questions = self.questions.load_questions(session_id).await?;
        let question = questions
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| Error::NotFound(format!("question {question_id}")))?;
        let responses = self.current_responses(session_id, std::slice::from_ref(&question)).await?;
        Ok(QuestionResult {
            question_id,
            question_type: question.question_type(),
            text: question.text.clone(),
            display_order: question.display_order,
            summary: aggregate_question(&question, &responses),
        })
    }

    /// Submission progress of everyone on the roster.
    pub async fn response_stats(&self, session_id: SessionId) -> Result<ResponseStats> {
        let respondents = self.roster.respondents(session_id).await?;
        let mut by_respondent: BTreeMap<RespondentId, Vec<Response>> = BTreeMap::new();
        for response in self.responses.list_for_session(session_id).await? {
            by_respondent
                .entry(response.respondent_id.clone())
                .or_default()
                .push(response);
        }

        let mut stats = ResponseStats {
            expected: respondents.len(),
            ..ResponseStats::default()
        };
        for respondent in &respondents {
            let state = by_respondent
                .get(respondent)
                .map_or(SubmissionState::NotStarted, |rs| SubmissionState::of(rs));
            match state {
                SubmissionState::Submitted => stats.submitted += 1,
                SubmissionState::InProgress => stats.in_progress += 1,
                SubmissionState::NotStarted => stats.not_started += 1,
            }
        }
        Ok(stats)
    }

    async fn current_responses(&self, session_id: SessionId, questions: &[Question]) -> Result<Vec<Response>> {
        let respondents = self.roster.respondents(session_id).await?;
        let by_id: HashMap<QuestionId, &Question> = questions.iter().map(|q| (q.id, q)).collect();
        let mut eligible: HashMap<(RespondentId, QuestionId), BTreeSet<RecipientId>> = HashMap::new();

        let mut kept = Vec::new();
        for response in self.responses.list_for_session(session_id).await? {
            let Some(question) = by_id.get(&response.question_id) else {
                continue;
            };
            if !respondents.contains(&response.respondent_id) {
                continue;
            }
            if let Some(recipient) = &response.recipient_id {
                let cache_key = (response.respondent_id.clone(), question.id);
                if !eligible.contains_key(&cache_key) {
                    let recipients = self
                        .roster
                        .eligible_recipients(session_id, &response.respondent_id, question)
                        .await?;
                    eligible.insert(cache_key.clone(), recipients);
                }
                if !eligible.get(&cache_key).is_some_and(|set| set.contains(recipient)) {
                    continue;
                }
            }
            kept.push(response);
        }
        Ok(kept)
    }
}

//! In-memory store implementations.
//!
//! Each store keeps its whole state behind one `RwLock`, so every trait
//! method, batches included, is atomic with respect to concurrent readers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Error, QuestionStore, RecipientRoster, ResponseStore, Result};
use crate::question::{FeedbackSession, Question};
use crate::question_type::{QuestionType, RecipientScope};
use crate::response::{Response, ResponseKey, ResponseStatus};
use crate::types::{QuestionId, RecipientId, RespondentId, ResponseId, SessionId};

#[derive(Default)]
struct QuestionState {
    sessions: HashMap<SessionId, FeedbackSession>,
    questions: HashMap<SessionId, Vec<Question>>,
}

/// In-memory [`QuestionStore`].
#[derive(Default)]
pub struct MemoryQuestionStore {
    state: RwLock<QuestionState>,
}

impl MemoryQuestionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `session` and its `questions`.
    pub async fn with_session(session: FeedbackSession, questions: Vec<Question>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write().await;
            let mut questions = questions;
            questions.sort_by_key(|q| q.display_order);
            state.questions.insert(session.id, questions);
            state.sessions.insert(session.id, session);
        }
        store
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn get_session(&self, id: SessionId) -> Result<FeedbackSession> {
        self.state
            .read()
            .await
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("session {id}")))
    }

    async fn save_session(&self, session: FeedbackSession) -> Result<()> {
        let mut state = self.state.write().await;
        state.questions.entry(session.id).or_default();
        state.sessions.insert(session.id, session);
        Ok(())
    }

    async fn load_questions(&self, session_id: SessionId) -> Result<Vec<Question>> {
        Ok(self
            .state
            .read()
            .await
            .questions
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_question(&self, question: Question) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&question.session_id) {
            return Err(Error::NotFound(format!("session {}", question.session_id)));
        }
        let questions = state.questions.entry(question.session_id).or_default();
        match questions.iter_mut().find(|q| q.id == question.id) {
            Some(existing) => *existing = question,
            None => questions.push(question),
        }
        questions.sort_by_key(|q| q.display_order);
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<()> {
        let mut state = self.state.write().await;
        for questions in state.questions.values_mut() {
            if let Some(pos) = questions.iter().position(|q| q.id == id) {
                questions.remove(pos);
                return Ok(());
            }
        }
        Err(Error::NotFound(format!("question {id}")))
    }

    async fn apply_batch(
        &self,
        session_id: SessionId,
        expected: &[QuestionId],
        upserts: Vec<Question>,
        deletes: &[QuestionId],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&session_id) {
            return Err(Error::NotFound(format!("session {session_id}")));
        }
        if let Some(foreign) = upserts.iter().find(|q| q.session_id != session_id) {
            return Err(Error::Conflict(format!(
                "question {} belongs to session {}",
                foreign.id, foreign.session_id
            )));
        }

        let questions = state.questions.entry(session_id).or_default();
        let stored: BTreeSet<QuestionId> = questions.iter().map(|q| q.id).collect();
        let expected: BTreeSet<QuestionId> = expected.iter().copied().collect();
        if stored != expected {
            return Err(Error::Conflict(format!(
                "questions of session {session_id} changed since they were read"
            )));
        }

        questions.retain(|q| !deletes.contains(&q.id));
        for question in upserts {
            match questions.iter_mut().find(|q| q.id == question.id) {
                Some(existing) => *existing = question,
                None => questions.push(question),
            }
        }
        questions.sort_by_key(|q| q.display_order);
        Ok(())
    }

    async fn delete_session(&self, id: SessionId) -> Result<()> {
        let mut state = self.state.write().await;
        if state.sessions.remove(&id).is_none() {
            return Err(Error::NotFound(format!("session {id}")));
        }
        state.questions.remove(&id);
        Ok(())
    }
}

/// In-memory [`ResponseStore`].
#[derive(Default)]
pub struct MemoryResponseStore {
    responses: RwLock<BTreeMap<ResponseKey, Response>>,
}

impl MemoryResponseStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `responses` as given, statuses included.
    pub async fn with_responses(responses: impl IntoIterator<Item = Response>) -> Self {
        let store = Self::new();
        {
            let mut map = store.responses.write().await;
            for response in responses {
                map.insert(response.key(), response);
            }
        }
        store
    }
}

#[async_trait]
impl ResponseStore for MemoryResponseStore {
    async fn get_response(&self, key: &ResponseKey) -> Result<Option<Response>> {
        Ok(self.responses.read().await.get(key).cloned())
    }

    async fn list_for_respondent(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
    ) -> Result<Vec<Response>> {
        Ok(self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.session_id == session_id && &r.respondent_id == respondent_id)
            .cloned()
            .collect())
    }

    async fn list_for_session(&self, session_id: SessionId) -> Result<Vec<Response>> {
        Ok(self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn list_for_question(&self, question_id: QuestionId) -> Result<Vec<Response>> {
        Ok(self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn save_response(&self, response: Response) -> Result<()> {
        let mut responses = self.responses.write().await;
        let key = response.key();
        if responses.get(&key).is_some_and(Response::is_submitted) {
            return Err(Error::Conflict(format!(
                "response to question {} is already submitted",
                key.question_id
            )));
        }
        responses.insert(key, response);
        Ok(())
    }

    async fn delete_response(&self, key: &ResponseKey) -> Result<()> {
        let mut responses = self.responses.write().await;
        match responses.get(key) {
            None => Err(Error::NotFound(format!("response to question {}", key.question_id))),
            Some(r) if r.is_submitted() => Err(Error::Conflict(format!(
                "response to question {} is already submitted",
                key.question_id
            ))),
            Some(_) => {
                responses.remove(key);
                Ok(())
            }
        }
    }

    async fn cancel_drafts(&self, question_id: QuestionId) -> Result<usize> {
        let mut responses = self.responses.write().await;
        let before = responses.len();
        responses.retain(|_, r| r.question_id != question_id || r.is_submitted());
        Ok(before - responses.len())
    }

    async fn submit_all(
        &self,
        session_id: SessionId,
        respondent_id: &RespondentId,
        freeze: &[ResponseId],
        discard: &[ResponseId],
    ) -> Result<()> {
        let mut responses = self.responses.write().await;
        let drafts: BTreeSet<ResponseId> = responses
            .values()
            .filter(|r| {
                r.session_id == session_id && &r.respondent_id == respondent_id && !r.is_submitted()
            })
            .map(|r| r.id)
            .collect();
        let snapshot: BTreeSet<ResponseId> = freeze.iter().chain(discard).copied().collect();
        if drafts != snapshot {
            return Err(Error::Conflict(format!(
                "drafts of {respondent_id} changed during submission"
            )));
        }

        let now = Utc::now();
        responses.retain(|_, r| !discard.contains(&r.id));
        for response in responses.values_mut() {
            if freeze.contains(&response.id) {
                response.status = ResponseStatus::Submitted;
                response.submitted_at = Some(now);
            }
        }
        Ok(())
    }

    async fn reopen_all(&self, session_id: SessionId, respondent_id: &RespondentId) -> Result<usize> {
        let mut responses = self.responses.write().await;
        let mut reopened = 0;
        for response in responses.values_mut() {
            if response.session_id == session_id
                && &response.respondent_id == respondent_id
                && response.is_submitted()
            {
                response.status = ResponseStatus::InProgress;
                response.submitted_at = None;
                reopened += 1;
            }
        }
        Ok(reopened)
    }
}

/// Fixed team roster shared by every session.
///
/// Peers are the members of the respondent's team (self included only for
/// contribution questions, which ask for a self-estimate). Teams are all
/// other teams.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    teams: BTreeMap<String, BTreeSet<RespondentId>>,
}

impl StaticRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a team with its members.
    #[must_use]
    pub fn with_team<I, S>(mut self, team: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams
            .entry(team.into())
            .or_default()
            .extend(members.into_iter().map(RespondentId::new));
        self
    }

    fn teams_of<'a>(&'a self, respondent: &'a RespondentId) -> impl Iterator<Item = &'a String> + 'a {
        self.teams
            .iter()
            .filter(move |(_, members)| members.contains(respondent))
            .map(|(team, _)| team)
    }
}

#[async_trait]
impl RecipientRoster for StaticRoster {
    async fn eligible_recipients(
        &self,
        _session_id: SessionId,
        respondent_id: &RespondentId,
        question: &Question,
    ) -> Result<BTreeSet<RecipientId>> {
        let own: BTreeSet<&String> = self.teams_of(respondent_id).collect();
        let recipients = match question.recipient_scope {
            RecipientScope::None => BTreeSet::new(),
            RecipientScope::Peers => {
                let include_self = question.question_type() == QuestionType::Contribution;
                own.iter()
                    .filter_map(|team| self.teams.get(*team))
                    .flatten()
                    .filter(|member| include_self || *member != respondent_id)
                    .map(|member| RecipientId::new(member.as_str()))
                    .collect()
            }
            RecipientScope::Teams => self
                .teams
                .keys()
                .filter(|team| !own.contains(team))
                .map(|team| RecipientId::new(team.as_str()))
                .collect(),
        };
        Ok(recipients)
    }

    async fn respondents(&self, _session_id: SessionId) -> Result<BTreeSet<RespondentId>> {
        Ok(self.teams.values().flatten().cloned().collect())
    }
}

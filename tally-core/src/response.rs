//! Responses and the per-respondent submission state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::ResponseDetails;
use crate::types::{QuestionId, RecipientId, RespondentId, ResponseId, SessionId};

/// Lifecycle of one stored response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Editable draft
    #[default]
    InProgress,
    /// Frozen
    Submitted,
}

impl ResponseStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Submitted => "SUBMITTED",
        }
    }
}

/// Where one respondent stands in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    NotStarted,
    InProgress,
    Submitted,
}

impl SubmissionState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Submitted => "SUBMITTED",
        }
    }

    /// Parse from the wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOT_STARTED" => Some(Self::NotStarted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "SUBMITTED" => Some(Self::Submitted),
            _ => None,
        }
    }

    /// Derive the state from a respondent's stored responses.
    pub fn of<'a>(responses: impl IntoIterator<Item = &'a Response>) -> Self {
        let mut state = Self::NotStarted;
        for response in responses {
            match response.status {
                ResponseStatus::InProgress => return Self::InProgress,
                ResponseStatus::Submitted => state = Self::Submitted,
            }
        }
        state
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store key of a response: at most one per (question, respondent, recipient).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseKey {
    pub question_id: QuestionId,
    pub respondent_id: RespondentId,
    pub recipient_id: Option<RecipientId>,
}

/// One respondent's answer to one (question, recipient) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: ResponseId,
    pub question_id: QuestionId,
    pub session_id: SessionId,
    pub respondent_id: RespondentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<RecipientId>,
    /// `None` for a blank skeleton entry
    #[serde(default)]
    pub details: Option<ResponseDetails>,
    #[serde(default)]
    pub status: ResponseStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Response {
    /// A blank, unsaved draft for `key`.
    pub fn blank(session_id: SessionId, key: ResponseKey) -> Self {
        Self {
            id: ResponseId::new(),
            question_id: key.question_id,
            session_id,
            respondent_id: key.respondent_id,
            recipient_id: key.recipient_id,
            details: None,
            status: ResponseStatus::InProgress,
            updated_at: Utc::now(),
            submitted_at: None,
        }
    }

    pub fn key(&self) -> ResponseKey {
        ResponseKey {
            question_id: self.question_id,
            respondent_id: self.respondent_id.clone(),
            recipient_id: self.recipient_id.clone(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == ResponseStatus::Submitted
    }
}

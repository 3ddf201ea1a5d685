//! Questions, sessions and template questions.

use serde::{Deserialize, Serialize};

use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::QuestionSettings;
use crate::types::{QuestionId, SessionId, TemplateId};
use crate::validation::ValidationResult;

/// A feedback session: the owner of an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSession {
    pub id: SessionId,
    pub name: String,
    /// Results have been released; questions can no longer be deleted
    #[serde(default)]
    pub published: bool,
    /// Submitted responses may be reopened for editing
    #[serde(default)]
    pub open_for_edits: bool,
}

impl FeedbackSession {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            published: false,
            open_for_edits: false,
        }
    }
}

/// One configured, typed prompt within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub session_id: SessionId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub settings: QuestionSettings,
    #[serde(default)]
    pub recipient_scope: RecipientScope,
    #[serde(default = "default_required")]
    pub required: bool,
    pub display_order: u32,
}

fn default_required() -> bool {
    true
}

impl Question {
    /// A new question of `question_type` with default settings and scope.
    pub fn new(session_id: SessionId, question_type: QuestionType, display_order: u32) -> Self {
        Self {
            id: QuestionId::new(),
            session_id,
            text: String::new(),
            description: None,
            settings: QuestionSettings::default_for(question_type),
            recipient_scope: QuestionSettings::default_scope(question_type),
            required: true,
            display_order,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.settings.question_type()
    }

    /// Whether responses fan out to one per eligible recipient.
    pub fn is_recipient_scoped(&self) -> bool {
        self.recipient_scope.requires_recipient()
    }

    /// Settings checks plus scope compatibility.
    pub fn validate(&self) -> ValidationResult {
        let mut result = self.settings.validate();
        result.check(
            self.settings.supports_scope(self.recipient_scope),
            "recipientScope",
            format!(
                "{} questions cannot be asked with scope {}",
                self.question_type(),
                self.recipient_scope
            ),
        );
        result
    }

    /// Copy of this question with a fresh id at `display_order`.
    pub fn duplicate(&self, display_order: u32) -> Self {
        Self {
            id: QuestionId::new(),
            display_order,
            ..self.clone()
        }
    }
}

/// Pre-authored starting point for a new question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuestion {
    pub id: TemplateId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_scope: Option<RecipientScope>,
    pub settings: QuestionSettings,
}

impl TemplateQuestion {
    pub fn question_type(&self) -> QuestionType {
        self.settings.question_type()
    }

    /// Materialize as an independent question in `session_id`.
    pub fn instantiate(&self, session_id: SessionId, display_order: u32) -> Question {
        let question_type = self.question_type();
        Question {
            id: QuestionId::new(),
            session_id,
            text: self.text.clone(),
            description: self.description.clone(),
            settings: self.settings.clone(),
            recipient_scope: self
                .recipient_scope
                .unwrap_or_else(|| QuestionSettings::default_scope(question_type)),
            required: true,
            display_order,
        }
    }
}

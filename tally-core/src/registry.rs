//! Question type registry.
//!
//! [`QuestionSettings`] and [`ResponseDetails`] are the closed tagged unions
//! over all question types. This module is the single place that matches on
//! the tag; every capability is forwarded to the [`QuestionKind`]
//! implementation of the variant.

use serde::{Deserialize, Serialize};

use crate::kinds::*;
use crate::question_type::{QuestionType, RecipientScope};
use crate::summary::Summary;
use crate::validation::ValidationResult;

/// Type tag plus type-specific configuration of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionSettings {
    Mcq(McqSettings),
    Msq(MsqSettings),
    NumericalScale(NumericalScaleSettings),
    Text(TextSettings),
    Rubric(RubricSettings),
    RankOptions(RankOptionsSettings),
    RankRecipients(RankRecipientsSettings),
    Contribution(ContributionSettings),
    ConstantSum(ConstantSumSettings),
}

/// Type tag plus type-specific content of one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseDetails {
    Mcq(McqDetails),
    Msq(MsqDetails),
    NumericalScale(NumericalScaleDetails),
    Text(TextDetails),
    Rubric(RubricDetails),
    RankOptions(RankOptionsDetails),
    RankRecipients(RankRecipientsDetails),
    Contribution(ContributionDetails),
    ConstantSum(ConstantSumDetails),
}

/// Bind the settings variant to `$kind` and evaluate `$body` once per type.
macro_rules! with_kind {
    ($settings:expr, $kind:ident => $body:expr) => {
        match $settings {
            QuestionSettings::Mcq($kind) => $body,
            QuestionSettings::Msq($kind) => $body,
            QuestionSettings::NumericalScale($kind) => $body,
            QuestionSettings::Text($kind) => $body,
            QuestionSettings::Rubric($kind) => $body,
            QuestionSettings::RankOptions($kind) => $body,
            QuestionSettings::RankRecipients($kind) => $body,
            QuestionSettings::Contribution($kind) => $body,
            QuestionSettings::ConstantSum($kind) => $body,
        }
    };
}

/// Invoke `$f::<Settings>()` for the settings type behind a [`QuestionType`].
macro_rules! for_type {
    ($question_type:expr, $f:ident) => {
        match $question_type {
            QuestionType::Mcq => $f::<McqSettings>(),
            QuestionType::Msq => $f::<MsqSettings>(),
            QuestionType::NumericalScale => $f::<NumericalScaleSettings>(),
            QuestionType::Text => $f::<TextSettings>(),
            QuestionType::Rubric => $f::<RubricSettings>(),
            QuestionType::RankOptions => $f::<RankOptionsSettings>(),
            QuestionType::RankRecipients => $f::<RankRecipientsSettings>(),
            QuestionType::Contribution => $f::<ContributionSettings>(),
            QuestionType::ConstantSum => $f::<ConstantSumSettings>(),
        }
    };
}

/// Wrap a concrete settings value back into the union.
trait IntoSettings {
    fn into_settings(self) -> QuestionSettings;
}

macro_rules! into_settings {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(impl IntoSettings for $ty {
            fn into_settings(self) -> QuestionSettings {
                QuestionSettings::$variant(self)
            }
        })*
    };
}

into_settings! {
    Mcq => McqSettings,
    Msq => MsqSettings,
    NumericalScale => NumericalScaleSettings,
    Text => TextSettings,
    Rubric => RubricSettings,
    RankOptions => RankOptionsSettings,
    RankRecipients => RankRecipientsSettings,
    Contribution => ContributionSettings,
    ConstantSum => ConstantSumSettings,
}

fn default_settings_of<K: QuestionKind + IntoSettings>() -> QuestionSettings {
    K::default_settings().into_settings()
}

fn default_scope_of<K: QuestionKind>() -> RecipientScope {
    K::default_scope()
}

fn type_mismatch(expected: QuestionType, got: QuestionType) -> ValidationResult {
    ValidationResult::single(
        "details",
        format!("expected an answer to a {expected} question, got {got}"),
    )
}

fn validate_response_with<K: QuestionKind>(kind: &K, details: &ResponseDetails) -> ValidationResult {
    match K::details_of(details) {
        Some(typed) => kind.validate_response(typed),
        None => type_mismatch(K::TYPE, details.question_type()),
    }
}

fn validate_recipient_set_with<K: QuestionKind>(
    kind: &K,
    answers: &[&ResponseDetails],
    recipients: usize,
) -> ValidationResult {
    let typed: Vec<&K::Details> = answers.iter().filter_map(|d| K::details_of(d)).collect();
    kind.validate_recipient_set(&typed, recipients)
}

fn aggregate_with<K: QuestionKind>(kind: &K, answers: &[Answer<'_, ResponseDetails>]) -> Summary {
    let typed: Vec<Answer<'_, K::Details>> = answers
        .iter()
        .filter_map(|a| {
            K::details_of(a.details).map(|details| Answer {
                respondent: a.respondent,
                recipient: a.recipient,
                details,
            })
        })
        .collect();
    kind.aggregate(&typed)
}

impl QuestionSettings {
    /// Minimal valid settings for a new question of `question_type`.
    pub fn default_for(question_type: QuestionType) -> Self {
        for_type!(question_type, default_settings_of)
    }

    /// Recipient scope a new question of `question_type` starts with.
    pub fn default_scope(question_type: QuestionType) -> RecipientScope {
        for_type!(question_type, default_scope_of)
    }

    pub fn question_type(&self) -> QuestionType {
        with_kind!(self, k => kind_type(k))
    }

    pub fn validate(&self) -> ValidationResult {
        with_kind!(self, k => k.validate_settings())
    }

    /// Check one answer; details of another type yield a `details` violation.
    pub fn validate_response(&self, details: &ResponseDetails) -> ValidationResult {
        with_kind!(self, k => validate_response_with(k, details))
    }

    /// Check rules spanning one respondent's answers across the
    /// `recipients` recipients they are eligible to rate.
    pub fn validate_recipient_set(&self, answers: &[&ResponseDetails], recipients: usize) -> ValidationResult {
        with_kind!(self, k => validate_recipient_set_with(k, answers, recipients))
    }

    /// Reduce answers to a summary. Answers of another type are ignored.
    pub fn aggregate(&self, answers: &[Answer<'_, ResponseDetails>]) -> Summary {
        with_kind!(self, k => aggregate_with(k, answers))
    }

    pub fn supports_scope(&self, scope: RecipientScope) -> bool {
        with_kind!(self, k => k.supports_scope(scope))
    }
}

fn kind_type<K: QuestionKind>(_kind: &K) -> QuestionType {
    K::TYPE
}

impl ResponseDetails {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::Mcq(_) => QuestionType::Mcq,
            Self::Msq(_) => QuestionType::Msq,
            Self::NumericalScale(_) => QuestionType::NumericalScale,
            Self::Text(_) => QuestionType::Text,
            Self::Rubric(_) => QuestionType::Rubric,
            Self::RankOptions(_) => QuestionType::RankOptions,
            Self::RankRecipients(_) => QuestionType::RankRecipients,
            Self::Contribution(_) => QuestionType::Contribution,
            Self::ConstantSum(_) => QuestionType::ConstantSum,
        }
    }
}

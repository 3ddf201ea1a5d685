//! Per-type capability implementations.
//!
//! Each question type is a settings struct implementing [`QuestionKind`].
//! The registry (`crate::registry`) is the only place that matches on the
//! type tag; everything here is written against one concrete type.

mod constant_sum;
mod contribution;
mod mcq;
mod msq;
mod numerical;
mod rank;
mod rubric;
mod text;

pub use constant_sum::{ConstantSumDetails, ConstantSumSettings, ConstantSumTarget};
pub use contribution::{ContributionAnswer, ContributionDetails, ContributionSettings};
pub use mcq::{McqDetails, McqSettings};
pub use msq::{MsqDetails, MsqSettings};
pub use numerical::{NumericalScaleDetails, NumericalScaleSettings};
pub use rank::{RankOptionsDetails, RankOptionsSettings, RankRecipientsDetails, RankRecipientsSettings};
pub use rubric::{RubricDetails, RubricSettings};
pub use text::{TextDetails, TextSettings};

use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::ResponseDetails;
use crate::summary::Summary;
use crate::types::{RecipientId, RespondentId};
use crate::validation::ValidationResult;

/// One answer as seen by aggregation: the details plus who gave it and about whom.
#[derive(Debug)]
pub struct Answer<'a, D> {
    pub respondent: &'a RespondentId,
    pub recipient: Option<&'a RecipientId>,
    pub details: &'a D,
}

// Manual impls: the derive would require `D: Copy`.
impl<D> Clone for Answer<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Answer<'_, D> {}

/// Capabilities every question type provides.
///
/// All operations are pure: no I/O, no hidden state.
pub trait QuestionKind: Sized {
    /// Shape of one answer to a question of this type.
    type Details;

    /// The type tag this kind implements.
    const TYPE: QuestionType;

    /// A minimal valid configuration for a freshly added question.
    fn default_settings() -> Self;

    /// Structural and semantic checks of the configuration.
    fn validate_settings(&self) -> ValidationResult;

    /// Check one answer against this configuration.
    fn validate_response(&self, details: &Self::Details) -> ValidationResult;

    /// Check rules that span all of one respondent's answers to a
    /// recipient-scoped question (e.g. points that must add up).
    ///
    /// `answers` may cover only some of the `recipients` eligible recipients
    /// when the question is optional.
    fn validate_recipient_set(&self, _answers: &[&Self::Details], _recipients: usize) -> ValidationResult {
        ValidationResult::ok()
    }

    /// Reduce valid answers into a summary. Must not depend on answer order.
    fn aggregate(&self, answers: &[Answer<'_, Self::Details>]) -> Summary;

    /// Recipient scope a new question of this type starts with.
    fn default_scope() -> RecipientScope {
        RecipientScope::None
    }

    /// Whether this configuration can be asked under `scope`.
    fn supports_scope(&self, _scope: RecipientScope) -> bool {
        true
    }

    /// Borrow the details of this kind out of the tagged union.
    fn details_of(details: &ResponseDetails) -> Option<&Self::Details>;
}

//! Free-text (essay) questions.

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::QuestionType;
use crate::registry::ResponseDetails;
use crate::summary::{self, Summary, TextAnswer, TextSummary};
use crate::validation::ValidationResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextSettings {
    /// Suggested answer length in words; advisory only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextDetails {
    pub answer: String,
}

impl QuestionKind for TextSettings {
    type Details = TextDetails;
    const TYPE: QuestionType = QuestionType::Text;

    fn default_settings() -> Self {
        Self::default()
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if let Some(length) = self.recommended_length {
            result.check(length > 0, "recommendedLength", "must be greater than 0");
        }
        result
    }

    fn validate_response(&self, details: &TextDetails) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.check(
            !details.answer.trim().is_empty(),
            "answer",
            "answer must not be blank",
        );
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, TextDetails>]) -> Summary {
        let mut rows: Vec<TextAnswer> = answers
            .iter()
            .map(|a| TextAnswer {
                respondent: a.respondent.clone(),
                recipient: a.recipient.cloned(),
                answer: a.details.answer.trim().to_string(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.respondent, &a.recipient, &a.answer).cmp(&(&b.respondent, &b.recipient, &b.answer))
        });

        let word_counts: Vec<f64> = rows
            .iter()
            .map(|r| r.answer.split_whitespace().count() as f64)
            .collect();

        Summary::Text(TextSummary {
            answers: rows,
            average_word_count: summary::mean(&word_counts),
            recommended_length: self.recommended_length,
        })
    }

    fn details_of(details: &ResponseDetails) -> Option<&TextDetails> {
        match details {
            ResponseDetails::Text(d) => Some(d),
            _ => None,
        }
    }
}

//! Multiple choice, single answer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::QuestionType;
use crate::registry::ResponseDetails;
use crate::summary::{self, ChoiceSummary, OptionCount, Summary};
use crate::validation::{ValidationResult, check_options};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct McqSettings {
    pub options: Vec<String>,
    /// Accept a free-text answer that is not one of `options`
    #[serde(default)]
    pub allow_other: bool,
    /// One weight per option, used for the weighted average in results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct McqDetails {
    pub selected: String,
}

impl McqSettings {
    fn is_option(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o.trim() == answer.trim())
    }
}

impl QuestionKind for McqSettings {
    type Details = McqDetails;
    const TYPE: QuestionType = QuestionType::Mcq;

    fn default_settings() -> Self {
        Self {
            options: vec!["Option 1".to_string(), "Option 2".to_string()],
            allow_other: false,
            weights: None,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_options(&mut result, "options", &self.options, 2);
        if let Some(weights) = &self.weights {
            result.check(
                weights.len() == self.options.len(),
                "weights",
                format!("expected {} weights, one per option", self.options.len()),
            );
            for (i, w) in weights.iter().enumerate() {
                result.check(
                    w.is_finite() && *w >= 0.0,
                    format!("weights[{i}]"),
                    "weight must be a non-negative number",
                );
            }
        }
        result
    }

    fn validate_response(&self, details: &McqDetails) -> ValidationResult {
        let selected = details.selected.trim();
        if selected.is_empty() {
            return ValidationResult::single("selected", "an option must be selected");
        }
        if !self.is_option(selected) && !self.allow_other {
            return ValidationResult::single(
                "selected",
                format!("'{selected}' is not one of the configured options"),
            );
        }
        ValidationResult::ok()
    }

    fn aggregate(&self, answers: &[Answer<'_, McqDetails>]) -> Summary {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut other_answers = Vec::new();
        let mut weights = Vec::new();

        for answer in answers {
            let selected = answer.details.selected.trim();
            match self.options.iter().position(|o| o.trim() == selected) {
                Some(index) => {
                    *counts.entry(self.options[index].as_str()).or_default() += 1;
                    if let Some(w) = self.weights.as_ref().and_then(|w| w.get(index)) {
                        weights.push(*w);
                    }
                }
                None => other_answers.push(selected.to_string()),
            }
        }
        other_answers.sort();

        let total = answers.len();
        let options = self
            .options
            .iter()
            .map(|option| {
                let count = counts.get(option.as_str()).copied().unwrap_or(0);
                OptionCount {
                    option: option.clone(),
                    count,
                    percentage: summary::percentage(count as f64, total as f64),
                }
            })
            .collect();

        Summary::Choice(ChoiceSummary {
            response_count: total,
            options,
            other_answers,
            weighted_average: summary::mean(&weights),
        })
    }

    fn details_of(details: &ResponseDetails) -> Option<&McqDetails> {
        match details {
            ResponseDetails::Mcq(d) => Some(d),
            _ => None,
        }
    }
}

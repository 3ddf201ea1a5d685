//! Multiple choice, multiple answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::QuestionType;
use crate::registry::ResponseDetails;
use crate::summary::{self, ChoiceSummary, OptionCount, Summary};
use crate::validation::{ValidationResult, check_options};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MsqSettings {
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_other: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selectable: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selectable: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MsqDetails {
    pub selected: Vec<String>,
}

impl MsqSettings {
    /// Largest number of selections a respondent could make.
    fn selectable_count(&self) -> usize {
        self.options.len() + usize::from(self.allow_other)
    }
}

impl QuestionKind for MsqSettings {
    type Details = MsqDetails;
    const TYPE: QuestionType = QuestionType::Msq;

    fn default_settings() -> Self {
        Self {
            options: vec!["Option 1".to_string(), "Option 2".to_string()],
            allow_other: false,
            min_selectable: None,
            max_selectable: None,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_options(&mut result, "options", &self.options, 2);
        if let Some(min) = self.min_selectable {
            result.check(min >= 1, "minSelectable", "must be at least 1");
            result.check(
                min as usize <= self.selectable_count(),
                "minSelectable",
                "cannot exceed the number of options",
            );
        }
        if let Some(max) = self.max_selectable {
            result.check(max >= 1, "maxSelectable", "must be at least 1");
            result.check(
                max as usize <= self.selectable_count(),
                "maxSelectable",
                "cannot exceed the number of options",
            );
        }
        if let (Some(min), Some(max)) = (self.min_selectable, self.max_selectable) {
            result.check(min <= max, "minSelectable", "must not be greater than maxSelectable");
        }
        result
    }

    fn validate_response(&self, details: &MsqDetails) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut others = 0usize;

        for (i, selected) in details.selected.iter().enumerate() {
            let value = selected.trim();
            if value.is_empty() {
                result.push(format!("selected[{i}]"), "selection must not be empty");
                continue;
            }
            if details.selected[..i].iter().any(|s| s.trim() == value) {
                result.push(format!("selected[{i}]"), format!("'{value}' is selected twice"));
                continue;
            }
            if !self.options.iter().any(|o| o.trim() == value) {
                if self.allow_other {
                    others += 1;
                } else {
                    result.push(
                        format!("selected[{i}]"),
                        format!("'{value}' is not one of the configured options"),
                    );
                }
            }
        }
        result.check(others <= 1, "selected", "only one 'other' answer is allowed");

        let count = details.selected.len();
        if count == 0 {
            result.push("selected", "at least one option must be selected");
        }
        if let Some(min) = self.min_selectable {
            result.check(
                count >= min as usize,
                "selected",
                format!("select at least {min} options"),
            );
        }
        if let Some(max) = self.max_selectable {
            result.check(
                count <= max as usize,
                "selected",
                format!("select at most {max} options"),
            );
        }
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, MsqDetails>]) -> Summary {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut other_answers = Vec::new();

        for answer in answers {
            for selected in &answer.details.selected {
                let value = selected.trim();
                match self.options.iter().find(|o| o.trim() == value) {
                    Some(option) => *counts.entry(option.as_str()).or_default() += 1,
                    None => other_answers.push(value.to_string()),
                }
            }
        }
        other_answers.sort();

        let respondents = answers.len();
        let options = self
            .options
            .iter()
            .map(|option| {
                let count = counts.get(option.as_str()).copied().unwrap_or(0);
                OptionCount {
                    option: option.clone(),
                    count,
                    percentage: summary::percentage(count as f64, respondents as f64),
                }
            })
            .collect();

        Summary::Choice(ChoiceSummary {
            response_count: respondents,
            options,
            other_answers,
            weighted_average: None,
        })
    }

    fn details_of(details: &ResponseDetails) -> Option<&MsqDetails> {
        match details {
            ResponseDetails::Msq(d) => Some(d),
            _ => None,
        }
    }
}

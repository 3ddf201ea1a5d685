//! Rubric: criteria rated against an ordered scale.

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::QuestionType;
use crate::registry::ResponseDetails;
use crate::summary::{self, CriterionSummary, RubricSummary, Summary};
use crate::validation::{ValidationResult, check_options};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RubricSettings {
    /// Sub-questions, each rated on the same scale
    pub criteria: Vec<String>,
    /// Scale levels, in order
    pub choices: Vec<String>,
    /// `weights[criterion][choice]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RubricDetails {
    /// Chosen scale index per criterion; `None` leaves a criterion unanswered
    pub answers: Vec<Option<usize>>,
}

impl RubricSettings {
    fn score(&self, criterion: usize, choice: usize) -> f64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(criterion))
            .and_then(|row| row.get(choice))
            .copied()
            .unwrap_or((choice + 1) as f64)
    }
}

impl QuestionKind for RubricSettings {
    type Details = RubricDetails;
    const TYPE: QuestionType = QuestionType::Rubric;

    fn default_settings() -> Self {
        Self {
            criteria: vec!["This student has done a good job.".to_string()],
            choices: vec!["Agree".to_string(), "Disagree".to_string()],
            weights: None,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_options(&mut result, "criteria", &self.criteria, 1);
        check_options(&mut result, "choices", &self.choices, 2);
        if let Some(weights) = &self.weights {
            result.check(
                weights.len() == self.criteria.len(),
                "weights",
                format!("expected one row of weights per criterion ({})", self.criteria.len()),
            );
            for (i, row) in weights.iter().enumerate() {
                result.check(
                    row.len() == self.choices.len(),
                    format!("weights[{i}]"),
                    format!("expected {} weights, one per choice", self.choices.len()),
                );
                result.check(
                    row.iter().all(|w| w.is_finite()),
                    format!("weights[{i}]"),
                    "weights must be finite numbers",
                );
            }
        }
        result
    }

    fn validate_response(&self, details: &RubricDetails) -> ValidationResult {
        if details.answers.len() != self.criteria.len() {
            return ValidationResult::single(
                "answers",
                format!("expected {} answers, one per criterion", self.criteria.len()),
            );
        }
        let mut result = ValidationResult::ok();
        for (i, answer) in details.answers.iter().enumerate() {
            if let Some(choice) = answer {
                result.check(
                    *choice < self.choices.len(),
                    format!("answers[{i}]"),
                    "choice index out of range",
                );
            }
        }
        result.check(
            details.answers.iter().any(Option::is_some),
            "answers",
            "at least one criterion must be answered",
        );
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, RubricDetails>]) -> Summary {
        let criteria = self
            .criteria
            .iter()
            .enumerate()
            .map(|(ci, criterion)| {
                let mut counts = vec![0usize; self.choices.len()];
                let mut scores = Vec::new();
                for answer in answers {
                    if let Some(Some(choice)) = answer.details.answers.get(ci)
                        && let Some(count) = counts.get_mut(*choice)
                    {
                        *count += 1;
                        scores.push(self.score(ci, *choice));
                    }
                }
                CriterionSummary {
                    criterion: criterion.clone(),
                    answered: scores.len(),
                    mean: summary::mean(&scores),
                    median: summary::median(&scores),
                    counts,
                }
            })
            .collect();

        Summary::Rubric(RubricSummary {
            response_count: answers.len(),
            choices: self.choices.clone(),
            criteria,
        })
    }

    fn details_of(details: &ResponseDetails) -> Option<&RubricDetails> {
        match details {
            ResponseDetails::Rubric(d) => Some(d),
            _ => None,
        }
    }
}

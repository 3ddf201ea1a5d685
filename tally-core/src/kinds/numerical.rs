//! Numerical scale with bounds and a step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::QuestionType;
use crate::registry::ResponseDetails;
use crate::summary::{self, ScalePoint, ScaleSummary, Summary};
use crate::validation::ValidationResult;

/// Slack allowed when checking that a value sits on a step.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumericalScaleSettings {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumericalScaleDetails {
    pub answer: f64,
}

impl NumericalScaleSettings {
    /// Number of whole steps from `min` to `value`, if `value` sits on a step.
    fn step_index(&self, value: f64) -> Option<i64> {
        let steps = (value - self.min) / self.step;
        let rounded = steps.round();
        ((steps - rounded).abs() <= STEP_EPSILON * steps.abs().max(1.0)).then_some(rounded as i64)
    }
}

impl QuestionKind for NumericalScaleSettings {
    type Details = NumericalScaleDetails;
    const TYPE: QuestionType = QuestionType::NumericalScale;

    fn default_settings() -> Self {
        Self {
            min: 1.0,
            max: 5.0,
            step: 1.0,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.check(self.min.is_finite(), "min", "must be a finite number");
        result.check(self.max.is_finite(), "max", "must be a finite number");
        result.check(
            self.step.is_finite() && self.step > 0.0,
            "step",
            "must be greater than 0",
        );
        if !result.is_ok() {
            return result;
        }
        result.check(self.min < self.max, "min", "must be less than max");
        if self.min < self.max {
            result.check(
                self.step_index(self.max).is_some(),
                "step",
                "the range from min to max must be a multiple of step",
            );
        }
        result
    }

    fn validate_response(&self, details: &NumericalScaleDetails) -> ValidationResult {
        let answer = details.answer;
        if !answer.is_finite() {
            return ValidationResult::single("answer", "must be a number");
        }
        let mut result = ValidationResult::ok();
        result.check(
            answer >= self.min && answer <= self.max,
            "answer",
            format!("out of range ({} to {})", self.min, self.max),
        );
        result.check(
            self.step_index(answer).is_some(),
            "answer",
            format!("step mismatch (must be {} plus a multiple of {})", self.min, self.step),
        );
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, NumericalScaleDetails>]) -> Summary {
        let values: Vec<f64> = answers.iter().map(|a| a.details.answer).collect();

        let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
        for value in &values {
            let index = ((value - self.min) / self.step).round() as i64;
            *buckets.entry(index).or_default() += 1;
        }
        let distribution = buckets
            .into_iter()
            .map(|(index, count)| ScalePoint {
                value: self.min + index as f64 * self.step,
                count,
            })
            .collect();

        Summary::Scale(ScaleSummary {
            response_count: values.len(),
            mean: summary::mean(&values),
            median: summary::median(&values),
            min: values.iter().copied().min_by(f64::total_cmp),
            max: values.iter().copied().max_by(f64::total_cmp),
            distribution,
        })
    }

    fn details_of(details: &ResponseDetails) -> Option<&NumericalScaleDetails> {
        match details {
            ResponseDetails::NumericalScale(d) => Some(d),
            _ => None,
        }
    }
}

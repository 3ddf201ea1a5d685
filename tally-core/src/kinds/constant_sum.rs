//! Constant sum: distribute a fixed pool of points among options or recipients.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::ResponseDetails;
use crate::summary::{self, DistributionEntry, DistributionSummary, Summary};
use crate::validation::{ValidationResult, check_options};

/// What the points are distributed among.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantSumTarget {
    /// Fixed list of options; one answer carries a value per option
    Options { options: Vec<String> },
    /// The question's recipients; one answer per recipient carries a single value
    Recipients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstantSumSettings", into = "RawConstantSumSettings")]
pub struct ConstantSumSettings {
    pub target: ConstantSumTarget,
    pub total_points: u32,
    /// `total_points` is granted once per option/recipient instead of once overall
    pub points_per_target: bool,
    /// Every option/recipient must receive a different amount
    pub force_uneven: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Distribute {
    Options,
    Recipients,
}

/// Wire form of [`ConstantSumSettings`]; `options` only with `distribute = "options"`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConstantSumSettings {
    distribute: Distribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    total_points: u32,
    #[serde(default)]
    points_per_target: bool,
    #[serde(default)]
    force_uneven: bool,
}

impl TryFrom<RawConstantSumSettings> for ConstantSumSettings {
    type Error = String;

    fn try_from(raw: RawConstantSumSettings) -> Result<Self, Self::Error> {
        let target = match (raw.distribute, raw.options) {
            (Distribute::Options, Some(options)) => ConstantSumTarget::Options { options },
            (Distribute::Options, None) => {
                return Err("`options` is required when distributing among options".to_string());
            }
            (Distribute::Recipients, None) => ConstantSumTarget::Recipients,
            (Distribute::Recipients, Some(_)) => {
                return Err("`options` is not used when distributing among recipients".to_string());
            }
        };
        Ok(Self {
            target,
            total_points: raw.total_points,
            points_per_target: raw.points_per_target,
            force_uneven: raw.force_uneven,
        })
    }
}

impl From<ConstantSumSettings> for RawConstantSumSettings {
    fn from(settings: ConstantSumSettings) -> Self {
        let (distribute, options) = match settings.target {
            ConstantSumTarget::Options { options } => (Distribute::Options, Some(options)),
            ConstantSumTarget::Recipients => (Distribute::Recipients, None),
        };
        Self {
            distribute,
            options,
            total_points: settings.total_points,
            points_per_target: settings.points_per_target,
            force_uneven: settings.force_uneven,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstantSumDetails {
    pub points: Vec<u32>,
}

impl ConstantSumSettings {
    fn expected_total(&self, targets: usize) -> u64 {
        if self.points_per_target {
            u64::from(self.total_points) * targets as u64
        } else {
            u64::from(self.total_points)
        }
    }

    /// Sum and unevenness rules over one full distribution.
    fn check_distribution(&self, field: &str, values: &[u32]) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let expected = self.expected_total(values.len());
        let total: u64 = values.iter().map(|v| u64::from(*v)).sum();
        result.check(
            total == expected,
            field,
            format!("points must add up to {expected} (got {total})"),
        );
        if self.force_uneven {
            let distinct: BTreeSet<u32> = values.iter().copied().collect();
            result.check(
                distinct.len() == values.len(),
                field,
                "every target must receive a different number of points",
            );
        }
        result
    }
}

impl QuestionKind for ConstantSumSettings {
    type Details = ConstantSumDetails;
    const TYPE: QuestionType = QuestionType::ConstantSum;

    fn default_settings() -> Self {
        Self {
            target: ConstantSumTarget::Options {
                options: vec!["Option 1".to_string(), "Option 2".to_string()],
            },
            total_points: 100,
            points_per_target: false,
            force_uneven: false,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if let ConstantSumTarget::Options { options } = &self.target {
            check_options(&mut result, "options", options, 2);
        }
        result.check(self.total_points > 0, "totalPoints", "must be greater than 0");
        result
    }

    fn validate_response(&self, details: &ConstantSumDetails) -> ValidationResult {
        match &self.target {
            ConstantSumTarget::Options { options } => {
                if details.points.len() != options.len() {
                    return ValidationResult::single(
                        "points",
                        format!("expected {} values, one per option", options.len()),
                    );
                }
                self.check_distribution("points", &details.points)
            }
            ConstantSumTarget::Recipients => {
                let mut result = ValidationResult::ok();
                result.check(
                    details.points.len() == 1,
                    "points",
                    "expected a single value for this recipient",
                );
                if let Some(points) = details.points.first()
                    && !self.points_per_target
                {
                    result.check(
                        *points <= self.total_points,
                        "points",
                        format!("cannot exceed {}", self.total_points),
                    );
                }
                result
            }
        }
    }

    fn validate_recipient_set(&self, answers: &[&ConstantSumDetails], recipients: usize) -> ValidationResult {
        if !matches!(self.target, ConstantSumTarget::Recipients) {
            return ValidationResult::ok();
        }
        if answers.len() < recipients {
            return ValidationResult::single(
                "points",
                format!("points must be given to all {recipients} recipients or none"),
            );
        }
        let values: Vec<u32> = answers
            .iter()
            .filter_map(|a| a.points.first().copied())
            .collect();
        self.check_distribution("points", &values)
    }

    fn aggregate(&self, answers: &[Answer<'_, ConstantSumDetails>]) -> Summary {
        // label -> points given in each answer that touched it
        let mut given: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut order: Vec<String> = Vec::new();

        match &self.target {
            ConstantSumTarget::Options { options } => {
                order.extend(options.iter().cloned());
                for option in options {
                    given.entry(option.clone()).or_default();
                }
                for answer in answers {
                    for (option, points) in options.iter().zip(answer.details.points.iter()) {
                        given.entry(option.clone()).or_default().push(*points);
                    }
                }
            }
            ConstantSumTarget::Recipients => {
                for answer in answers {
                    let (Some(recipient), Some(points)) =
                        (answer.recipient, answer.details.points.first())
                    else {
                        continue;
                    };
                    given.entry(recipient.to_string()).or_default().push(*points);
                }
                order.extend(given.keys().cloned());
            }
        }

        let grand_total: u64 = given.values().flatten().map(|p| u64::from(*p)).sum();
        let entries = order
            .into_iter()
            .map(|label| {
                let values = given.get(&label).map(Vec::as_slice).unwrap_or_default();
                let total_points: u64 = values.iter().map(|p| u64::from(*p)).sum();
                let as_f64: Vec<f64> = values.iter().map(|p| f64::from(*p)).collect();
                DistributionEntry {
                    average_points: summary::mean(&as_f64).unwrap_or(0.0),
                    percentage: summary::percentage(total_points as f64, grand_total as f64),
                    total_points,
                    label,
                }
            })
            .collect();

        Summary::Distribution(DistributionSummary {
            response_count: answers.len(),
            entries,
        })
    }

    fn supports_scope(&self, scope: RecipientScope) -> bool {
        match self.target {
            ConstantSumTarget::Options { .. } => true,
            ConstantSumTarget::Recipients => scope.requires_recipient(),
        }
    }

    fn details_of(details: &ResponseDetails) -> Option<&ConstantSumDetails> {
        match details {
            ResponseDetails::ConstantSum(d) => Some(d),
            _ => None,
        }
    }
}

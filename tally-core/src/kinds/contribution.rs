//! Team contribution estimates.
//!
//! Each respondent estimates every team member's share of the work in
//! points, where 100 is an equal share. Results normalize each giver's
//! estimates so their points average 100, then average what peers gave a
//! member ("perceived") next to the member's own estimate ("claimed").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::ResponseDetails;
use crate::summary::{self, ContributionEntry, ContributionSummary, Summary};
use crate::types::{RecipientId, RespondentId};
use crate::validation::ValidationResult;

/// Points meaning "exactly an equal share".
pub const EQUAL_SHARE: u32 = 100;
/// Largest estimate a respondent may give.
pub const MAX_POINTS: u32 = 200;
/// Estimates are given in multiples of this.
pub const POINT_STEP: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContributionSettings {
    #[serde(default)]
    pub allow_not_sure: bool,
    /// Estimates across all recipients must add up to an equal share each
    #[serde(default)]
    pub zero_sum: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionAnswer {
    Points(u32),
    NotSure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContributionDetails {
    pub answer: ContributionAnswer,
}

impl QuestionKind for ContributionSettings {
    type Details = ContributionDetails;
    const TYPE: QuestionType = QuestionType::Contribution;

    fn default_settings() -> Self {
        Self {
            allow_not_sure: true,
            zero_sum: false,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.check(
            !(self.zero_sum && self.allow_not_sure),
            "allowNotSure",
            "cannot be enabled for zero-sum questions",
        );
        result
    }

    fn validate_response(&self, details: &ContributionDetails) -> ValidationResult {
        let mut result = ValidationResult::ok();
        match details.answer {
            ContributionAnswer::Points(points) => {
                result.check(
                    points <= MAX_POINTS,
                    "answer",
                    format!("must be between 0 and {MAX_POINTS}"),
                );
                result.check(
                    points % POINT_STEP == 0,
                    "answer",
                    format!("must be a multiple of {POINT_STEP}"),
                );
            }
            ContributionAnswer::NotSure => {
                result.check(self.allow_not_sure, "answer", "'not sure' is not allowed");
            }
        }
        result
    }

    fn validate_recipient_set(&self, answers: &[&ContributionDetails], recipients: usize) -> ValidationResult {
        if !self.zero_sum {
            return ValidationResult::ok();
        }
        if answers.len() < recipients {
            return ValidationResult::single(
                "answer",
                format!("zero-sum estimates must cover all {recipients} recipients or none"),
            );
        }
        let expected = EQUAL_SHARE as u64 * answers.len() as u64;
        let mut total = 0u64;
        for answer in answers {
            match answer.answer {
                ContributionAnswer::Points(points) => total += u64::from(points),
                ContributionAnswer::NotSure => {
                    return ValidationResult::single("answer", "'not sure' is not allowed");
                }
            }
        }
        let mut result = ValidationResult::ok();
        result.check(
            total == expected,
            "answer",
            format!(
                "estimates must add up to {expected} across {} recipients (got {total})",
                answers.len()
            ),
        );
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, ContributionDetails>]) -> Summary {
        // giver -> [(recipient, points)]
        let mut by_giver: BTreeMap<&RespondentId, Vec<(&RecipientId, u32)>> = BTreeMap::new();
        let mut entries: BTreeMap<&RecipientId, (Option<f64>, Vec<f64>, usize)> = BTreeMap::new();

        for answer in answers {
            let Some(recipient) = answer.recipient else { continue };
            let entry = entries.entry(recipient).or_insert((None, Vec::new(), 0));
            match answer.details.answer {
                ContributionAnswer::Points(points) => {
                    by_giver.entry(answer.respondent).or_default().push((recipient, points));
                    if answer.respondent.as_str() == recipient.as_str() {
                        entry.0 = Some(f64::from(points));
                    }
                }
                ContributionAnswer::NotSure => entry.2 += 1,
            }
        }

        for (giver, given) in &by_giver {
            let total: u64 = given.iter().map(|(_, p)| u64::from(*p)).sum();
            let scale = if total > 0 {
                (EQUAL_SHARE as f64 * given.len() as f64) / total as f64
            } else {
                1.0
            };
            for (recipient, points) in given {
                if giver.as_str() == recipient.as_str() {
                    continue;
                }
                if let Some(entry) = entries.get_mut(recipient) {
                    entry.1.push(f64::from(*points) * scale);
                }
            }
        }

        let entries = entries
            .into_iter()
            .map(|(recipient, (claimed, perceived, not_sure))| ContributionEntry {
                recipient: recipient.clone(),
                claimed,
                ratings: perceived.len(),
                perceived: summary::mean(&perceived),
                not_sure,
            })
            .collect();

        Summary::Contribution(ContributionSummary {
            response_count: answers.len(),
            entries,
        })
    }

    fn default_scope() -> RecipientScope {
        RecipientScope::Peers
    }

    fn supports_scope(&self, scope: RecipientScope) -> bool {
        scope == RecipientScope::Peers
    }

    fn details_of(details: &ResponseDetails) -> Option<&ContributionDetails> {
        match details {
            ResponseDetails::Contribution(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(p: u32) -> ContributionDetails {
        ContributionDetails {
            answer: ContributionAnswer::Points(p),
        }
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(ContributionSettings::default_settings().validate_settings().is_ok());
    }

    #[test]
    fn zero_sum_excludes_not_sure() {
        let s = ContributionSettings {
            allow_not_sure: true,
            zero_sum: true,
        };
        assert!(s.validate_settings().mentions("allowNotSure"));
    }

    #[test]
    fn points_must_be_in_range_and_on_step() {
        let s = ContributionSettings::default_settings();
        assert!(s.validate_response(&points(150)).is_ok());
        assert!(!s.validate_response(&points(210)).is_ok());
        assert!(!s.validate_response(&points(95)).is_ok());
    }

    #[test]
    fn not_sure_depends_on_settings() {
        let details = ContributionDetails {
            answer: ContributionAnswer::NotSure,
        };
        assert!(ContributionSettings::default_settings().validate_response(&details).is_ok());
        let strict = ContributionSettings {
            allow_not_sure: false,
            zero_sum: false,
        };
        assert!(strict.validate_response(&details).mentions("answer"));
    }

    #[test]
    fn zero_sum_set_must_average_equal_share() {
        let s = ContributionSettings {
            allow_not_sure: false,
            zero_sum: true,
        };
        let (a, b, c) = (points(120), points(80), points(100));
        assert!(s.validate_recipient_set(&[&a, &b, &c], 3).is_ok());
        let d = points(150);
        assert!(!s.validate_recipient_set(&[&a, &d], 2).is_ok());
    }

    #[test]
    fn zero_sum_set_must_cover_every_recipient() {
        let s = ContributionSettings {
            allow_not_sure: false,
            zero_sum: true,
        };
        let (a, b) = (points(100), points(100));
        assert!(s.validate_recipient_set(&[&a, &b], 3).mentions("answer"));

        let lenient = ContributionSettings::default_settings();
        assert!(lenient.validate_recipient_set(&[&a], 3).is_ok());
    }

    #[test]
    fn answers_use_screaming_case_on_the_wire() {
        let not_sure = ContributionDetails {
            answer: ContributionAnswer::NotSure,
        };
        let json = serde_json::to_string(&not_sure).unwrap();
        assert_eq!(json, r#"{"answer":"NOT_SURE"}"#);
        let parsed: ContributionDetails = serde_json::from_str(r#"{"answer":{"POINTS":120}}"#).unwrap();
        assert_eq!(parsed, points(120));
    }

    #[test]
    fn peers_scope_only() {
        let s = ContributionSettings::default_settings();
        assert!(s.supports_scope(RecipientScope::Peers));
        assert!(!s.supports_scope(RecipientScope::Teams));
        assert!(!s.supports_scope(RecipientScope::None));
    }

    #[test]
    fn aggregate_normalizes_each_givers_estimates() {
        let alice = RespondentId::new("alice");
        let bob = RespondentId::new("bob");
        let to_alice = RecipientId::new("alice");
        let to_bob = RecipientId::new("bob");
        // alice inflates everyone: 150 + 150, normalizes to 100 each
        let a_self = points(150);
        let a_bob = points(150);
        // bob: 60 to alice, 140 to himself
        let b_alice = points(60);
        let b_self = points(140);

        let answers = [
            Answer { respondent: &alice, recipient: Some(&to_alice), details: &a_self },
            Answer { respondent: &alice, recipient: Some(&to_bob), details: &a_bob },
            Answer { respondent: &bob, recipient: Some(&to_alice), details: &b_alice },
            Answer { respondent: &bob, recipient: Some(&to_bob), details: &b_self },
        ];

        let Summary::Contribution(summary) = ContributionSettings::default_settings().aggregate(&answers)
        else {
            panic!("expected contribution summary");
        };
        assert_eq!(summary.response_count, 4);
        let alice_row = &summary.entries[0];
        assert_eq!(alice_row.recipient.as_str(), "alice");
        assert_eq!(alice_row.claimed, Some(150.0));
        assert_eq!(alice_row.perceived, Some(60.0));
        let bob_row = &summary.entries[1];
        assert_eq!(bob_row.claimed, Some(140.0));
        assert_eq!(bob_row.perceived, Some(100.0));
    }
}

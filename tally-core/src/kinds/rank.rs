//! Ranking questions: rank a list of options, or rank one's recipients.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Answer, QuestionKind};
use crate::question_type::{QuestionType, RecipientScope};
use crate::registry::ResponseDetails;
use crate::summary::{self, RankEntry, RankingSummary, Summary};
use crate::validation::{ValidationResult, check_options};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankOptionsSettings {
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_to_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_to_rank: Option<u32>,
    #[serde(default)]
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankOptionsDetails {
    /// 1-based rank per option; `None` leaves an option unranked
    pub ranks: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankRecipientsSettings {
    #[serde(default)]
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RankRecipientsDetails {
    /// 1-based rank of this recipient
    pub rank: u32,
}

/// Build ranking entries from `(label, rank)` observations plus labels that must appear.
fn ranking(labels: impl IntoIterator<Item = String>, observed: &[(String, u32)], response_count: usize) -> Summary {
    let mut ranks: BTreeMap<String, Vec<f64>> = labels.into_iter().map(|l| (l, Vec::new())).collect();
    for (label, rank) in observed {
        ranks.entry(label.clone()).or_default().push(f64::from(*rank));
    }
    let mut entries: Vec<RankEntry> = ranks
        .into_iter()
        .map(|(label, values)| RankEntry {
            label,
            times_ranked: values.len(),
            average_rank: summary::mean(&values),
            overall_rank: None,
        })
        .collect();
    summary::assign_overall_ranks(&mut entries);

    Summary::Ranking(RankingSummary {
        response_count,
        entries,
    })
}

impl QuestionKind for RankOptionsSettings {
    type Details = RankOptionsDetails;
    const TYPE: QuestionType = QuestionType::RankOptions;

    fn default_settings() -> Self {
        Self {
            options: vec!["Option 1".to_string(), "Option 2".to_string()],
            min_to_rank: None,
            max_to_rank: None,
            allow_duplicates: false,
        }
    }

    fn validate_settings(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        check_options(&mut result, "options", &self.options, 2);
        let count = self.options.len();
        if let Some(min) = self.min_to_rank {
            result.check(min >= 1, "minToRank", "must be at least 1");
            result.check(min as usize <= count, "minToRank", "cannot exceed the number of options");
        }
        if let Some(max) = self.max_to_rank {
            result.check(max >= 1, "maxToRank", "must be at least 1");
            result.check(max as usize <= count, "maxToRank", "cannot exceed the number of options");
        }
        if let (Some(min), Some(max)) = (self.min_to_rank, self.max_to_rank) {
            result.check(min <= max, "minToRank", "must not be greater than maxToRank");
        }
        result
    }

    fn validate_response(&self, details: &RankOptionsDetails) -> ValidationResult {
        let count = self.options.len();
        if details.ranks.len() != count {
            return ValidationResult::single(
                "ranks",
                format!("expected {count} entries, one per option"),
            );
        }
        let mut result = ValidationResult::ok();
        let mut seen = BTreeSet::new();
        for (i, rank) in details.ranks.iter().enumerate() {
            let Some(rank) = rank else { continue };
            if *rank == 0 || *rank as usize > count {
                result.push(format!("ranks[{i}]"), format!("rank must be between 1 and {count}"));
            } else if !seen.insert(*rank) && !self.allow_duplicates {
                result.push(format!("ranks[{i}]"), format!("rank {rank} is used more than once"));
            }
        }

        let ranked = details.ranks.iter().filter(|r| r.is_some()).count();
        let min = self.min_to_rank.unwrap_or(1) as usize;
        let max = self.max_to_rank.map_or(count, |m| m as usize);
        result.check(ranked >= min, "ranks", format!("rank at least {min} options"));
        result.check(ranked <= max, "ranks", format!("rank at most {max} options"));
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, RankOptionsDetails>]) -> Summary {
        let observed: Vec<(String, u32)> = answers
            .iter()
            .flat_map(|a| {
                self.options
                    .iter()
                    .zip(a.details.ranks.iter())
                    .filter_map(|(option, rank)| rank.map(|r| (option.clone(), r)))
            })
            .collect();
        ranking(self.options.iter().cloned(), &observed, answers.len())
    }

    fn details_of(details: &ResponseDetails) -> Option<&RankOptionsDetails> {
        match details {
            ResponseDetails::RankOptions(d) => Some(d),
            _ => None,
        }
    }
}

impl QuestionKind for RankRecipientsSettings {
    type Details = RankRecipientsDetails;
    const TYPE: QuestionType = QuestionType::RankRecipients;

    fn default_settings() -> Self {
        Self::default()
    }

    fn validate_settings(&self) -> ValidationResult {
        ValidationResult::ok()
    }

    fn validate_response(&self, details: &RankRecipientsDetails) -> ValidationResult {
        let mut result = ValidationResult::ok();
        result.check(details.rank >= 1, "rank", "rank must be at least 1");
        result
    }

    fn validate_recipient_set(&self, answers: &[&RankRecipientsDetails], recipients: usize) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let count = recipients.max(answers.len());
        let mut seen = BTreeSet::new();
        for answer in answers {
            if answer.rank as usize > count {
                result.push(
                    "rank",
                    format!("rank {} exceeds the number of recipients ({count})", answer.rank),
                );
            } else if !seen.insert(answer.rank) && !self.allow_duplicates {
                result.push("rank", format!("rank {} is given to more than one recipient", answer.rank));
            }
        }
        result
    }

    fn aggregate(&self, answers: &[Answer<'_, RankRecipientsDetails>]) -> Summary {
        let observed: Vec<(String, u32)> = answers
            .iter()
            .filter_map(|a| a.recipient.map(|r| (r.to_string(), a.details.rank)))
            .collect();
        ranking(std::iter::empty::<String>(), &observed, answers.len())
    }

    fn default_scope() -> RecipientScope {
        RecipientScope::Peers
    }

    fn supports_scope(&self, scope: RecipientScope) -> bool {
        scope.requires_recipient()
    }

    fn details_of(details: &ResponseDetails) -> Option<&RankRecipientsDetails> {
        match details {
            ResponseDetails::RankRecipients(d) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecipientId, RespondentId};

    fn options() -> RankOptionsSettings {
        RankOptionsSettings {
            options: vec!["Speed".into(), "Cost".into(), "Quality".into()],
            min_to_rank: None,
            max_to_rank: None,
            allow_duplicates: false,
        }
    }

    fn ranks(values: &[Option<u32>]) -> RankOptionsDetails {
        RankOptionsDetails { ranks: values.to_vec() }
    }

    #[test]
    fn default_settings_are_valid() {
        assert!(RankOptionsSettings::default_settings().validate_settings().is_ok());
        assert!(RankRecipientsSettings::default_settings().validate_settings().is_ok());
    }

    #[test]
    fn max_to_rank_cannot_exceed_options() {
        let s = RankOptionsSettings {
            max_to_rank: Some(4),
            ..options()
        };
        assert!(s.validate_settings().mentions("maxToRank"));
    }

    #[test]
    fn full_ranking_is_accepted() {
        assert!(options().validate_response(&ranks(&[Some(2), Some(3), Some(1)])).is_ok());
    }

    #[test]
    fn duplicate_rank_is_rejected_unless_allowed() {
        let details = ranks(&[Some(1), Some(1), None]);
        assert!(options().validate_response(&details).mentions("ranks[1]"));

        let lenient = RankOptionsSettings {
            allow_duplicates: true,
            ..options()
        };
        assert!(lenient.validate_response(&details).is_ok());
    }

    #[test]
    fn rank_outside_option_count_is_rejected() {
        let result = options().validate_response(&ranks(&[Some(4), None, None]));
        assert!(result.mentions("ranks[0]"));
    }

    #[test]
    fn minimum_ranked_options_enforced() {
        let s = RankOptionsSettings {
            min_to_rank: Some(2),
            ..options()
        };
        assert!(s.validate_response(&ranks(&[Some(1), None, None])).mentions("ranks"));
    }

    #[test]
    fn rank_options_aggregate_orders_by_average() {
        let a = RespondentId::new("a");
        let b = RespondentId::new("b");
        let da = ranks(&[Some(1), Some(2), Some(3)]);
        let db = ranks(&[Some(2), Some(1), Some(3)]);
        let answers = [
            Answer { respondent: &a, recipient: None, details: &da },
            Answer { respondent: &b, recipient: None, details: &db },
        ];

        let Summary::Ranking(summary) = options().aggregate(&answers) else {
            panic!("expected ranking summary");
        };
        assert_eq!(summary.response_count, 2);
        assert_eq!(summary.entries[0].label, "Cost");
        assert_eq!(summary.entries[0].overall_rank, Some(1));
        assert_eq!(summary.entries[1].label, "Speed");
        assert_eq!(summary.entries[1].overall_rank, Some(1));
        assert_eq!(summary.entries[2].label, "Quality");
        assert_eq!(summary.entries[2].average_rank, Some(3.0));
        assert_eq!(summary.entries[2].overall_rank, Some(3));
    }

    #[test]
    fn rank_recipients_requires_a_recipient_scope() {
        let s = RankRecipientsSettings::default();
        assert!(!s.supports_scope(RecipientScope::None));
        assert!(s.supports_scope(RecipientScope::Teams));
        assert_eq!(RankRecipientsSettings::default_scope(), RecipientScope::Peers);
    }

    #[test]
    fn recipient_ranks_must_be_distinct_and_bounded() {
        let s = RankRecipientsSettings::default();
        let one = RankRecipientsDetails { rank: 1 };
        let two = RankRecipientsDetails { rank: 2 };
        let three = RankRecipientsDetails { rank: 3 };

        assert!(s.validate_recipient_set(&[&one, &two], 2).is_ok());
        assert!(!s.validate_recipient_set(&[&one, &one], 2).is_ok());
        assert!(!s.validate_recipient_set(&[&one, &three], 2).is_ok());
        assert!(!s.validate_response(&RankRecipientsDetails { rank: 0 }).is_ok());
    }

    #[test]
    fn partial_ranking_is_bounded_by_eligible_recipients() {
        let s = RankRecipientsSettings::default();
        let three = RankRecipientsDetails { rank: 3 };
        let far = RankRecipientsDetails { rank: 99 };

        assert!(s.validate_recipient_set(&[&three], 3).is_ok());
        assert!(s.validate_recipient_set(&[&far], 3).mentions("rank"));
    }

    #[test]
    fn rank_recipients_aggregate_averages_per_recipient() {
        let a = RespondentId::new("a");
        let b = RespondentId::new("b");
        let x = RecipientId::new("x");
        let y = RecipientId::new("y");
        let first = RankRecipientsDetails { rank: 1 };
        let second = RankRecipientsDetails { rank: 2 };
        let answers = [
            Answer { respondent: &a, recipient: Some(&x), details: &first },
            Answer { respondent: &a, recipient: Some(&y), details: &second },
            Answer { respondent: &b, recipient: Some(&x), details: &second },
            Answer { respondent: &b, recipient: Some(&y), details: &second },
        ];

        let Summary::Ranking(summary) = RankRecipientsSettings::default().aggregate(&answers) else {
            panic!("expected ranking summary");
        };
        assert_eq!(summary.entries[0].label, "x");
        assert_eq!(summary.entries[0].average_rank, Some(1.5));
        assert_eq!(summary.entries[1].average_rank, Some(2.0));
    }
}

//! Aggregated result summaries, one shape per family of question types.
//!
//! Every summary has a well-defined empty form: counts are zero and
//! statistics that need at least one value are `None`.

use serde::{Deserialize, Serialize};

use crate::types::{RecipientId, RespondentId};

/// Type-specific reduction of all valid responses to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Summary {
    /// Frequency table (MCQ, MSQ)
    Choice(ChoiceSummary),
    /// Mean, median and distribution (NUMERICAL_SCALE)
    Scale(ScaleSummary),
    /// Verbatim answers (TEXT)
    Text(TextSummary),
    /// Per-criterion distributions (RUBRIC)
    Rubric(RubricSummary),
    /// Ranked averages (RANK_OPTIONS, RANK_RECIPIENTS)
    Ranking(RankingSummary),
    /// Normalized contribution table (CONTRIBUTION)
    Contribution(ContributionSummary),
    /// Point distribution table (CONSTANT_SUM)
    Distribution(DistributionSummary),
}

impl Summary {
    /// Number of responses that went into this summary.
    pub fn response_count(&self) -> usize {
        match self {
            Self::Choice(s) => s.response_count,
            Self::Scale(s) => s.response_count,
            Self::Text(s) => s.answers.len(),
            Self::Rubric(s) => s.response_count,
            Self::Ranking(s) => s.response_count,
            Self::Contribution(s) => s.response_count,
            Self::Distribution(s) => s.response_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCount {
    pub option: String,
    pub count: usize,
    /// Share of responses choosing this option (0.0 - 100.0)
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSummary {
    pub response_count: usize,
    /// One row per configured option, in configured order
    pub options: Vec<OptionCount>,
    /// Free-text "other" answers, sorted
    pub other_answers: Vec<String>,
    /// Mean weight of the chosen options, when weights are configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalePoint {
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSummary {
    pub response_count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Answer counts in ascending value order
    pub distribution: Vec<ScalePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnswer {
    pub respondent: RespondentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<RecipientId>,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSummary {
    /// Answers ordered by respondent, recipient, then text
    pub answers: Vec<TextAnswer>,
    pub average_word_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionSummary {
    pub criterion: String,
    /// Count per scale choice, in configured choice order
    pub counts: Vec<usize>,
    pub answered: usize,
    /// Mean score (choice weight, or 1-based choice position without weights)
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricSummary {
    pub response_count: usize,
    pub choices: Vec<String>,
    pub criteria: Vec<CriterionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    /// Option label or recipient id
    pub label: String,
    pub times_ranked: usize,
    pub average_rank: Option<f64>,
    /// Standard competition rank by average (ties share a rank)
    pub overall_rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummary {
    pub response_count: usize,
    /// Ordered by average rank; unranked entries last
    pub entries: Vec<RankEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionEntry {
    pub recipient: RecipientId,
    /// The recipient's own estimate (raw points), if they rated themselves
    pub claimed: Option<f64>,
    /// Mean of peers' normalized estimates (100 = equal share)
    pub perceived: Option<f64>,
    pub ratings: usize,
    pub not_sure: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    pub response_count: usize,
    pub entries: Vec<ContributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    /// Option label or recipient id
    pub label: String,
    pub total_points: u64,
    pub average_points: f64,
    /// Share of all distributed points (0.0 - 100.0)
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub response_count: usize,
    pub entries: Vec<DistributionEntry>,
}

/// Arithmetic mean, summed in sorted order so the result does not depend on input order.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part * 100.0 / whole } else { 0.0 }
}

/// Order entries by average rank and assign competition ranks (1, 2, 2, 4).
pub(crate) fn assign_overall_ranks(entries: &mut [RankEntry]) {
    entries.sort_by(|a, b| match (a.average_rank, b.average_rank) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.label.cmp(&b.label)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.label.cmp(&b.label),
    });
    let mut previous: Option<(f64, u32)> = None;
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.overall_rank = entry.average_rank.map(|avg| match previous {
            Some((prev_avg, prev_rank)) if (prev_avg - avg).abs() < 1e-9 => prev_rank,
            _ => i as u32 + 1,
        });
        if let (Some(avg), Some(rank)) = (entry.average_rank, entry.overall_rank) {
            previous = Some((avg, rank));
        }
    }
}

//! The closed set of question types and recipient scopes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of question, determining its settings schema and answer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// Single choice from a list of options
    Mcq,
    /// Any number of choices from a list of options
    Msq,
    /// A number on a bounded, stepped scale
    NumericalScale,
    /// Free text
    Text,
    /// Criteria rated against an ordered scale
    Rubric,
    /// Order a list of options
    RankOptions,
    /// Order the respondent's recipients
    RankRecipients,
    /// Estimated contribution of each team member
    Contribution,
    /// Distribute a fixed number of points
    ConstantSum,
}

impl QuestionType {
    /// Every question type, in catalogue order.
    pub const ALL: [QuestionType; 9] = [
        Self::Mcq,
        Self::Msq,
        Self::NumericalScale,
        Self::Text,
        Self::Rubric,
        Self::RankOptions,
        Self::RankRecipients,
        Self::Contribution,
        Self::ConstantSum,
    ];

    /// Convert to the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "MCQ",
            Self::Msq => "MSQ",
            Self::NumericalScale => "NUMERICAL_SCALE",
            Self::Text => "TEXT",
            Self::Rubric => "RUBRIC",
            Self::RankOptions => "RANK_OPTIONS",
            Self::RankRecipients => "RANK_RECIPIENTS",
            Self::Contribution => "CONTRIBUTION",
            Self::ConstantSum => "CONSTANT_SUM",
        }
    }

    /// Parse from the wire representation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }

    /// Label shown to instructors when picking a type.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mcq => "Multiple-choice (single answer)",
            Self::Msq => "Multiple-choice (multiple answers)",
            Self::NumericalScale => "Numerical scale",
            Self::Text => "Essay",
            Self::Rubric => "Rubric",
            Self::RankOptions => "Rank options",
            Self::RankRecipients => "Rank recipients",
            Self::Contribution => "Team contribution",
            Self::ConstantSum => "Distribute points",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a question's responses are about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientScope {
    /// The response is about the session itself; no recipient.
    #[default]
    None,
    /// One response per eligible peer (team members).
    Peers,
    /// One response per eligible team.
    Teams,
}

impl RecipientScope {
    /// Whether responses under this scope must carry a recipient.
    pub fn requires_recipient(&self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Peers => "PEERS",
            Self::Teams => "TEAMS",
        }
    }
}

impl fmt::Display for RecipientScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

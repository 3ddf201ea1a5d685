//! Engine configuration.
//!
//! TOML files hold a [`RawEngineConfig`] with optional fields so several
//! layers can be merged; [`RawEngineConfig::finalize`] applies defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What happens to unsubmitted drafts when a question's settings change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPolicy {
    /// Re-check drafts against the new settings; reset the ones that fail to blank
    #[default]
    Revalidate,
    /// Drop every draft for the question
    Discard,
    /// Leave drafts alone; they are re-checked at submit
    Keep,
}

impl DraftPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revalidate => "revalidate",
            Self::Discard => "discard",
            Self::Keep => "keep",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "revalidate" => Some(Self::Revalidate),
            "discard" => Some(Self::Discard),
            "keep" => Some(Self::Keep),
            _ => None,
        }
    }
}

impl fmt::Display for DraftPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine configuration as stored in TOML (optional fields for merging).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEngineConfig {
    pub drafts: Option<DraftPolicy>,
    /// Template catalogue file; the built-in catalogue when unset
    pub templates: Option<PathBuf>,
}

impl RawEngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("invalid engine config: {e}")))
    }

    /// Overlay values override base only if explicitly set.
    #[must_use]
    pub fn merge(self, overlay: RawEngineConfig) -> Self {
        Self {
            drafts: overlay.drafts.or(self.drafts),
            templates: overlay.templates.or(self.templates),
        }
    }

    pub fn finalize(self) -> EngineConfig {
        EngineConfig {
            drafts: self.drafts.unwrap_or_default(),
            templates: self.templates,
        }
    }
}

/// Final engine configuration with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub drafts: DraftPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(RawEngineConfig::from_toml_str(contents)?.finalize())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}

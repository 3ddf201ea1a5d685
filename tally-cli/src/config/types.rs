use serde::{Deserialize, Serialize};
use tally_core::{EngineConfig, RawEngineConfig};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawTallyConfig {
    #[serde(default)]
    pub engine: RawEngineConfig,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TallyConfig {
    #[serde(default)]
    pub engine: EngineConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::DraftPolicy;

    #[test]
    fn test_default_values() {
        let config = TallyConfig::default();
        assert_eq!(config.engine.drafts, DraftPolicy::Revalidate);
        assert!(config.engine.templates.is_none());
    }

    #[test]
    fn test_raw_config_parses_engine_section() {
        let raw: RawTallyConfig = toml::from_str("[engine]\ndrafts = \"keep\"").unwrap();
        assert_eq!(raw.engine.drafts, Some(DraftPolicy::Keep));
        assert!(raw.engine.templates.is_none());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(toml::from_str::<RawTallyConfig>("[server]\nport = 1").is_err());
    }

    #[test]
    fn test_final_config_round_trips_through_toml() {
        let config = TallyConfig {
            engine: EngineConfig {
                drafts: DraftPolicy::Discard,
                templates: Some("catalog.toml".into()),
            },
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("drafts = \"discard\""));
        assert_eq!(toml::from_str::<TallyConfig>(&text).unwrap(), config);
    }
}

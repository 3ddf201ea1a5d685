use super::types::{RawTallyConfig, TallyConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tally_core::RawEngineConfig;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<TallyConfig> {
        let mut raw = RawTallyConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: --config
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tally").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with TALLY_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("TALLY_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".tally/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawTallyConfig> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents).with_context(|| format!("invalid config in {}", path.display()))?;
        debug!("Loaded config layer from {}", path.display());
        Ok(raw)
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawTallyConfig, overlay: RawTallyConfig) -> RawTallyConfig {
        RawTallyConfig {
            engine: RawEngineConfig::merge(base.engine, overlay.engine),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawTallyConfig) -> TallyConfig {
        TallyConfig {
            engine: raw.engine.finalize(),
        }
    }
}

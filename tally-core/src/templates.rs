//! Template question catalogue.
//!
//! A catalogue is a TOML document of `[[templates]]` entries. It is loaded
//! once, validated, and shared read-only as an `Arc<dyn TemplateLibrary>`.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::question::TemplateQuestion;
use crate::storage::{self, TemplateLibrary};
use crate::types::{SessionId, TemplateId};

const BUILTIN: &str = include_str!("../templates/builtin.toml");

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<TemplateQuestion>,
}

/// Validated, immutable set of template questions.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<TemplateQuestion>,
}

impl TemplateCatalog {
    /// The catalogue compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    /// Parse and validate a catalogue document.
    ///
    /// Every template must have a unique id and instantiate to a valid
    /// question, settings and recipient scope included.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(contents).map_err(|e| Error::Config(format!("invalid template catalogue: {e}")))?;

        let mut seen = BTreeSet::new();
        for template in &file.templates {
            if !seen.insert(template.id.clone()) {
                return Err(Error::Config(format!("duplicate template id '{}'", template.id)));
            }
            let result = template.instantiate(SessionId::new(), 0).validate();
            if !result.is_ok() {
                return Err(Error::Config(format!("template '{}': {result}", template.id)));
            }
        }

        Ok(Self {
            templates: file.templates,
        })
    }

    /// Load a catalogue file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let catalog = Self::from_toml_str(&contents)?;
        debug!("Loaded {} templates from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The catalogue named by `config`, or the built-in one.
    pub fn for_config(config: &EngineConfig) -> Result<Self> {
        match &config.templates {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Wrap into the shared handle controllers hold.
    pub fn shared(self) -> Arc<dyn TemplateLibrary> {
        Arc::new(self)
    }

    pub fn templates(&self) -> &[TemplateQuestion] {
        &self.templates
    }

    pub fn get(&self, id: &TemplateId) -> Option<&TemplateQuestion> {
        self.templates.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl TemplateLibrary for TemplateCatalog {
    async fn list_templates(&self) -> storage::Result<Vec<TemplateQuestion>> {
        Ok(self.templates.clone())
    }

    async fn get_template(&self, id: &TemplateId) -> storage::Result<TemplateQuestion> {
        self.get(id)
            .cloned()
            .ok_or_else(|| storage::Error::NotFound(format!("template {id}")))
    }
}

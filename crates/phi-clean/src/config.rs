//! Pipeline configuration
//!
//! The rule tables ship embedded in the crate. A deployment can point the
//! pipeline at its own TOML files instead, either through the builder or
//! through environment variables.

use phi_common::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::casing::CasingRules;
use crate::release::ReleaseTarget;
use crate::replace::ReplacementRules;

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Replacement rule file; `None` uses the embedded rules
    pub replacements_path: Option<PathBuf>,

    /// Casing rule file; `None` uses the embedded rules
    pub casing_path: Option<PathBuf>,

    pub target: ReleaseTarget,
}

impl PipelineConfig {
    /// Load configuration from `.env` and environment variables
    ///
    /// Environment variables:
    /// - `PHI_REPLACEMENTS_FILE`: replacement rule TOML file
    /// - `PHI_CASING_FILE`: casing rule TOML file
    /// - `PHI_RELEASE_TARGET`: excel, zenodo
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("PHI_REPLACEMENTS_FILE") {
            config.replacements_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("PHI_CASING_FILE") {
            config.casing_path = Some(PathBuf::from(path));
        }
        if let Some(target) = lookup("PHI_RELEASE_TARGET") {
            config.target = target.parse()?;
        }

        Ok(config)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn replacement_rules(&self) -> Result<ReplacementRules> {
        load_or_embedded(
            self.replacements_path.as_deref(),
            ReplacementRules::load,
            ReplacementRules::embedded,
        )
    }

    pub fn casing_rules(&self) -> Result<CasingRules> {
        load_or_embedded(self.casing_path.as_deref(), CasingRules::load, CasingRules::embedded)
    }
}

fn load_or_embedded<T>(
    path: Option<&Path>,
    load: impl FnOnce(&Path) -> Result<T>,
    embedded: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading rule file");
            load(path)
        }
        None => embedded(),
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn replacements_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.replacements_path = Some(path.into());
        self
    }

    pub fn casing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.casing_path = Some(path.into());
        self
    }

    pub fn target(mut self, target: ReleaseTarget) -> Self {
        self.config.target = target;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use phi_common::PhiError;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_uses_embedded_rules() {
        let config = PipelineConfig::default();
        assert_eq!(config.target, ReleaseTarget::Spreadsheet);
        assert!(!config.replacement_rules().unwrap().columns.is_empty());
        assert!(!config.casing_rules().unwrap().columns.is_empty());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("PHI_CASING_FILE", "/etc/phi/casing.toml"),
            ("PHI_RELEASE_TARGET", "zenodo"),
        ]
        .into_iter()
        .collect();

        let config = PipelineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.casing_path, Some(PathBuf::from("/etc/phi/casing.toml")));
        assert_eq!(config.replacements_path, None);
        assert_eq!(config.target, ReleaseTarget::Archive);
    }

    #[test]
    fn test_from_lookup_rejects_bad_target() {
        let result = PipelineConfig::from_lookup(|key| {
            (key == "PHI_RELEASE_TARGET").then(|| "parquet".to_string())
        });
        assert!(matches!(result, Err(PhiError::Config(_))));
    }

    #[test]
    fn test_override_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[columns]]
name = "disease"
rules = [{{ pattern = "blast", replacement = "rice blast" }}]
"#
        )
        .unwrap();

        let config = PipelineConfig::builder()
            .replacements_path(file.path())
            .target(ReleaseTarget::Archive)
            .build();
        let rules = config.replacement_rules().unwrap();
        assert!(rules.global.is_empty());
        assert_eq!(rules.columns.len(), 1);
        assert_eq!(rules.columns[0].name, "disease");
    }

    #[test]
    fn test_missing_override_file_is_an_error() {
        let config = PipelineConfig::builder().casing_path("/nonexistent/casing.toml").build();
        assert!(matches!(config.casing_rules(), Err(PhiError::Io(_))));
    }
}

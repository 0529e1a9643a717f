use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODULE_NAME: &str = "GeneratedModule";
pub const DEFAULT_MODULE_VERSION: &str = "0.1.0";

/// Module metadata for manifest assembly, loaded from `psmodgen.toml`.
/// Everything defaults so a missing file still produces a valid
/// manifest skeleton.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ModuleConfig {
    #[serde(default)]
    pub module: ModuleSection,
    #[serde(default)]
    pub metadata: MetadataSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ModuleSection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub company: Option<String>,
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub root_module: Option<String>,
    pub required_assemblies: Option<String>,
    pub format_file: Option<String>,
    pub custom_folder_relative: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct MetadataSection {
    #[serde(default)]
    pub tags: Vec<String>,
    pub license_uri: Option<String>,
    pub project_uri: Option<String>,
    pub release_notes: Option<String>,
    #[serde(default)]
    pub profiles: Vec<String>,
}

impl ModuleConfig {
    pub fn name(&self) -> &str {
        self.module.name.as_deref().unwrap_or(DEFAULT_MODULE_NAME)
    }

    /// Resolve the module version: env PSMODGEN_MODULE_VERSION > config
    /// > default.
    pub fn version(&self) -> String {
        if let Ok(value) = env::var("PSMODGEN_MODULE_VERSION") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.module
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_MODULE_VERSION.to_string())
    }

    /// Resolve the author: env PSMODGEN_AUTHOR > config > empty.
    pub fn author(&self) -> String {
        if let Ok(value) = env::var("PSMODGEN_AUTHOR") {
            let trimmed = value.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.module.author.clone().unwrap_or_default()
    }

    pub fn company(&self) -> &str {
        self.module.company.as_deref().unwrap_or("")
    }

    pub fn copyright(&self) -> &str {
        self.module.copyright.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.module.description.as_deref().unwrap_or("")
    }

    pub fn root_module(&self) -> String {
        self.module
            .root_module
            .clone()
            .unwrap_or_else(|| format!("./{}.psm1", self.name()))
    }

    pub fn required_assemblies(&self) -> String {
        self.module
            .required_assemblies
            .clone()
            .unwrap_or_else(|| format!("./bin/{}.private.dll", self.name()))
    }

    pub fn format_file(&self) -> String {
        self.module
            .format_file
            .clone()
            .unwrap_or_else(|| format!("./{}.format.ps1xml", self.name()))
    }

    pub fn custom_folder_relative(&self) -> &str {
        self.module
            .custom_folder_relative
            .as_deref()
            .unwrap_or("./custom")
    }
}

/// Load a ModuleConfig from a TOML file. Returns defaults if the file
/// doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ModuleConfig> {
    if !config_path.exists() {
        return Ok(ModuleConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: ModuleConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("psmodgen.toml")).expect("load");
        assert_eq!(config.name(), DEFAULT_MODULE_NAME);
        assert_eq!(config.root_module(), "./GeneratedModule.psm1");
        assert_eq!(config.format_file(), "./GeneratedModule.format.ps1xml");
        assert_eq!(config.custom_folder_relative(), "./custom");
        assert!(config.metadata.tags.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("psmodgen.toml");
        fs::write(
            &path,
            r#"
[module]
name = "Widget"
version = "2.4.0"
author = "Widget Authors"
company = "Widget Inc"
description = "Widget management cmdlets"

[metadata]
tags = ["Widget", "Management"]
project_uri = "https://example.org/widget"
profiles = ["v1", "latest"]
"#,
        )
        .expect("write config");

        let config = load_config(&path).expect("load");
        assert_eq!(config.name(), "Widget");
        assert_eq!(config.module.version.as_deref(), Some("2.4.0"));
        assert_eq!(config.company(), "Widget Inc");
        assert_eq!(config.root_module(), "./Widget.psm1");
        assert_eq!(config.required_assemblies(), "./bin/Widget.private.dll");
        assert_eq!(config.metadata.profiles, vec!["v1", "latest"]);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("psmodgen.toml");
        fs::write(&path, "[module\nname =").expect("write config");
        assert!(load_config(&path).is_err());
    }
}

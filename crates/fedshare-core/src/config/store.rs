//! Config store for loading and saving fedshare.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{CONFIG_FILE_NAME, FedshareConfig};
use crate::share::parser::parse_toml_str;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    project_root: PathBuf,
}

impl ConfigStore {
    pub fn from_project_root(project_root: PathBuf) -> Self {
        Self {
            config_path: project_root.join(CONFIG_FILE_NAME),
            project_root,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn load(&self) -> anyhow::Result<FedshareConfig> {
        if !self.config_path.exists() {
            return Ok(FedshareConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        let config: FedshareConfig = parse_toml_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &FedshareConfig) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

//! Configuration schema for fedshare.toml
//!
//! ```toml
//! manifest = "package.json"
//! host = "apps/shell/federation.toml"
//! remotes = "apps/shell/federation.manifest.json"
//!
//! [override]
//! target = "file:artifacts/shared-ui-3.0.0.tgz"
//! restart = ["npm run serve:shell"]
//!
//! [override.aliases]
//! shared-ui-v1 = "file:artifacts/shared-ui-1.0.0.tgz"
//! shared-ui-v2 = "file:artifacts/shared-ui-2.0.0.tgz"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration structure for fedshare.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FedshareConfig {
    /// package.json holding the aliased install sources
    pub manifest: PathBuf,

    /// Host federation.toml
    pub host: PathBuf,

    /// federation.manifest.json listing remote entries
    pub remotes: PathBuf,

    /// Where ownership state is kept (defaults to the user data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    #[serde(rename = "override")]
    pub override_profile: OverrideProfile,
}

impl Default for FedshareConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("package.json"),
            host: PathBuf::from("federation.toml"),
            remotes: PathBuf::from("federation.manifest.json"),
            state_dir: None,
            override_profile: OverrideProfile::default(),
        }
    }
}

impl FedshareConfig {
    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.override_profile.validate()
    }

    pub fn manifest_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.manifest)
    }

    pub fn host_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.host)
    }

    pub fn remotes_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.remotes)
    }
}

/// Which package aliases the override redirects, and to what
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideProfile {
    /// Install source every alias points at while the override is enabled
    pub target: String,

    /// Alias to its original install source
    pub aliases: BTreeMap<String, String>,

    /// Commands to run after reinstalling
    pub restart: Vec<String>,
}

impl Default for OverrideProfile {
    fn default() -> Self {
        let aliases = [
            ("shared-ui-v1", "file:artifacts/shared-ui-1.0.0.tgz"),
            ("shared-ui-v2", "file:artifacts/shared-ui-2.0.0.tgz"),
        ]
        .into_iter()
        .map(|(alias, source)| (alias.to_string(), source.to_string()))
        .collect();

        Self {
            target: "file:artifacts/shared-ui-3.0.0.tgz".to_string(),
            aliases,
            restart: vec![
                "npm run serve:shell".to_string(),
                "npm run serve:mfe1".to_string(),
                "npm run serve:mfe2".to_string(),
            ],
        }
    }
}

impl OverrideProfile {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target.trim().is_empty() {
            anyhow::bail!("Override target must not be empty");
        }
        if self.aliases.is_empty() {
            anyhow::bail!("Override profile must name at least one alias");
        }
        if let Some((alias, _)) = self
            .aliases
            .iter()
            .find(|(alias, source)| alias.trim().is_empty() || source.trim().is_empty())
        {
            anyhow::bail!("Override alias '{}' must have a name and a source", alias);
        }
        Ok(())
    }
}

//! Sharing schema for federation.toml and remote entries
//!
//! A federation config names an app (host or remote), the packages it shares
//! and the modules it exposes:
//!
//! ```toml
//! name = "shell"
//! skip = ["rxjs/ajax"]
//!
//! [share_all]
//! singleton = true
//! strict_version = true
//! required_version = "auto"
//!
//! [shared.shared-ui]
//! version = "3.0.0"
//! required_version = "3.0.0"
//! singleton = true
//! eager = true
//! ```

use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::version::RequiredVersion;

/// A shared package offered by one contributor (host or remote).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDeclaration {
    /// Shared package name
    #[serde(alias = "packageName")]
    pub name: String,

    /// Version this contributor can supply
    pub version: Version,

    /// Versions this contributor accepts
    #[serde(default)]
    pub required_version: RequiredVersion,

    /// Only one instance of this package may be active
    #[serde(default)]
    pub singleton: bool,

    /// A mismatch against the bound instance is a hard failure
    #[serde(default)]
    pub strict_version: bool,

    /// Loaded at host start-up rather than on first use
    #[serde(default)]
    pub eager: bool,
}

impl DependencyDeclaration {
    /// Create a non-singleton, lazily loaded declaration accepting only `version`.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            required_version: RequiredVersion::Exact(version.clone()),
            version,
            singleton: false,
            strict_version: false,
            eager: false,
        }
    }

    pub fn with_required_version(mut self, required: RequiredVersion) -> Self {
        self.required_version = required;
        self
    }

    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_version = strict;
        self
    }

    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Eager singletons pin the instance for every consumer.
    pub fn is_eager_singleton(&self) -> bool {
        self.singleton && self.eager
    }
}

/// Root structure of a federation.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FederationConfig {
    /// App name; used as the contributor id
    pub name: String,

    /// Share every package.json dependency with these defaults
    #[serde(default)]
    pub share_all: Option<ShareOptions>,

    /// Explicitly configured shared packages (override `share_all`)
    #[serde(default)]
    pub shared: BTreeMap<String, SharedEntry>,

    /// Exposed module key ("./Component") to source path
    #[serde(default)]
    pub exposes: BTreeMap<String, String>,

    /// Packages (or package prefixes) excluded from `share_all`
    #[serde(default)]
    pub skip: Vec<String>,
}

impl FederationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Federation config must have a non-empty name");
        }

        for (name, entry) in &self.shared {
            if name.trim().is_empty() {
                anyhow::bail!("Shared entry in '{}' has an empty package name", self.name);
            }
            if entry.eager && !entry.singleton {
                tracing::debug!(
                    app = %self.name,
                    package = %name,
                    "eager entry without singleton does not pin the instance"
                );
            }
        }

        for key in self.exposes.keys() {
            if !key.starts_with("./") {
                anyhow::bail!(
                    "Exposed module '{}' in '{}' must start with './'",
                    key,
                    self.name
                );
            }
        }

        Ok(())
    }

    /// Whether `package` is excluded by the skip list (exact or `name/` prefix)
    pub fn is_skipped(&self, package: &str) -> bool {
        self.skip.iter().any(|skip| {
            package == skip
                || package
                    .strip_prefix(skip.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Defaults applied to every package shared through `share_all`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShareOptions {
    pub singleton: bool,
    pub strict_version: bool,
    pub required_version: RequiredVersion,
    pub eager: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            singleton: true,
            strict_version: true,
            required_version: RequiredVersion::Auto,
            eager: false,
        }
    }
}

/// A single `[shared.<name>]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SharedEntry {
    /// Supplied version; read from package.json when omitted
    #[serde(default)]
    pub version: Option<Version>,

    #[serde(default)]
    pub required_version: RequiredVersion,

    #[serde(default)]
    pub singleton: bool,

    #[serde(default)]
    pub strict_version: bool,

    #[serde(default)]
    pub eager: bool,
}

/// remoteEntry.json published by a built remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,

    #[serde(default)]
    pub shared: Vec<DependencyDeclaration>,

    #[serde(default)]
    pub exposes: Vec<ExposedModule>,
}

impl RemoteEntry {
    pub fn find_exposed(&self, key: &str) -> Option<&ExposedModule> {
        self.exposes.iter().find(|module| module.key == key)
    }
}

/// An exposed module of a remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExposedModule {
    /// Module key, e.g. "./Component"
    pub key: String,

    /// Bundle file relative to the remote entry
    pub out_file_name: String,
}

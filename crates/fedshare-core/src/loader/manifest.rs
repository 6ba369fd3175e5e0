//! federation.manifest.json: where each remote's entry is published.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use url::Url;

/// Remote name to remoteEntry.json location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FederationManifest {
    remotes: BTreeMap<String, Url>,
}

impl FederationManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest file. Relative locations resolve against its directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read federation manifest: {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base_dir)
            .with_context(|| format!("Failed to parse federation manifest: {}", path.display()))
    }

    pub fn parse(content: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(content).context("Expected an object of remote name to URL")?;

        let mut manifest = Self::new();
        for (name, location) in raw {
            let url = parse_location(&location, base_dir)
                .with_context(|| format!("Invalid location for remote '{}'", name))?;
            manifest.insert(name, url);
        }
        Ok(manifest)
    }

    pub fn insert(&mut self, name: impl Into<String>, url: Url) {
        self.remotes.insert(name.into(), url);
    }

    pub fn location(&self, remote: &str) -> Option<&Url> {
        self.remotes.get(remote)
    }

    pub fn remotes(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.remotes.iter().map(|(name, url)| (name.as_str(), url))
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

fn parse_location(location: &str, base_dir: &Path) -> anyhow::Result<Url> {
    if let Ok(url) = Url::parse(location) {
        return Ok(url);
    }

    let path = base_dir.join(location);
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    let path = normalize(&path);
    Url::from_file_path(&path)
        .map_err(|_| anyhow::anyhow!("Cannot convert path to URL: {}", path.display()))
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

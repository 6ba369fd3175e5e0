//! package.json access with key order preserved.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use super::write_atomic;

const DEPENDENCIES: &str = "dependencies";

/// A parsed package.json
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl PackageManifest {
    /// Read and validate a manifest. A missing or malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::from_slice(path, &bytes)
    }

    pub fn from_slice(path: &Path, bytes: &[u8]) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .with_context(|| format!("Failed to parse manifest JSON: {}", path.display()))?;
        let root = match value {
            Value::Object(map) => map,
            _ => anyhow::bail!("Expected JSON object at root: {}", path.display()),
        };

        let manifest = Self {
            path: path.to_path_buf(),
            root,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> anyhow::Result<()> {
        match self.root.get(DEPENDENCIES) {
            None | Some(Value::Object(_)) => {}
            Some(_) => anyhow::bail!(
                "Expected '{}' to be a JSON object in {}",
                DEPENDENCIES,
                self.path.display()
            ),
        }

        if let Some(Value::Object(deps)) = self.root.get(DEPENDENCIES)
            && let Some((name, _)) = deps.iter().find(|(_, spec)| !spec.is_string())
        {
            anyhow::bail!(
                "Dependency '{}' in {} must be a string",
                name,
                self.path.display()
            );
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_dependencies(&self) -> bool {
        matches!(self.root.get(DEPENDENCIES), Some(Value::Object(_)))
    }

    /// Dependencies in file order
    pub fn dependencies(&self) -> Vec<(&str, &str)> {
        match self.root.get(DEPENDENCIES) {
            Some(Value::Object(deps)) => deps
                .iter()
                .filter_map(|(name, spec)| spec.as_str().map(|spec| (name.as_str(), spec)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.root
            .get(DEPENDENCIES)
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Set a dependency install source, keeping its position if present.
    pub fn set_dependency(&mut self, name: &str, spec: &str) {
        let deps = self
            .root
            .entry(DEPENDENCIES)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(deps) = deps {
            deps.insert(name.to_string(), Value::String(spec.to_string()));
        }
    }

    /// Serialize like `JSON.stringify(manifest, null, 2) + "\n"`
    pub fn to_json_string(&self) -> anyhow::Result<String> {
        let mut content =
            serde_json::to_string_pretty(&self.root).context("Failed to serialize manifest")?;
        content.push('\n');
        Ok(content)
    }

    /// Write the manifest through a temp file so a failed write leaves the
    /// original untouched.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = self.to_json_string()?;
        write_atomic(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to save manifest: {}", self.path.display()))
    }
}

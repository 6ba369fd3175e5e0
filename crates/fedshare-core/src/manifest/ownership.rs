//! Ownership tracking for override-managed manifest entries
//!
//! After each write the hashes of the values fedshare put in place are stored
//! in `fedshare-lock.toml`. A later rewrite compares the current values
//! against them and refuses to clobber entries changed by hand.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::write_atomic;
use crate::share::parser::parse_toml_str;

/// File name of the ownership lockfile inside the state dir
pub const LOCKFILE_NAME: &str = "fedshare-lock.toml";

pub fn hash_value(value: &str) -> String {
    blake3::hash(value.as_bytes()).to_hex().to_string()
}

/// Lockfile of managed manifest entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipLock {
    /// Lockfile format version
    pub version: u32,

    /// Timestamp of the last write
    pub generated_at: chrono::DateTime<chrono::Utc>,

    /// Manifest path to alias hashes
    #[serde(default)]
    pub manifests: BTreeMap<String, ManagedEntries>,
}

impl OwnershipLock {
    pub fn new() -> Self {
        Self {
            version: 1,
            generated_at: chrono::Utc::now(),
            manifests: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version != 1 {
            anyhow::bail!("Unsupported lockfile version: {}", self.version);
        }
        Ok(())
    }
}

impl Default for OwnershipLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes of the values written into one manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedEntries {
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

/// Reads and writes the ownership lockfile in a state directory
#[derive(Debug, Clone)]
pub struct OwnershipStore {
    state_dir: PathBuf,
}

impl OwnershipStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.state_dir.join(LOCKFILE_NAME)
    }

    pub fn load(&self) -> anyhow::Result<OwnershipLock> {
        let path = self.lockfile_path();
        if !path.exists() {
            return Ok(OwnershipLock::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read lockfile: {}", path.display()))?;
        let lock: OwnershipLock = parse_toml_str(&content)
            .with_context(|| format!("Failed to parse lockfile: {}", path.display()))?;
        lock.validate()?;
        Ok(lock)
    }

    /// Hashes recorded for a manifest; empty when it was never written.
    pub fn load_hashes(&self, manifest_path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
        let lock = self.load()?;
        Ok(lock
            .manifests
            .get(&manifest_key(manifest_path))
            .map(|entries| entries.hashes.clone())
            .unwrap_or_default())
    }

    pub fn save_hashes(
        &self,
        manifest_path: &Path,
        hashes: BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        let mut lock = self.load()?;
        let now = chrono::Utc::now();
        lock.generated_at = now;
        lock.manifests.insert(
            manifest_key(manifest_path),
            ManagedEntries {
                updated_at: Some(now),
                hashes,
            },
        );

        std::fs::create_dir_all(&self.state_dir).with_context(|| {
            format!("Failed to create state directory: {}", self.state_dir.display())
        })?;
        let content = toml::to_string_pretty(&lock).context("Failed to serialize lockfile")?;
        let path = self.lockfile_path();
        write_atomic(&path, content.as_bytes())
            .with_context(|| format!("Failed to write lockfile: {}", path.display()))
    }
}

fn manifest_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

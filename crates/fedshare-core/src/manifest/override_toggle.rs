//! Enable or disable the shared-library version override.
//!
//! Enabling points every profile alias in package.json at the override
//! target; disabling restores each alias to its original install source.
//! Changes take effect after a fresh install and restart of the apps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ownership::{OwnershipStore, hash_value};
use super::package::PackageManifest;
use crate::config::OverrideProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    Enabled,
    Disabled,
}

/// Current override state of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideState {
    Enabled,
    Disabled,
    /// Aliases are neither all on the target nor all on their originals
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideOutcome {
    Changed,
    NoOp,
}

/// One alias rewritten (or checked) by a toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasChange {
    pub alias: String,
    pub from: Option<String>,
    pub to: String,
}

impl AliasChange {
    pub fn is_change(&self) -> bool {
        self.from.as_deref() != Some(self.to.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverrideReport {
    pub manifest: PathBuf,
    pub mode: OverrideMode,
    pub outcome: OverrideOutcome,
    pub changes: Vec<AliasChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasStatus {
    pub alias: String,
    pub current: Option<String>,
    pub original: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverrideStatus {
    pub manifest: PathBuf,
    pub state: OverrideState,
    pub target: String,
    pub aliases: Vec<AliasStatus>,
}

/// Rewrites profile aliases in a package.json
#[derive(Debug, Clone)]
pub struct OverrideToggle {
    manifest_path: PathBuf,
    profile: OverrideProfile,
    ownership: OwnershipStore,
}

impl OverrideToggle {
    pub fn new(manifest_path: PathBuf, profile: OverrideProfile, ownership: OwnershipStore) -> Self {
        Self {
            manifest_path,
            profile,
            ownership,
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn profile(&self) -> &OverrideProfile {
        &self.profile
    }

    pub fn enable(&self, force: bool) -> anyhow::Result<OverrideReport> {
        self.apply(OverrideMode::Enabled, force)
    }

    pub fn disable(&self, force: bool) -> anyhow::Result<OverrideReport> {
        self.apply(OverrideMode::Disabled, force)
    }

    /// Read, validate, then write. Nothing is written when validation fails
    /// or the manifest is already in the requested mode.
    pub fn apply(&self, mode: OverrideMode, force: bool) -> anyhow::Result<OverrideReport> {
        self.profile.validate()?;

        let mut manifest = PackageManifest::load(&self.manifest_path)?;
        if !manifest.has_dependencies() {
            anyhow::bail!(
                "Manifest has no 'dependencies' object: {}",
                self.manifest_path.display()
            );
        }

        let owned = self.ownership.load_hashes(&self.manifest_path)?;
        let mut changes = Vec::new();

        for (alias, original) in &self.profile.aliases {
            let current = manifest.dependency(alias).map(str::to_string);
            let desired = match mode {
                OverrideMode::Enabled => self.profile.target.clone(),
                OverrideMode::Disabled => original.clone(),
            };

            let change = AliasChange {
                alias: alias.clone(),
                from: current,
                to: desired,
            };
            if change.is_change() && !force {
                self.check_owned(&change, original, &owned)?;
            }
            changes.push(change);
        }

        let outcome = if changes.iter().any(AliasChange::is_change) {
            for change in &changes {
                manifest.set_dependency(&change.alias, &change.to);
            }

            // A written value must never be missing from the lock
            let hashes = changes
                .iter()
                .map(|change| (change.alias.clone(), hash_value(&change.to)))
                .collect();
            self.ownership.save_hashes(&self.manifest_path, hashes)?;

            if let Err(err) = manifest.save() {
                if let Err(restore) = self.ownership.save_hashes(&self.manifest_path, owned) {
                    tracing::warn!("failed to restore ownership lock: {:#}", restore);
                }
                return Err(err);
            }

            tracing::info!(
                manifest = %self.manifest_path.display(),
                ?mode,
                "override manifest updated"
            );
            OverrideOutcome::Changed
        } else {
            tracing::debug!(
                manifest = %self.manifest_path.display(),
                ?mode,
                "override already in requested mode"
            );
            OverrideOutcome::NoOp
        };

        Ok(OverrideReport {
            manifest: self.manifest_path.clone(),
            mode,
            outcome,
            changes,
        })
    }

    /// Refuse to overwrite an alias value that fedshare did not put there.
    ///
    /// Known values are the alias' original source, the override target, and
    /// whatever fedshare last wrote (recorded by hash in the lockfile).
    fn check_owned(
        &self,
        change: &AliasChange,
        original: &str,
        owned: &BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        let Some(current) = change.from.as_deref() else {
            return Ok(());
        };
        if current == original || current == self.profile.target {
            return Ok(());
        }

        match owned.get(&change.alias) {
            Some(expected) if *expected == hash_value(current) => Ok(()),
            Some(_) => anyhow::bail!(
                "Refusing to overwrite user-modified entry '{}' ({}). Use --force to override.",
                change.alias,
                current
            ),
            None => anyhow::bail!(
                "Entry '{}' ({}) is not managed by fedshare. Use --force to override.",
                change.alias,
                current
            ),
        }
    }

    pub fn status(&self) -> anyhow::Result<OverrideStatus> {
        let manifest = PackageManifest::load(&self.manifest_path)?;

        let aliases: Vec<AliasStatus> = self
            .profile
            .aliases
            .iter()
            .map(|(alias, original)| AliasStatus {
                alias: alias.clone(),
                current: manifest.dependency(alias).map(str::to_string),
                original: original.clone(),
            })
            .collect();

        let all_target = aliases
            .iter()
            .all(|a| a.current.as_deref() == Some(self.profile.target.as_str()));
        let all_original = aliases
            .iter()
            .all(|a| a.current.as_deref() == Some(a.original.as_str()));

        let state = if all_target {
            OverrideState::Enabled
        } else if all_original {
            OverrideState::Disabled
        } else {
            OverrideState::Mixed
        };

        Ok(OverrideStatus {
            manifest: self.manifest_path.clone(),
            state,
            target: self.profile.target.clone(),
            aliases,
        })
    }
}

//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, FedshareConfig};
use crate::loader::{FederationManifest, RemoteLoader};
use crate::manifest::{OverrideToggle, OwnershipStore, PackageManifest};
use crate::session::HostSession;
use crate::share::{DependencyDeclaration, FederationConfig, collect_declarations};

/// Unified application context for dependency injection.
///
/// Frontends create this once per run and pass it to commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    project_root: PathBuf,
    state_dir: PathBuf,
    config: FedshareConfig,
}

impl AppContext {
    /// Load fedshare.toml from `project_root` (defaults when absent).
    pub fn load(project_root: PathBuf) -> anyhow::Result<Self> {
        let config = ConfigStore::from_project_root(project_root.clone()).load()?;
        Ok(Self::new(project_root, config))
    }

    pub fn new(project_root: PathBuf, config: FedshareConfig) -> Self {
        let state_dir = match &config.state_dir {
            Some(dir) => project_root.join(dir),
            None => dirs::data_local_dir()
                .map(|p| p.join("fedshare"))
                .unwrap_or_else(|| project_root.join(".fedshare")),
        };

        Self {
            project_root,
            state_dir,
            config,
        }
    }

    /// Create context with an explicit state directory (for testing).
    pub fn with_state_dir(project_root: PathBuf, state_dir: PathBuf, config: FedshareConfig) -> Self {
        Self {
            project_root,
            state_dir,
            config,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn config(&self) -> &FedshareConfig {
        &self.config
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config.manifest_path(&self.project_root)
    }

    pub fn ownership_store(&self) -> OwnershipStore {
        OwnershipStore::new(self.state_dir.clone())
    }

    /// Get an OverrideToggle for the project manifest.
    pub fn override_toggle(&self) -> OverrideToggle {
        OverrideToggle::new(
            self.manifest_path(),
            self.config.override_profile.clone(),
            self.ownership_store(),
        )
    }

    pub fn host_config(&self) -> anyhow::Result<FederationConfig> {
        crate::share::parse_federation_toml(&self.config.host_path(&self.project_root))
    }

    pub fn federation_manifest(&self) -> anyhow::Result<FederationManifest> {
        FederationManifest::load(&self.config.remotes_path(&self.project_root))
    }

    /// The host's declarations, expanded against package.json when present.
    pub fn host_declarations(
        &self,
        host: &FederationConfig,
    ) -> anyhow::Result<Vec<DependencyDeclaration>> {
        let manifest_path = self.manifest_path();
        let manifest = if manifest_path.exists() {
            Some(PackageManifest::load(&manifest_path)?)
        } else {
            None
        };
        collect_declarations(host, manifest.as_ref(), &self.project_root)
    }

    /// Start a host session with the configured host and remotes.
    pub fn start_session<L: RemoteLoader>(&self, loader: L) -> anyhow::Result<HostSession<L>> {
        let host = self.host_config()?;
        let declarations = self.host_declarations(&host)?;
        let manifest = self.federation_manifest()?;
        HostSession::start(host.name, declarations, manifest, loader)
    }
}

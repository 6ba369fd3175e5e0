//! Host session: the explicit owner of the sharing registry.
//!
//! A session is started once per host run with the host's declarations and
//! lives until the host shuts down. Remotes register their declarations as
//! they are loaded, one at a time, before their own code is handed out.

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::error::ShareError;
use crate::loader::{FederationManifest, RemoteLoader, module_url};
use crate::registry::{ResolutionRegistry, ResolvedBinding};
use crate::share::{DependencyDeclaration, ExposedModule, RemoteEntry};

/// A successfully loaded exposed module of a remote
#[derive(Debug, Clone)]
pub struct RemoteModule {
    pub remote: String,
    pub exposed: ExposedModule,
    pub url: Url,
    pub bindings: Vec<ResolvedBinding>,
}

#[derive(Debug, Clone)]
struct LoadedRemote {
    location: Url,
    entry: RemoteEntry,
}

/// Sharing state of one running host
#[derive(Debug)]
pub struct HostSession<L> {
    host: String,
    host_declarations: Vec<DependencyDeclaration>,
    registry: ResolutionRegistry,
    manifest: FederationManifest,
    loader: L,
    remotes: HashMap<String, LoadedRemote>,
    bound: HashSet<String>,
}

impl<L: RemoteLoader> HostSession<L> {
    /// Start a session, registering the host's declarations before any
    /// remote can be loaded.
    pub fn start(
        host: impl Into<String>,
        declarations: Vec<DependencyDeclaration>,
        manifest: FederationManifest,
        loader: L,
    ) -> anyhow::Result<Self> {
        let host = host.into();
        let mut registry = ResolutionRegistry::new();

        for declaration in &declarations {
            if declaration.eager {
                tracing::info!(
                    host = %host,
                    package = %declaration.name,
                    version = %declaration.version,
                    singleton = declaration.singleton,
                    "loading shared package eagerly"
                );
            }
            registry.register(&host, declaration.clone())?;
        }

        Ok(Self {
            host,
            host_declarations: declarations,
            registry,
            manifest,
            loader,
            remotes: HashMap::new(),
            bound: HashSet::new(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn registry(&self) -> &ResolutionRegistry {
        &self.registry
    }

    pub fn manifest(&self) -> &FederationManifest {
        &self.manifest
    }

    pub fn is_loaded(&self, remote: &str) -> bool {
        self.remotes.contains_key(remote)
    }

    /// Names of loaded remotes, sorted
    pub fn loaded_remotes(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.remotes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a single package for a consumer against the current registry.
    pub fn resolve(
        &self,
        consumer: &str,
        own: &DependencyDeclaration,
    ) -> Result<ResolvedBinding, ShareError> {
        self.registry.resolve(consumer, &own.name, own)
    }

    /// Bindings for the host's own declarations.
    pub fn host_bindings(&self) -> Result<Vec<ResolvedBinding>, ShareError> {
        self.host_declarations
            .iter()
            .map(|own| self.resolve(&self.host, own))
            .collect()
    }

    /// Bindings for a loaded remote's declarations.
    pub fn remote_bindings(
        &self,
        remote: &str,
    ) -> Option<Result<Vec<ResolvedBinding>, ShareError>> {
        let loaded = self.remotes.get(remote)?;
        Some(
            loaded
                .entry
                .shared
                .iter()
                .map(|own| self.resolve(remote, own))
                .collect(),
        )
    }

    /// Load an exposed module of a remote.
    ///
    /// Fetch failures and unknown exposed modules leave the registry
    /// untouched. Once fetched, the remote's declarations are registered and
    /// resolved for the remote; a strict version conflict fails the load.
    pub async fn load_remote_module(
        &mut self,
        remote: &str,
        exposed: &str,
    ) -> anyhow::Result<RemoteModule> {
        if !self.remotes.contains_key(remote) {
            let location = self
                .manifest
                .location(remote)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown remote: {}", remote))?;

            let entry = self
                .loader
                .fetch_entry(remote, &location)
                .await
                .map_err(|e| e.context(format!("Failed to load remote '{}'", remote)))?;

            if entry.find_exposed(exposed).is_none() {
                anyhow::bail!("Remote '{}' does not expose '{}'", remote, exposed);
            }
            if entry.name != remote {
                tracing::warn!(
                    remote,
                    entry_name = %entry.name,
                    "remote entry name differs from manifest name"
                );
            }

            for declaration in &entry.shared {
                self.warn_late_eager(remote, declaration);
                self.registry.register(remote, declaration.clone())?;
            }

            tracing::info!(
                remote,
                %location,
                shared = entry.shared.len(),
                "remote registered"
            );
            self.remotes
                .insert(remote.to_string(), LoadedRemote { location, entry });
        }

        let loaded = self
            .remotes
            .get(remote)
            .ok_or_else(|| anyhow::anyhow!("Unknown remote: {}", remote))?;
        let exposed_module = loaded
            .entry
            .find_exposed(exposed)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Remote '{}' does not expose '{}'", remote, exposed))?;
        let url = module_url(&loaded.location, &exposed_module.out_file_name)?;

        let bindings = loaded
            .entry
            .shared
            .iter()
            .map(|own| self.registry.resolve(remote, &own.name, own))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                anyhow::Error::new(e).context(format!(
                    "Remote '{}' failed to initialize '{}'",
                    remote, exposed
                ))
            })?;

        self.bound
            .extend(bindings.iter().map(|binding| binding.name.clone()));

        Ok(RemoteModule {
            remote: remote.to_string(),
            exposed: exposed_module,
            url,
            bindings,
        })
    }

    fn warn_late_eager(&self, remote: &str, declaration: &DependencyDeclaration) {
        if declaration.is_eager_singleton() && self.bound.contains(&declaration.name) {
            tracing::warn!(
                remote,
                package = %declaration.name,
                "eager singleton registered after first use; existing consumers keep their instance"
            );
        }
    }
}

//! Shared dependency resolution
//!
//! The registry collects declarations in registration order: the host first,
//! then each remote as it arrives. Resolution picks one bound version per
//! `(consumer, name)` pair:
//!
//! 1. An eager singleton pins the version for every consumer.
//! 2. Otherwise the most recently registered singleton binds every consumer.
//! 3. Otherwise the consumer keeps its own version.
//!
//! A bound version outside the consumer's required version fails only when
//! the winning declaration is strict; otherwise it is reported as overridden.

use std::collections::HashMap;

use semver::Version;
use serde::Serialize;

use crate::error::ShareError;
use crate::share::DependencyDeclaration;

/// A declaration together with who registered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub contributor: String,
    pub declaration: DependencyDeclaration,
}

/// How a binding was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingSource {
    /// Pinned by an eager singleton
    EagerSingleton,
    /// Shared through the last-registered singleton
    Singleton,
    /// The consumer's own copy
    Local,
}

/// Version handed to a consumer for one shared package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinding {
    pub name: String,
    pub version: Version,
    /// The bound version differs from what the consumer declared or accepts
    pub overridden: bool,
    /// Contributor whose declaration supplied the version
    pub provider: String,
    pub source: BindingSource,
}

/// Process-wide sharing state for one host session.
///
/// Populated additively and never reset; a new session starts a new registry.
#[derive(Debug, Default)]
pub struct ResolutionRegistry {
    entries: HashMap<String, Vec<Registration>>,
}

impl ResolutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contributor's declaration under its package name.
    pub fn register(
        &mut self,
        contributor: &str,
        declaration: DependencyDeclaration,
    ) -> Result<(), ShareError> {
        if contributor.trim().is_empty() {
            return Err(ShareError::InvalidDeclaration {
                contributor: contributor.to_string(),
                reason: "contributor id is empty".to_string(),
            });
        }
        if declaration.name.trim().is_empty() {
            return Err(ShareError::InvalidDeclaration {
                contributor: contributor.to_string(),
                reason: "package name is empty".to_string(),
            });
        }

        tracing::debug!(
            contributor,
            package = %declaration.name,
            version = %declaration.version,
            singleton = declaration.singleton,
            eager = declaration.eager,
            "registering shared package"
        );

        self.entries
            .entry(declaration.name.clone())
            .or_default()
            .push(Registration {
                contributor: contributor.to_string(),
                declaration,
            });
        Ok(())
    }

    /// Registrations for a package, in registration order
    pub fn registrations(&self, name: &str) -> &[Registration] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Registered package names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registration every consumer of `name` is bound to, if any.
    ///
    /// The first eager singleton wins over everything; it was loaded at
    /// start-up and is the only instance ever handed out. Among non-eager
    /// singletons the latest registration wins.
    pub fn winner(&self, name: &str) -> Option<(&Registration, BindingSource)> {
        let registrations = self.registrations(name);

        if let Some(eager) = registrations
            .iter()
            .find(|r| r.declaration.is_eager_singleton())
        {
            return Some((eager, BindingSource::EagerSingleton));
        }

        registrations
            .iter()
            .rev()
            .find(|r| r.declaration.singleton)
            .map(|r| (r, BindingSource::Singleton))
    }

    /// Decide which version `consumer` receives for `name`.
    ///
    /// Reads registry state only; repeated calls with the same inputs return
    /// the same binding while the registry is unchanged.
    pub fn resolve(
        &self,
        consumer: &str,
        name: &str,
        own: &DependencyDeclaration,
    ) -> Result<ResolvedBinding, ShareError> {
        let Some((winner, source)) = self.winner(name) else {
            return Ok(ResolvedBinding {
                name: name.to_string(),
                version: own.version.clone(),
                overridden: false,
                provider: consumer.to_string(),
                source: BindingSource::Local,
            });
        };

        let bound = &winner.declaration.version;
        let accepted = own.required_version.accepts(bound, &own.version);

        if !accepted && winner.declaration.strict_version {
            tracing::warn!(
                consumer,
                package = name,
                required = %own.required_version,
                bound = %bound,
                provider = %winner.contributor,
                "strict version conflict"
            );
            return Err(ShareError::VersionConflict {
                name: name.to_string(),
                consumer: consumer.to_string(),
                required: own.required_version.clone(),
                bound: bound.clone(),
                provider: winner.contributor.clone(),
            });
        }

        let overridden = bound != &own.version || !accepted;
        if overridden {
            tracing::debug!(
                consumer,
                package = name,
                own = %own.version,
                bound = %bound,
                provider = %winner.contributor,
                "shared package overridden"
            );
        }

        Ok(ResolvedBinding {
            name: name.to_string(),
            version: bound.clone(),
            overridden,
            provider: winner.contributor.clone(),
            source,
        })
    }
}

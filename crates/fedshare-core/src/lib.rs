//! Fedshare Core Library
//!
//! Resolves which version of each shared package a federated host and its
//! dynamically loaded remotes receive, and manages the package.json
//! override that redirects library aliases to a single version.

pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod session;
pub mod share;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, FedshareConfig, OverrideProfile};
    pub use crate::context::AppContext;

    // Sharing
    pub use crate::error::ShareError;
    pub use crate::registry::{BindingSource, ResolutionRegistry, ResolvedBinding};
    pub use crate::share::{DependencyDeclaration, FederationConfig, RemoteEntry};
    pub use crate::version::RequiredVersion;

    // Loading
    pub use crate::loader::{FederationManifest, RemoteLoader, UrlRemoteLoader};
    pub use crate::session::{HostSession, RemoteModule};

    // Manifest
    pub use crate::manifest::{OverrideMode, OverrideToggle, PackageManifest};
}

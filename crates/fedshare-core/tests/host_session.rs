use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use semver::Version;
use url::Url;

use fedshare_core::error::ShareError;
use fedshare_core::loader::{FederationManifest, RemoteLoader};
use fedshare_core::session::HostSession;
use fedshare_core::share::{DependencyDeclaration, ExposedModule, RemoteEntry};

/// Serves entries from memory; unknown remotes behave like an unreachable host.
#[derive(Clone, Default)]
struct StaticLoader {
    entries: HashMap<String, RemoteEntry>,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl StaticLoader {
    fn with(mut self, entry: RemoteEntry) -> Self {
        self.entries.insert(entry.name.clone(), entry);
        self
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl RemoteLoader for StaticLoader {
    async fn fetch_entry(&self, remote: &str, _location: &Url) -> anyhow::Result<RemoteEntry> {
        self.fetches.lock().unwrap().push(remote.to_string());
        self.entries
            .get(remote)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }
}

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn remote(name: &str, shared: Vec<DependencyDeclaration>) -> RemoteEntry {
    RemoteEntry {
        name: name.to_string(),
        shared,
        exposes: vec![ExposedModule {
            key: "./Component".to_string(),
            out_file_name: "Component.js".to_string(),
        }],
    }
}

fn manifest() -> FederationManifest {
    let mut manifest = FederationManifest::new();
    for (name, port) in [("mfe1", 4201), ("mfe2", 4202), ("offline", 4299)] {
        manifest.insert(
            name,
            Url::parse(&format!("http://localhost:{}/remoteEntry.json", port)).unwrap(),
        );
    }
    manifest
}

fn loader() -> StaticLoader {
    StaticLoader::default()
        .with(remote(
            "mfe1",
            vec![DependencyDeclaration::new("shared-ui", v("1.0.0"))],
        ))
        .with(remote(
            "mfe2",
            vec![DependencyDeclaration::new("shared-ui", v("2.0.0"))],
        ))
}

fn host_override() -> Vec<DependencyDeclaration> {
    vec![
        DependencyDeclaration::new("shared-ui", v("3.0.0"))
            .singleton(true)
            .eager(true),
    ]
}

#[tokio::test]
async fn host_override_applies_to_all_remotes() {
    let mut session = HostSession::start("shell", host_override(), manifest(), loader()).unwrap();

    let mfe1 = session.load_remote_module("mfe1", "./Component").await.unwrap();
    let mfe2 = session.load_remote_module("mfe2", "./Component").await.unwrap();

    for module in [&mfe1, &mfe2] {
        assert_eq!(module.bindings.len(), 1);
        assert_eq!(module.bindings[0].version, v("3.0.0"));
        assert!(module.bindings[0].overridden);
    }
    assert_eq!(mfe1.url.as_str(), "http://localhost:4201/Component.js");

    let host = session.host_bindings().unwrap();
    assert!(!host[0].overridden);
}

#[tokio::test]
async fn remotes_keep_their_versions_without_host_override() {
    let mut session = HostSession::start("shell", Vec::new(), manifest(), loader()).unwrap();

    let mfe1 = session.load_remote_module("mfe1", "./Component").await.unwrap();
    let mfe2 = session.load_remote_module("mfe2", "./Component").await.unwrap();

    assert_eq!(mfe1.bindings[0].version, v("1.0.0"));
    assert_eq!(mfe2.bindings[0].version, v("2.0.0"));
    assert!(!mfe1.bindings[0].overridden);
    assert!(!mfe2.bindings[0].overridden);
}

#[tokio::test]
async fn failed_remote_registers_nothing() {
    let mut session = HostSession::start("shell", Vec::new(), manifest(), loader()).unwrap();

    let result = session.load_remote_module("offline", "./Component").await;
    assert!(result.is_err());
    assert!(!session.is_loaded("offline"));
    assert!(session.registry().is_empty());

    let mfe1 = session.load_remote_module("mfe1", "./Component").await.unwrap();
    assert_eq!(mfe1.bindings[0].version, v("1.0.0"));
}

#[tokio::test]
async fn unknown_remote_and_exposed_module_are_errors() {
    let mut session = HostSession::start("shell", Vec::new(), manifest(), loader()).unwrap();

    let err = session
        .load_remote_module("mfe9", "./Component")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown remote"));

    let err = session
        .load_remote_module("mfe1", "./Missing")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not expose"));
    assert!(session.registry().is_empty());
}

#[tokio::test]
async fn remote_is_fetched_and_registered_once() {
    let loader = loader();
    let mut session =
        HostSession::start("shell", Vec::new(), manifest(), loader.clone()).unwrap();

    session.load_remote_module("mfe1", "./Component").await.unwrap();
    session.load_remote_module("mfe1", "./Component").await.unwrap();

    assert_eq!(loader.fetch_count(), 1);
    assert_eq!(session.registry().registrations("shared-ui").len(), 1);
    assert_eq!(session.loaded_remotes(), vec!["mfe1"]);
}

#[tokio::test]
async fn strict_conflict_fails_remote_initialisation() {
    let host = vec![
        DependencyDeclaration::new("@angular/core", v("20.0.0"))
            .singleton(true)
            .strict(true),
    ];
    let loader = StaticLoader::default().with(remote(
        "mfe1",
        vec![DependencyDeclaration::new("@angular/core", v("19.2.0")).strict(true)],
    ));
    let mut session = HostSession::start("shell", host, manifest(), loader).unwrap();

    let err = session
        .load_remote_module("mfe1", "./Component")
        .await
        .unwrap_err();
    let conflict = err.downcast_ref::<ShareError>().unwrap();
    assert!(conflict.is_version_conflict());
}

#[tokio::test]
async fn later_singleton_remote_supersedes_earlier_one() {
    let loader = StaticLoader::default()
        .with(remote(
            "mfe1",
            vec![DependencyDeclaration::new("shared-ui", v("1.0.0")).singleton(true)],
        ))
        .with(remote(
            "mfe2",
            vec![DependencyDeclaration::new("shared-ui", v("2.0.0")).singleton(true)],
        ));
    let mut session = HostSession::start("shell", Vec::new(), manifest(), loader).unwrap();

    let mfe1 = session.load_remote_module("mfe1", "./Component").await.unwrap();
    assert_eq!(mfe1.bindings[0].version, v("1.0.0"));

    session.load_remote_module("mfe2", "./Component").await.unwrap();
    let rebound = session.remote_bindings("mfe1").unwrap().unwrap();
    assert_eq!(rebound[0].version, v("2.0.0"));
    assert!(rebound[0].overridden);
}

//! The bundled demo project resolves as documented.

use std::path::PathBuf;

use semver::Version;
use tempfile::TempDir;

use fedshare_core::config::ConfigStore;
use fedshare_core::context::AppContext;
use fedshare_core::loader::UrlRemoteLoader;
use fedshare_core::share::{RemoteEntry, parse_federation_toml};

fn demo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demo")
}

fn demo_context(state: &TempDir) -> AppContext {
    let root = demo_root();
    let config = ConfigStore::from_project_root(root.clone()).load().unwrap();
    AppContext::with_state_dir(root, state.path().to_path_buf(), config)
}

#[tokio::test]
async fn shell_override_reaches_every_remote() {
    let state = TempDir::new().unwrap();
    let ctx = demo_context(&state);
    let mut session = ctx.start_session(UrlRemoteLoader::new()).unwrap();

    for remote in ["mfe1", "mfe2"] {
        let module = session
            .load_remote_module(remote, "./Component")
            .await
            .unwrap();
        let shared_ui = module
            .bindings
            .iter()
            .find(|b| b.name == "shared-ui")
            .unwrap();
        assert_eq!(shared_ui.version, Version::new(3, 0, 0));
        assert!(shared_ui.overridden);
        assert_eq!(shared_ui.provider, "shell");
    }

    let host = session.host_bindings().unwrap();
    let shared_ui = host.iter().find(|b| b.name == "shared-ui").unwrap();
    assert!(!shared_ui.overridden);
}

#[test]
fn remote_entries_match_remote_configs() {
    let root = demo_root();
    for remote in ["mfe1", "mfe2"] {
        let config =
            parse_federation_toml(&root.join(format!("apps/{remote}/federation.toml"))).unwrap();
        let entry: RemoteEntry = serde_json::from_str(
            &std::fs::read_to_string(root.join(format!("remotes/{remote}/remoteEntry.json")))
                .unwrap(),
        )
        .unwrap();

        assert_eq!(config.name, entry.name);
        for key in config.exposes.keys() {
            assert!(entry.find_exposed(key).is_some());
        }

        let declared = config.shared["shared-ui"].version.clone().unwrap();
        let published = entry
            .shared
            .iter()
            .find(|d| d.name == "shared-ui")
            .unwrap();
        assert_eq!(published.version, declared);
    }
}

#[test]
fn demo_override_profile_matches_manifest() {
    let state = TempDir::new().unwrap();
    let ctx = demo_context(&state);
    let status = ctx.override_toggle().status().unwrap();
    assert_eq!(status.aliases.len(), 2);
    assert!(status.aliases.iter().all(|a| a.current.is_some()));
}

//! Expansion of a federation config into concrete declarations.

use std::path::Path;

use semver::{Version, VersionReq};

use super::schema::{DependencyDeclaration, FederationConfig, SharedEntry};
use crate::manifest::PackageManifest;
use crate::version::{RequiredVersion, installed_version, version_from_spec};

/// Build the declarations an app contributes.
///
/// `share_all` entries come first (package.json order), followed by the
/// explicit `[shared]` entries. A package listed explicitly is never also
/// shared through `share_all`.
pub fn collect_declarations(
    config: &FederationConfig,
    manifest: Option<&PackageManifest>,
    project_root: &Path,
) -> anyhow::Result<Vec<DependencyDeclaration>> {
    let mut declarations = Vec::new();

    if let Some(options) = &config.share_all {
        let Some(manifest) = manifest else {
            anyhow::bail!(
                "'{}' uses share_all but no package.json was provided",
                config.name
            );
        };

        for (name, spec) in manifest.dependencies() {
            if config.shared.contains_key(name) || config.is_skipped(name) {
                continue;
            }

            let Some(version) = resolve_version(project_root, name, Some(spec)) else {
                tracing::warn!(
                    app = %config.name,
                    package = %name,
                    spec = %spec,
                    "skipping shared package with undeterminable version"
                );
                continue;
            };

            let required_version = if options.required_version.is_auto() {
                auto_requirement(spec, &version)
            } else {
                options.required_version.clone()
            };

            declarations.push(DependencyDeclaration {
                name: name.to_string(),
                version,
                required_version,
                singleton: options.singleton,
                strict_version: options.strict_version,
                eager: options.eager,
            });
        }
    }

    for (name, entry) in &config.shared {
        declarations.push(explicit_declaration(config, manifest, project_root, name, entry)?);
    }

    tracing::debug!(
        app = %config.name,
        count = declarations.len(),
        "collected shared declarations"
    );

    Ok(declarations)
}

fn explicit_declaration(
    config: &FederationConfig,
    manifest: Option<&PackageManifest>,
    project_root: &Path,
    name: &str,
    entry: &SharedEntry,
) -> anyhow::Result<DependencyDeclaration> {
    let spec = manifest.and_then(|manifest| manifest.dependency(name));
    let version = match &entry.version {
        Some(version) => version.clone(),
        None => resolve_version(project_root, name, spec).ok_or_else(|| {
            anyhow::anyhow!(
                "Shared package '{}' in '{}' has no version and none could be read from package.json",
                name,
                config.name
            )
        })?,
    };

    let required_version = match (&entry.required_version, spec) {
        (RequiredVersion::Auto, Some(spec)) if entry.version.is_none() => {
            auto_requirement(spec, &version)
        }
        (required, _) => required.clone(),
    };

    Ok(DependencyDeclaration {
        name: name.to_string(),
        version,
        required_version,
        singleton: entry.singleton,
        strict_version: entry.strict_version,
        eager: entry.eager,
    })
}

fn resolve_version(project_root: &Path, name: &str, spec: Option<&str>) -> Option<Version> {
    installed_version(project_root, name).or_else(|| spec.and_then(version_from_spec))
}

/// `auto` accepts the range declared in package.json, or exactly the
/// supplied version when the spec is not a range.
fn auto_requirement(spec: &str, version: &Version) -> RequiredVersion {
    let spec = spec.trim();
    let is_range = spec.starts_with(['^', '~', '>', '<']) || spec.contains(' ');
    match VersionReq::parse(spec) {
        Ok(req) if is_range => RequiredVersion::Range(req),
        _ => RequiredVersion::Exact(version.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::ShareOptions;

    fn manifest(json: &str) -> PackageManifest {
        PackageManifest::from_slice(Path::new("package.json"), json.as_bytes()).unwrap()
    }

    #[test]
    fn auto_requirement_uses_declared_range() {
        let version = Version::new(20, 0, 0);
        assert!(matches!(
            auto_requirement("^20.0.0", &version),
            RequiredVersion::Range(_)
        ));
        assert_eq!(
            auto_requirement("file:artifacts/shared-ui-1.0.0.tgz", &version),
            RequiredVersion::Exact(version.clone())
        );
        assert_eq!(
            auto_requirement("20.0.0", &version),
            RequiredVersion::Exact(version)
        );
    }

    #[test]
    fn share_all_skips_explicit_and_skipped_packages() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = manifest(
            r#"{"dependencies": {
                "@angular/core": "^20.0.0",
                "rxjs": "~7.8.0",
                "rxjs/ajax": "~7.8.0",
                "shared-ui": "file:artifacts/shared-ui-1.0.0.tgz"
            }}"#,
        );

        let mut config = FederationConfig::new("mfe1");
        config.share_all = Some(ShareOptions::default());
        config.skip = vec!["rxjs/ajax".to_string()];
        config.shared.insert(
            "shared-ui".to_string(),
            SharedEntry {
                required_version: RequiredVersion::parse("1.0.0").unwrap(),
                ..SharedEntry::default()
            },
        );

        let declarations = collect_declarations(&config, Some(&manifest), temp.path()).unwrap();
        let names: Vec<_> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["@angular/core", "rxjs", "shared-ui"]);

        let core = &declarations[0];
        assert!(core.singleton && core.strict_version && !core.eager);
        assert_eq!(core.version, Version::new(20, 0, 0));

        let shared_ui = &declarations[2];
        assert!(!shared_ui.singleton);
        assert_eq!(shared_ui.version, Version::new(1, 0, 0));
    }

    #[test]
    fn share_all_without_manifest_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = FederationConfig::new("shell");
        config.share_all = Some(ShareOptions::default());
        assert!(collect_declarations(&config, None, temp.path()).is_err());
    }

    #[test]
    fn explicit_entry_without_version_needs_manifest() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = FederationConfig::new("shell");
        config
            .shared
            .insert("shared-ui".to_string(), SharedEntry::default());
        assert!(collect_declarations(&config, None, temp.path()).is_err());
    }
}

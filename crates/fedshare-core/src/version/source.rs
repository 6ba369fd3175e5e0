//! Discover which version a package.json install source provides.

use std::path::Path;

use semver::Version;

/// Derive a concrete version from a package.json dependency spec.
///
/// Handles plain and prefixed versions (`1.2.3`, `^20.0.0`, `~7.8.0`), npm
/// aliases (`npm:pkg@1.2.3`) and local archives whose file name ends in a
/// version (`file:artifacts/shared-ui-3.0.0.tgz`).
pub fn version_from_spec(spec: &str) -> Option<Version> {
    let spec = spec.trim();

    if let Some(path) = spec.strip_prefix("file:") {
        return version_from_archive(path);
    }

    if let Some(alias) = spec.strip_prefix("npm:") {
        let (_, version) = alias.rsplit_once('@')?;
        return version_from_spec(version);
    }

    let stripped = spec.trim_start_matches(['^', '~', '=', '>', '<', 'v', ' ']);
    Version::parse(stripped).ok()
}

fn version_from_archive(path: &str) -> Option<Version> {
    let file_name = Path::new(path).file_name()?.to_str()?;
    let stem = file_name
        .strip_suffix(".tgz")
        .or_else(|| file_name.strip_suffix(".tar.gz"))?;

    // Leftmost '-' whose remainder parses keeps prerelease suffixes intact
    stem.match_indices('-')
        .find_map(|(idx, _)| Version::parse(&stem[idx + 1..]).ok())
}

/// Read the installed version from `node_modules/<name>/package.json`.
pub fn installed_version(project_root: &Path, name: &str) -> Option<Version> {
    let mut path = project_root.join("node_modules");
    for segment in name.split('/') {
        path.push(segment);
    }
    path.push("package.json");

    let bytes = std::fs::read(&path).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let version = value.get("version")?.as_str()?;
    Version::parse(version).ok()
}

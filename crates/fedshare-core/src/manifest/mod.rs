//! package.json manifest handling and the version override toggle.

pub mod override_toggle;
pub mod ownership;
pub mod package;

use std::path::{Path, PathBuf};

use anyhow::Context;

pub use override_toggle::{
    AliasChange, AliasStatus, OverrideMode, OverrideOutcome, OverrideReport, OverrideState,
    OverrideStatus, OverrideToggle,
};
pub use ownership::OwnershipStore;
pub use package::PackageManifest;

/// Write `content` to a sibling temp file, then rename it over `path`.
///
/// Readers see either the old or the new file, never a torn one.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".fedshare-tmp");
    path.with_file_name(name)
}

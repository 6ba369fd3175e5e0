//! Remote entry loading
//!
//! A loader turns a remote's published location into its [`RemoteEntry`]:
//! the shared declarations it contributes and the modules it exposes. The
//! session only ever sees this capability, never the transport.

pub mod manifest;

use std::future::Future;

use anyhow::Context;
use url::Url;

use crate::share::RemoteEntry;

pub use manifest::FederationManifest;

/// Fetches remote entries
pub trait RemoteLoader {
    /// Produce the entry published at `location` for `remote`, or fail if the
    /// remote is unreachable or its entry is malformed.
    fn fetch_entry(
        &self,
        remote: &str,
        location: &Url,
    ) -> impl Future<Output = anyhow::Result<RemoteEntry>> + Send;
}

/// Loads entries over http(s) or from `file://` locations
#[derive(Debug, Clone, Default)]
pub struct UrlRemoteLoader {
    client: reqwest::Client,
}

impl UrlRemoteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_http(&self, location: &Url) -> anyhow::Result<RemoteEntry> {
        let response = self
            .client
            .get(location.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", location))?
            .error_for_status()
            .with_context(|| format!("Remote entry request failed: {}", location))?;

        response
            .json::<RemoteEntry>()
            .await
            .with_context(|| format!("Failed to parse remote entry: {}", location))
    }

    fn fetch_file(location: &Url) -> anyhow::Result<RemoteEntry> {
        let path = location
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("Invalid file location: {}", location))?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read remote entry: {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse remote entry: {}", path.display()))
    }
}

impl RemoteLoader for UrlRemoteLoader {
    async fn fetch_entry(&self, remote: &str, location: &Url) -> anyhow::Result<RemoteEntry> {
        tracing::debug!(remote, %location, "fetching remote entry");
        match location.scheme() {
            "http" | "https" => self.fetch_http(location).await,
            "file" => Self::fetch_file(location),
            scheme => anyhow::bail!(
                "Unsupported scheme '{}' for remote '{}': {}",
                scheme,
                remote,
                location
            ),
        }
    }
}

/// Resolve an exposed module's bundle relative to its remote entry.
pub fn module_url(entry_location: &Url, out_file_name: &str) -> anyhow::Result<Url> {
    entry_location
        .join(out_file_name)
        .with_context(|| format!("Invalid module file name: {}", out_file_name))
}

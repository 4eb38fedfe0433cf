//! History retrieval
//!
//! Fetches the raw payloads the aggregator consumes: the local archive file
//! and the authenticated remote export. Both fetches run concurrently; a
//! source that fails is logged and reported as a warning, never as an error,
//! so the heat-map still renders from whatever arrived.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, Credentials};
use crate::error::{Error, Result};

const HEADER_API_USER: &str = "x-api-user";
const HEADER_API_KEY: &str = "x-api-key";

/// Locally archived export file.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
}

impl ArchiveSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Remote export endpoint, authenticated per request.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            credentials,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<String> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .get(&self.url)
            .header(HEADER_API_USER, &self.credentials.user_id)
            .header(HEADER_API_KEY, &self.credentials.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchFailed {
                source_name: "remote".to_string(),
                message: format!("{} returned {status}", self.url),
            });
        }
        Ok(response.text().await?)
    }
}

/// The sources for one rendering pass.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub archive: Option<ArchiveSource>,
    pub remote: Option<RemoteSource>,
    /// Why a configured source was left out.
    pub skipped: Vec<String>,
}

impl Sources {
    /// Build sources from config. `offline` drops the remote export;
    /// incomplete credentials drop it with a note.
    pub fn from_config(config: &Config, credentials: Credentials, offline: bool) -> Self {
        let mut sources = Sources {
            archive: Some(ArchiveSource::new(config.sources.archive.clone())),
            ..Sources::default()
        };

        if offline || !config.sources.remote_enabled {
            return sources;
        }
        if !credentials.is_complete() {
            sources
                .skipped
                .push("remote export skipped: credentials not configured".to_string());
            return sources;
        }
        sources.remote = Some(RemoteSource::new(
            config.sources.remote_url.clone(),
            credentials,
            Duration::from_secs(config.sources.timeout_secs),
        ));
        sources
    }
}

/// Raw payload text per source; `None` when the source was absent or failed.
#[derive(Debug, Clone, Default)]
pub struct Payloads {
    pub archive: Option<String>,
    pub remote: Option<String>,
    pub warnings: Vec<String>,
}

/// Fetch both sources concurrently.
pub async fn fetch_payloads(sources: &Sources) -> Payloads {
    let archive = async {
        match sources.archive.as_ref() {
            Some(source) => Some(source.fetch().await.map_err(|err| {
                format!("archive {} unavailable: {err}", source.path().display())
            })),
            None => None,
        }
    };
    let remote = async {
        match sources.remote.as_ref() {
            Some(source) => Some(
                source
                    .fetch()
                    .await
                    .map_err(|err| format!("remote export unavailable: {err}")),
            ),
            None => None,
        }
    };
    let (archive, remote) = tokio::join!(archive, remote);

    let mut payloads = Payloads {
        warnings: sources.skipped.clone(),
        ..Payloads::default()
    };
    payloads.archive = settle(archive, &mut payloads.warnings);
    payloads.remote = settle(remote, &mut payloads.warnings);
    payloads
}

/// Run [`fetch_payloads`] on a private current-thread runtime.
pub fn fetch_payloads_blocking(sources: &Sources) -> Result<Payloads> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(fetch_payloads(sources)))
}

fn settle(
    outcome: Option<std::result::Result<String, String>>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    match outcome? {
        Ok(payload) => Some(payload),
        Err(message) => {
            tracing::warn!("{message}");
            warnings.push(message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_drops_remote() {
        let config = Config::default();
        let sources = Sources::from_config(&config, Credentials::new("u", "k"), true);
        assert!(sources.archive.is_some());
        assert!(sources.remote.is_none());
        assert!(sources.skipped.is_empty());
    }

    #[test]
    fn missing_credentials_skip_remote_with_note() {
        let config = Config::default();
        let sources = Sources::from_config(&config, Credentials::default(), false);
        assert!(sources.remote.is_none());
        assert_eq!(sources.skipped.len(), 1);
    }

    #[test]
    fn complete_credentials_enable_remote() {
        let config = Config::default();
        let sources = Sources::from_config(&config, Credentials::new("u", "k"), false);
        let remote = sources.remote.expect("remote");
        assert_eq!(remote.url(), "https://habitica.com/export/history.csv");
    }

    #[tokio::test]
    async fn reads_archive_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "header\nRead,x,daily,2024-06-10,1\n").expect("write archive");

        let sources = Sources {
            archive: Some(ArchiveSource::new(&path)),
            ..Sources::default()
        };
        let payloads = fetch_payloads(&sources).await;
        assert!(payloads.archive.expect("archive").contains("Read"));
        assert!(payloads.remote.is_none());
        assert!(payloads.warnings.is_empty());
    }

    #[tokio::test]
    async fn missing_archive_becomes_warning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sources = Sources {
            archive: Some(ArchiveSource::new(dir.path().join("missing.csv"))),
            ..Sources::default()
        };
        let payloads = fetch_payloads(&sources).await;
        assert!(payloads.archive.is_none());
        assert_eq!(payloads.warnings.len(), 1);
        assert!(payloads.warnings[0].contains("missing.csv"));
    }

    #[test]
    fn blocking_fetch_with_no_sources_is_empty() {
        let payloads = fetch_payloads_blocking(&Sources::default()).expect("runtime");
        assert!(payloads.archive.is_none());
        assert!(payloads.remote.is_none());
    }
}

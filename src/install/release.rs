//! Release channels and GitHub release metadata resolution.

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use mockall::automock;

use serde::Deserialize;
use tracing::warn;

use crate::install::error::InstallError;

/// Upstream repository publishing the server binaries.
pub const GITHUB_REPO: &str = "tdanner/asn1-lsp";

/// Default base URL for the GitHub API.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Client identifier sent with every API request.
pub const USER_AGENT: &str = "asn1-lsp-client";

/// Which stream of published versions to install from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseChannel {
    /// Newest stable tag.
    #[default]
    Latest,
    /// The rolling `nightly` tag.
    Nightly,
}

impl ReleaseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseChannel::Latest => "latest",
            ReleaseChannel::Nightly => "nightly",
        }
    }

    /// Endpoint path below `/repos/{owner}/{repo}/` for this channel.
    fn endpoint(&self) -> &'static str {
        match self {
            ReleaseChannel::Latest => "releases/latest",
            ReleaseChannel::Nightly => "releases/tags/nightly",
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(ReleaseChannel::Latest),
            "nightly" => Ok(ReleaseChannel::Nightly),
            other => Err(format!(
                "unknown release channel \"{other}\" (expected \"latest\" or \"nightly\")"
            )),
        }
    }
}

/// Downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Release metadata as returned by the GitHub API.
///
/// Fetched fresh on every activation; only the extracted binary is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseInfo {
    /// Cache directory key for this release on the given channel.
    pub fn identifier(&self, channel: ReleaseChannel) -> String {
        format!("{}-{}", channel, self.tag_name)
    }

    /// Find an asset by exact name.
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Source of release metadata for a channel.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the release the channel currently points at.
    ///
    /// A single request, no retry: missing release metadata is not
    /// transient-recoverable at this layer.
    async fn fetch_release(&self, channel: ReleaseChannel) -> Result<ReleaseInfo, InstallError>;
}

/// GitHub Releases API implementation of [`ReleaseSource`].
pub struct GitHubReleaseSource {
    client: reqwest::Client,
    base_url: String,
    repo: String,
}

impl GitHubReleaseSource {
    /// Creates a release source against a custom base URL and repository.
    pub fn new(base_url: &str, repo: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            repo: repo.to_string(),
        }
    }
}

impl Default for GitHubReleaseSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, GITHUB_REPO)
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn fetch_release(&self, channel: ReleaseChannel) -> Result<ReleaseInfo, InstallError> {
        let url = format!("{}/repos/{}/{}", self.base_url, self.repo, channel.endpoint());

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub API returned status {} for {}", status, url);
            return Err(InstallError::ReleaseQuery { channel, status });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_release_queries_latest_endpoint() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/tdanner/asn1-lsp/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "tag_name": "v0.2.1",
                    "assets": [
                        {"name": "asn1-lsp-linux-x86_64.zip", "browser_download_url": "https://example/linux.zip"},
                        {"name": "asn1-lsp-macos-aarch64.zip", "browser_download_url": "https://example/macos.zip"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let source = GitHubReleaseSource::new(&server.url(), GITHUB_REPO);
        let release = source.fetch_release(ReleaseChannel::Latest).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag_name, "v0.2.1");
        assert_eq!(release.assets.len(), 2);
        assert_eq!(
            release
                .find_asset("asn1-lsp-macos-aarch64.zip")
                .unwrap()
                .browser_download_url,
            "https://example/macos.zip"
        );
    }

    #[tokio::test]
    async fn fetch_release_queries_nightly_tag_endpoint() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/tdanner/asn1-lsp/releases/tags/nightly")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "nightly", "assets": []}"#)
            .create_async()
            .await;

        let source = GitHubReleaseSource::new(&server.url(), GITHUB_REPO);
        let release = source.fetch_release(ReleaseChannel::Nightly).await.unwrap();

        mock.assert_async().await;
        assert_eq!(release.tag_name, "nightly");
        assert_eq!(release.identifier(ReleaseChannel::Nightly), "nightly-nightly");
    }

    #[tokio::test]
    async fn fetch_release_carries_status_on_failure() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/tdanner/asn1-lsp/releases/latest")
            .with_status(503)
            .with_body(r#"{"message": "Service Unavailable"}"#)
            .create_async()
            .await;

        let source = GitHubReleaseSource::new(&server.url(), GITHUB_REPO);
        let err = source
            .fetch_release(ReleaseChannel::Latest)
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err {
            InstallError::ReleaseQuery { channel, status } => {
                assert_eq!(channel, ReleaseChannel::Latest);
                assert_eq!(status.as_u16(), 503);
            }
            other => panic!("expected ReleaseQuery, got {other:?}"),
        }
    }

    #[test]
    fn channel_parses_from_configuration_strings() {
        assert_eq!(
            "latest".parse::<ReleaseChannel>().unwrap(),
            ReleaseChannel::Latest
        );
        assert_eq!(
            "nightly".parse::<ReleaseChannel>().unwrap(),
            ReleaseChannel::Nightly
        );
        assert!("stable".parse::<ReleaseChannel>().is_err());
    }
}

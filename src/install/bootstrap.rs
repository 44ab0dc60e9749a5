//! Server binary resolution and activation.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::client::{LanguageClientSession, SessionConfig};
use crate::config::Config;
use crate::install::cache::AssetCache;
use crate::install::error::InstallError;
use crate::install::installer::{AssetDownloader, install_binary};
use crate::install::release::{ReleaseChannel, ReleaseSource};
use crate::platform::PlatformDescriptor;

/// Orchestrates platform detection, release resolution, the cache, and the
/// installer into a runnable server command, then owns the resulting
/// language-client session for the lifetime of the activation.
pub struct ServerBootstrapper<R, D> {
    releases: R,
    downloader: D,
    cache: AssetCache,
    config: Config,
}

impl<R: ReleaseSource, D: AssetDownloader> ServerBootstrapper<R, D> {
    pub fn new(
        releases: R,
        downloader: D,
        storage_root: impl Into<PathBuf>,
        config: Config,
    ) -> Self {
        Self {
            releases,
            downloader,
            cache: AssetCache::new(storage_root),
            config,
        }
    }

    /// Resolves the server binary path.
    ///
    /// An explicitly configured path wins outright and issues no network
    /// requests; otherwise the configured channel's release is fetched and
    /// the cache consulted before anything is downloaded.
    pub async fn resolve_server_binary(&self) -> Result<PathBuf, InstallError> {
        if let Some(configured) = self.config.configured_server_path() {
            return Ok(expand_home(configured));
        }

        let channel = self.config.release_channel;
        let platform = PlatformDescriptor::current()?;
        self.resolve_for_platform(channel, platform).await
    }

    /// Platform-pinned resolution, separated so callers and tests can target
    /// a platform other than the host's.
    pub async fn resolve_for_platform(
        &self,
        channel: ReleaseChannel,
        platform: PlatformDescriptor,
    ) -> Result<PathBuf, InstallError> {
        let asset_name = platform.asset_name();
        let binary_name = platform.binary_name();

        let release = self.releases.fetch_release(channel).await?;
        let identifier = release.identifier(channel);
        let release_dir = self.cache.release_dir(&identifier);
        std::fs::create_dir_all(&release_dir)?;

        if let Some(path) = self.cache.cached_binary(&identifier, binary_name) {
            info!("using cached server binary at {:?}", path);
            return Ok(path);
        }

        let asset = release
            .find_asset(&asset_name)
            .ok_or_else(|| InstallError::AssetNotFound {
                asset: asset_name.clone(),
                tag: release.tag_name.clone(),
            })?;

        info!(
            "downloading {} from {}",
            asset.name, asset.browser_download_url
        );
        let payload = self.downloader.download(&asset.browser_download_url).await?;
        install_binary(&payload, binary_name, &release_dir)
    }

    /// Activates the language-server integration.
    ///
    /// Any failure is surfaced to the user and logged, then swallowed: the
    /// integration is disabled for this run but the rest of activation (the
    /// demo command surface) proceeds.
    pub async fn activate(&self) -> Option<LanguageClientSession> {
        let command = match self.resolve_server_binary().await {
            Ok(command) => command,
            Err(e) => {
                report_activation_failure(&e.to_string());
                return None;
            }
        };

        let mut session = LanguageClientSession::new(SessionConfig::for_command(command));
        let started = async {
            session.start().await?;
            session.initialize().await
        }
        .await;

        match started {
            Ok(()) => Some(session),
            Err(e) => {
                report_activation_failure(&e.to_string());
                None
            }
        }
    }
}

fn report_activation_failure(message: &str) {
    error!("failed to start ASN.1 language server: {}", message);
    eprintln!("Failed to start ASN.1 language server: {message}");
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, dirs::home_dir())
}

fn expand_home_with(path: &str, home_dir: Option<PathBuf>) -> PathBuf {
    match home_dir {
        Some(home) if path == "~" => home,
        Some(home) => match path.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

use reqwest::StatusCode;
use thiserror::Error;

use crate::install::release::ReleaseChannel;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unable to query {channel} release information (HTTP {status})")]
    ReleaseQuery {
        channel: ReleaseChannel,
        status: StatusCode,
    },

    #[error("could not find asset {asset} in release {tag}")]
    AssetNotFound { asset: String, tag: String },

    #[error("failed to download language server binary (HTTP {status})")]
    Download { status: StatusCode },

    #[error("downloaded archive did not contain {binary}")]
    BinaryNotInArchive { binary: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
